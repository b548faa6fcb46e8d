use std::collections::BTreeMap;

use lure_core::{resolve_catch, Catalog, Clock, RngSource, SystemClock};

fn main() {
    let catalog = Catalog::builtin().expect("builtin catalog is valid");
    let clock = SystemClock::new();
    let mut rng = RngSource::from_entropy();

    let result = (0..100_000)
        .map(|_| resolve_catch(&catalog, &mut rng, clock.timestamp()))
        .fold(BTreeMap::new(), |mut acc, catch| {
            let entry = acc.entry(catch.species().id).or_insert_with(Vec::new);
            entry.push(catch);
            acc
        });

    let count = result.values().map(|catches| catches.len()).sum::<usize>();

    let avg_catch_value = result
        .values()
        .map(|catches| catches.iter().map(|catch| catch.value()).sum::<u64>())
        .sum::<u64>() as f64
        / count as f64;

    println!("Caught {count} fishes");
    for (id, catches) in &result {
        if let Some(species) = catalog.species(*id) {
            println!(
                "{species}: {:.2}% ({})",
                catches.len() as f64 / count as f64 * 100.0,
                species.rarity
            );
        }
    }
    println!("Average Catch Value: {avg_catch_value:.2} gold");
}
