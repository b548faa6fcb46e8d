use std::iter;

use lure_core::{resolve_catch, Catalog, Clock, Rarity, RngSource, SystemClock};

fn main() {
    let catalog = Catalog::builtin().expect("builtin catalog is valid");
    let clock = SystemClock::new();
    let mut rng = RngSource::from_entropy();

    let runs = 100_000;
    let total = (0..runs)
        .map(|_| {
            iter::repeat(())
                .map(|_| resolve_catch(&catalog, &mut rng, clock.timestamp()))
                .position(|catch| catch.rarity() == Rarity::Legendary)
                .map_or(0, |tries| tries + 1)
        })
        .sum::<usize>();

    println!(
        "Took {:.1} casts on average to catch a legendary fish",
        total as f64 / runs as f64
    );
}
