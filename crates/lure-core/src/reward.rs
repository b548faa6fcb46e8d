use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Utc};
use log::trace;

use crate::{
    catalog::{Catalog, Rarity, Species},
    random::RandomSource,
};

/// Absorbs float error in the cumulative weights so that a draw sitting on a
/// bucket edge lands in the upper bucket.
const BUCKET_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    species: Arc<Species>,
    size: f64,
    value: u64,
    caught_at: DateTime<Utc>,
}

impl Catch {
    /// Builds a catch of `species` and derives its value from `size`.
    pub fn new(species: Arc<Species>, size: f64, caught_at: DateTime<Utc>) -> Self {
        let value = value_for(&species, size);
        Self {
            species,
            size,
            value,
            caught_at,
        }
    }

    pub fn species(&self) -> &Arc<Species> {
        &self.species
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn caught_at(&self) -> DateTime<Utc> {
        self.caught_at
    }

    pub fn rarity(&self) -> Rarity {
        self.species.rarity
    }
}

impl Display for Catch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({:.1}kg) worth {} gold",
            self.species.glyph, self.species.name, self.size, self.value
        )
    }
}

/// Picks the rarity whose cumulative weight bucket contains `draw`.
///
/// Buckets are half-open and walked in canonical order. A draw past the last
/// bucket falls back to the last rarity.
pub fn select_rarity(catalog: &Catalog, draw: f64) -> Rarity {
    let mut cumulative = 0.0;
    for (rarity, weight) in catalog.rarity_weights() {
        cumulative += weight;
        if draw < cumulative - BUCKET_TOLERANCE {
            return rarity;
        }
    }

    Rarity::ALL[Rarity::ALL.len() - 1]
}

/// Size for a uniform `draw`, rounded to one decimal.
pub fn size_for(species: &Species, draw: f64) -> f64 {
    let size = species.min_size + draw * (species.max_size - species.min_size);
    ((size * 10.0).round() / 10.0).clamp(species.min_size, species.max_size)
}

/// Value grows linearly with size relative to the species' minimum and never
/// drops below the base price.
pub fn value_for(species: &Species, size: f64) -> u64 {
    let value = (species.base_price as f64 * size / species.min_size).floor() as u64;
    value.max(species.base_price)
}

/// Rolls one catch. Takes exactly three draws: rarity, species, size.
pub fn resolve_catch(
    catalog: &Catalog,
    random: &mut impl RandomSource,
    caught_at: DateTime<Utc>,
) -> Catch {
    let rarity = select_rarity(catalog, random.next_unit());

    let candidates = catalog.species_of_rarity(rarity);
    let index = (random.next_unit() * candidates.len() as f64) as usize;
    let species = &candidates[index.min(candidates.len() - 1)];

    let size = size_for(species, random.next_unit());
    let catch = Catch::new(species.clone(), size, caught_at);

    trace!("Rolled {rarity} catch: {catch}");

    catch
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use test_case::test_case;

    use super::*;
    use crate::{
        catalog::Category,
        random::{RngSource, Scripted},
    };

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    fn fish(min_size: f64, max_size: f64, base_price: u64) -> Species {
        Species {
            id: 0,
            name: "fish".to_string(),
            category: Category::Freshwater,
            rarity: Rarity::Common,
            min_size,
            max_size,
            base_price,
            glyph: "🐟".to_string(),
        }
    }

    #[test_case(0.0, Rarity::Common ; "bottom of common")]
    #[test_case(0.2, Rarity::Common ; "inside common")]
    #[test_case(0.4999, Rarity::Common ; "top of common")]
    #[test_case(0.5, Rarity::Uncommon ; "bottom of uncommon")]
    #[test_case(0.79, Rarity::Uncommon ; "inside uncommon")]
    #[test_case(0.8, Rarity::Rare ; "bottom of rare")]
    #[test_case(0.9499, Rarity::Rare ; "top of rare")]
    #[test_case(0.95, Rarity::Legendary ; "bottom of legendary")]
    #[test_case(0.999, Rarity::Legendary ; "top of legendary")]
    #[test_case(1.0, Rarity::Legendary ; "exactly one falls back to last")]
    fn rarity_for_draw(draw: f64, expected: Rarity) {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(select_rarity(&catalog, draw), expected);
    }

    #[test]
    fn every_draw_lands_in_its_bucket() {
        let catalog = Catalog::builtin().unwrap();
        for step in 0..1000 {
            let draw = step as f64 / 1000.0;
            let expected = match draw {
                d if d < 0.5 => Rarity::Common,
                d if d < 0.8 => Rarity::Uncommon,
                d if d < 0.95 => Rarity::Rare,
                _ => Rarity::Legendary,
            };

            let catch = resolve_catch(&catalog, &mut Scripted::new([draw, 0.5, 0.5]), epoch());
            assert_eq!(catch.rarity(), expected, "draw {draw}");
        }
    }

    #[test_case(1.0, 3.0, 0.5, 2.0 ; "midpoint")]
    #[test_case(1.0, 3.0, 0.0, 1.0 ; "lowest draw is minimum")]
    #[test_case(0.8, 2.5, 0.999, 2.5 ; "rounds up to maximum")]
    #[test_case(10.0, 30.0, 0.123, 12.5 ; "rounds to one decimal")]
    #[test_case(2.0, 8.0, 1.0, 8.0 ; "draw of one stays at maximum")]
    #[test_case(0.84, 2.0, 0.0, 0.84 ; "rounding never goes below minimum")]
    fn size_from_draw(min_size: f64, max_size: f64, draw: f64, expected: f64) {
        let species = fish(min_size, max_size, 10);
        assert_abs_diff_eq!(size_for(&species, draw), expected, epsilon = 1e-9);
    }

    #[test_case(1.0, 10, 1.0, 10 ; "minimum size is worth base price")]
    #[test_case(1.0, 10, 2.0, 20 ; "double size is worth double")]
    #[test_case(1.0, 10, 3.0, 30 ; "triple size is worth triple")]
    #[test_case(0.5, 25, 1.3, 65 ; "fractional minimum")]
    #[test_case(5.0, 100, 7.3, 146 ; "tuna")]
    #[test_case(2.0, 300, 5.5, 825 ; "arowana")]
    #[test_case(10.0, 500, 15.0, 750 ; "shark")]
    #[test_case(1.0, 10, 1.05, 10 ; "value is floored")]
    fn catch_value(min_size: f64, base_price: u64, size: f64, expected: u64) {
        let species = fish(min_size, min_size * 4.0, base_price);
        assert_eq!(value_for(&species, size), expected);
    }

    #[test]
    fn scripted_catch_of_known_species() {
        let catalog = Catalog::builtin().unwrap();
        // common, first common species (carp), middle of its size range
        let mut random = Scripted::new([0.2, 0.0, 0.5]);

        let catch = resolve_catch(&catalog, &mut random, epoch());

        assert_eq!(random.consumed(), 3);
        assert_eq!(catch.species().name, "Carp");
        assert_abs_diff_eq!(catch.size(), 2.0, epsilon = 1e-9);
        assert_eq!(catch.value(), 20);
        assert_eq!(catch.caught_at(), epoch());
    }

    #[test]
    fn second_species_draw_picks_later_species() {
        let catalog = Catalog::builtin().unwrap();
        let catch = resolve_catch(&catalog, &mut Scripted::new([0.97, 0.75, 0.0]), epoch());

        assert_eq!(catch.species().name, "Arowana");
        assert_eq!(catch.value(), 300);
    }

    #[test]
    fn draws_of_one_are_total() {
        let catalog = Catalog::builtin().unwrap();
        let catch = resolve_catch(&catalog, &mut Scripted::new([1.0]), epoch());

        assert_eq!(catch.species().name, "Arowana");
        assert_abs_diff_eq!(catch.size(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn random_catches_respect_species_bounds() {
        let catalog = Catalog::builtin().unwrap();
        let mut random = RngSource::seeded(1337);

        for _ in 0..10_000 {
            let catch = resolve_catch(&catalog, &mut random, epoch());
            let species = catch.species();

            assert!(catch.size() >= species.min_size);
            assert!(catch.size() <= species.max_size);
            assert!(catch.value() >= species.base_price);
            assert_eq!(catch.value(), value_for(species, catch.size()));
        }
    }

    #[test]
    fn value_does_not_decrease_with_size() {
        let catalog = Catalog::builtin().unwrap();
        for species in catalog.all_species() {
            let mut previous = 0;
            for step in 0..=100 {
                let size = size_for(species, step as f64 / 100.0);
                let value = value_for(species, size);
                assert!(value >= previous, "{} at {size}kg", species.name);
                previous = value;
            }
        }
    }

    #[test]
    fn rarity_frequencies_follow_weights() {
        let catalog = Catalog::builtin().unwrap();
        let mut random = RngSource::seeded(99);
        let mut counts = [0usize; 4];

        let rolls = 100_000;
        for _ in 0..rolls {
            counts[resolve_catch(&catalog, &mut random, epoch()).rarity().index()] += 1;
        }

        for (rarity, weight) in catalog.rarity_weights() {
            let observed = counts[rarity.index()] as f64 / rolls as f64;
            assert_abs_diff_eq!(observed, weight, epsilon = 0.01);
        }
    }

    #[test_case(1.0, 2.0, 0.0, "🐟 fish (1.0kg) worth 10 gold" ; "minimum size")]
    #[test_case(1.0, 2.0, 0.26, "🐟 fish (1.3kg) worth 13 gold" ; "rounded size")]
    fn catch_format(min_size: f64, max_size: f64, draw: f64, expected: &str) {
        let species = Arc::new(fish(min_size, max_size, 10));
        let size = size_for(&species, draw);
        let catch = Catch::new(species, size, epoch());
        assert_eq!(catch.to_string(), expected);
    }
}
