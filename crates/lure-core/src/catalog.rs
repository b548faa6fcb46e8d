use std::{collections::BTreeMap, fmt::Display, fs, path::Path, sync::Arc};

use log::debug;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};

/// Allowed distance between the summed rarity weights and `1.0`.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

pub type SpeciesId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    /// Canonical order used when walking the rarity table.
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Legendary,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }
}

impl Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Freshwater,
    Saltwater,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Freshwater => f.write_str("freshwater"),
            Category::Saltwater => f.write_str("saltwater"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    pub category: Category,
    pub rarity: Rarity,
    pub min_size: f64,
    pub max_size: f64,
    pub base_price: u64,
    pub glyph: String,
}

impl Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({:.1}kg - {:.1}kg)",
            self.glyph, self.name, self.min_size, self.max_size
        )
    }
}

/// Display data and selection weight of one rarity class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityInfo {
    pub name: String,
    pub color: String,
    pub background: String,
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    rarities: BTreeMap<Rarity, RarityInfo>,
    species: Vec<Species>,
}

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("rarity weights sum to {sum}, expected 1.0")]
    #[diagnostic(code(catalog::weight_sum))]
    WeightSum { sum: f64 },

    #[error("rarity {rarity} has invalid weight {weight}")]
    #[diagnostic(code(catalog::invalid_weight))]
    InvalidWeight { rarity: Rarity, weight: f64 },

    #[error("rarity {0} is missing from the rarity table")]
    #[diagnostic(code(catalog::missing_rarity))]
    MissingRarity(Rarity),

    #[error("no species of rarity {0}")]
    #[diagnostic(code(catalog::empty_rarity))]
    EmptyRarity(Rarity),

    #[error("species {id} has invalid size range {min_size}kg - {max_size}kg")]
    #[diagnostic(code(catalog::invalid_size_range))]
    InvalidSizeRange {
        id: SpeciesId,
        min_size: f64,
        max_size: f64,
    },

    #[error("species {0} has no base price")]
    #[diagnostic(code(catalog::zero_price))]
    ZeroPrice(SpeciesId),

    #[error("species id {0} is used more than once")]
    #[diagnostic(code(catalog::duplicate_id))]
    DuplicateId(SpeciesId),

    #[error("could not read catalog file {path}")]
    #[diagnostic(code(catalog::read_file))]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse catalog")]
    #[diagnostic(code(catalog::parse))]
    Parse(#[source] ron::error::SpannedError),
}

/// Validated, immutable reference data for the reward engine.
///
/// Every rarity class has a table entry and at least one species, so lookups
/// by rarity never fail once a `Catalog` exists.
#[derive(Debug, Clone)]
pub struct Catalog {
    species: Vec<Arc<Species>>,
    rarities: Vec<RarityInfo>,
    buckets: Vec<Vec<Arc<Species>>>,
}

impl Catalog {
    pub fn new(
        species: Vec<Species>,
        mut rarities: BTreeMap<Rarity, RarityInfo>,
    ) -> Result<Self, Error> {
        let mut table = Vec::with_capacity(Rarity::ALL.len());
        for rarity in Rarity::ALL {
            let info = rarities
                .remove(&rarity)
                .ok_or(Error::MissingRarity(rarity))?;
            if !info.weight.is_finite() || info.weight < 0.0 {
                return Err(Error::InvalidWeight {
                    rarity,
                    weight: info.weight,
                });
            }
            table.push(info);
        }

        let sum: f64 = table.iter().map(|info| info.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::WeightSum { sum });
        }

        let mut seen = Vec::with_capacity(species.len());
        for fish in &species {
            if seen.contains(&fish.id) {
                return Err(Error::DuplicateId(fish.id));
            }
            seen.push(fish.id);

            if !(fish.min_size > 0.0 && fish.min_size <= fish.max_size) {
                return Err(Error::InvalidSizeRange {
                    id: fish.id,
                    min_size: fish.min_size,
                    max_size: fish.max_size,
                });
            }
            if fish.base_price == 0 {
                return Err(Error::ZeroPrice(fish.id));
            }
        }

        let species: Vec<_> = species.into_iter().map(Arc::new).collect();
        let mut buckets = Vec::with_capacity(Rarity::ALL.len());
        for rarity in Rarity::ALL {
            let bucket: Vec<_> = species
                .iter()
                .filter(|fish| fish.rarity == rarity)
                .cloned()
                .collect();
            if bucket.is_empty() {
                return Err(Error::EmptyRarity(rarity));
            }
            buckets.push(bucket);
        }

        debug!(
            "Loaded catalog with {} species (weights sum to {sum})",
            species.len()
        );

        Ok(Self {
            species,
            rarities: table,
            buckets,
        })
    }

    /// The eight species the game ships with.
    pub fn builtin() -> Result<Self, Error> {
        let rarities = BTreeMap::from([
            (Rarity::Common, rarity("Common", "#9CA3AF", "#F3F4F6", 0.5)),
            (Rarity::Uncommon, rarity("Uncommon", "#10B981", "#D1FAE5", 0.3)),
            (Rarity::Rare, rarity("Rare", "#3B82F6", "#DBEAFE", 0.15)),
            (Rarity::Legendary, rarity("Legendary", "#F59E0B", "#FEF3C7", 0.05)),
        ]);

        use Category::*;
        use Rarity::*;
        let species = vec![
            species(1, "Carp", Freshwater, Common, 1.0..=3.0, 10, "🐟"),
            species(2, "Black Bass", Freshwater, Common, 0.8..=2.5, 15, "🐟"),
            species(3, "Mandarin Fish", Freshwater, Uncommon, 0.5..=2.0, 25, "🐠"),
            species(4, "Catfish", Freshwater, Uncommon, 1.5..=4.0, 20, "🐡"),
            species(5, "Sea Bass", Saltwater, Rare, 2.0..=6.0, 50, "🦈"),
            species(6, "Tuna", Saltwater, Rare, 5.0..=15.0, 100, "🐟"),
            species(7, "Shark", Saltwater, Legendary, 10.0..=30.0, 500, "🦈"),
            species(8, "Arowana", Freshwater, Legendary, 2.0..=8.0, 300, "🐉"),
        ];

        Self::new(species, rarities)
    }

    pub fn from_ron(text: &str) -> Result<Self, Error> {
        let file: CatalogFile = ron::from_str(text).map_err(Error::Parse)?;
        Self::new(file.species, file.rarities)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Reading catalog from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn all_species(&self) -> &[Arc<Species>] {
        &self.species
    }

    /// Species of one rarity, in catalog order. Never empty.
    pub fn species_of_rarity(&self, rarity: Rarity) -> &[Arc<Species>] {
        &self.buckets[rarity.index()]
    }

    /// Selection weights in canonical rarity order.
    pub fn rarity_weights(&self) -> impl Iterator<Item = (Rarity, f64)> + '_ {
        Rarity::ALL
            .into_iter()
            .map(|rarity| (rarity, self.rarities[rarity.index()].weight))
    }

    pub fn rarity(&self, rarity: Rarity) -> &RarityInfo {
        &self.rarities[rarity.index()]
    }

    pub fn species(&self, id: SpeciesId) -> Option<&Arc<Species>> {
        self.species.iter().find(|fish| fish.id == id)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

fn rarity(name: &str, color: &str, background: &str, weight: f64) -> RarityInfo {
    RarityInfo {
        name: name.to_string(),
        color: color.to_string(),
        background: background.to_string(),
        weight,
    }
}

fn species(
    id: SpeciesId,
    name: &str,
    category: Category,
    rarity: Rarity,
    size: std::ops::RangeInclusive<f64>,
    base_price: u64,
    glyph: &str,
) -> Species {
    Species {
        id,
        name: name.to_string(),
        category,
        rarity,
        min_size: *size.start(),
        max_size: *size.end(),
        base_price,
        glyph: glyph.to_string(),
    }
}
