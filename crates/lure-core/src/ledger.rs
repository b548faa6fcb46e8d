use std::collections::BTreeSet;

use log::{debug, info};

use crate::{
    catalog::{Catalog, SpeciesId},
    reward::Catch,
};

pub const EXPERIENCE_PER_LEVEL: u64 = 100;
/// One point of experience per this much gold of catch value.
pub const GOLD_PER_EXPERIENCE: u64 = 5;
pub const LEVEL_BONUS_PER_LEVEL: u64 = 10;
pub const STARTING_GOLD: u64 = 100;

/// Level reached with `experience` points in total.
pub fn level_for(experience: u64) -> u32 {
    (experience / EXPERIENCE_PER_LEVEL + 1) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
    pub bonus: u64,
}

/// What applying one catch changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub experience_gained: u64,
    pub gold_gained: u64,
    pub level_up: Option<LevelUp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionProgress {
    pub discovered: usize,
    pub total: usize,
}

impl CollectionProgress {
    /// Rounded to the nearest whole percent.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.discovered as f64 / self.total as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    level: u32,
    experience: u64,
    gold: u64,
    diamonds: u64,
    history: Vec<Catch>,
    inventory: Vec<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(STARTING_GOLD)
    }
}

impl PlayerState {
    pub fn new(gold: u64) -> Self {
        Self {
            level: 1,
            experience: 0,
            gold,
            diamonds: 0,
            history: Vec::new(),
            inventory: Vec::new(),
        }
    }

    /// Starts from arbitrary experience; the level is derived from it.
    pub fn with_experience(gold: u64, experience: u64) -> Self {
        Self {
            level: level_for(experience),
            experience,
            ..Self::new(gold)
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn gold(&self) -> u64 {
        self.gold
    }

    pub fn diamonds(&self) -> u64 {
        self.diamonds
    }

    /// Every catch ever made, oldest first.
    pub fn history(&self) -> &[Catch] {
        &self.history
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    /// Progress towards the next level, out of [`EXPERIENCE_PER_LEVEL`].
    pub fn experience_into_level(&self) -> u64 {
        self.experience % EXPERIENCE_PER_LEVEL
    }

    /// Credits a resolved catch.
    ///
    /// The level-up bonus is paid out together with the catch itself, so no
    /// later update can overwrite it.
    pub fn apply_catch(&mut self, catch: Catch) -> Progress {
        let experience_gained = catch.value() / GOLD_PER_EXPERIENCE;
        let gold_gained = catch.value();

        let previous_level = self.level;
        self.experience += experience_gained;
        self.level = level_for(self.experience);
        self.gold += gold_gained;

        let level_up = (self.level > previous_level).then(|| LevelUp {
            from: previous_level,
            to: self.level,
            bonus: u64::from(self.level) * LEVEL_BONUS_PER_LEVEL,
        });

        if let Some(level_up) = level_up {
            info!(
                "Reached level {} (bonus {} gold)",
                level_up.to, level_up.bonus
            );
            self.gold += level_up.bonus;
        }

        debug!("Recorded {catch} (+{experience_gained} xp)");
        self.history.push(catch);

        Progress {
            experience_gained,
            gold_gained,
            level_up,
        }
    }

    /// Takes `amount` gold if there is enough. Leaves the balance untouched
    /// otherwise.
    pub fn spend_gold(&mut self, amount: u64) -> bool {
        match self.gold.checked_sub(amount) {
            Some(rest) => {
                self.gold = rest;
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_item(&mut self, item: String) {
        self.inventory.push(item);
    }

    pub fn has_caught(&self, species: SpeciesId) -> bool {
        self.first_catch_of(species).is_some()
    }

    pub fn first_catch_of(&self, species: SpeciesId) -> Option<&Catch> {
        self.history
            .iter()
            .find(|catch| catch.species().id == species)
    }

    pub fn discovered_species(&self) -> BTreeSet<SpeciesId> {
        self.history
            .iter()
            .map(|catch| catch.species().id)
            .collect()
    }

    pub fn collection_progress(&self, catalog: &Catalog) -> CollectionProgress {
        CollectionProgress {
            discovered: self
                .discovered_species()
                .into_iter()
                .filter(|id| catalog.species(*id).is_some())
                .count(),
            total: catalog.len(),
        }
    }
}
