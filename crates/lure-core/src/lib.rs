#![forbid(unsafe_code)]

pub mod catalog;
pub mod clock;
pub mod ledger;
pub mod lifecycle;
pub mod random;
pub mod reward;
pub mod session;
pub mod shop;

pub use catalog::{Catalog, Category, Rarity, RarityInfo, Species, SpeciesId};
pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{CollectionProgress, LevelUp, PlayerState, Progress};
pub use lifecycle::{Lifecycle, Phase, Timings};
pub use random::{RandomSource, RngSource, Scripted};
pub use reward::{resolve_catch, Catch};
pub use session::{Event, FishingSession};
pub use shop::{ItemKind, PurchaseError, Shop, ShopItem};
