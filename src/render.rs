//! Plain-text views of the game state.

use std::{fmt::Write, time::Duration};

use lure_core::{
    ledger::EXPERIENCE_PER_LEVEL, Catalog, Catch, LevelUp, Phase, PlayerState, Shop,
};

pub const HELP: &str = "\
commands:
  fish        cast your line
  ok          put the last catch away
  leave       reel in without waiting for a catch
  status      level, gold and experience
  collection  species you have caught so far
  shop        tackle for sale
  buy <item>  buy something from the shop
  quit        stop playing";

pub fn phase_message(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Idle => None,
        Phase::Casting => Some("🎣 Casting..."),
        Phase::Waiting => Some("⏳ Waiting for a bite..."),
        Phase::Biting => Some("🎯 Something's biting!"),
    }
}

/// Whole seconds, the way the fishing timer ticks.
pub fn elapsed(elapsed: Duration) -> String {
    humantime::format_duration(Duration::from_secs(elapsed.as_secs())).to_string()
}

pub fn status(player: &PlayerState, phase: Phase, fishing_for: Option<Duration>) -> String {
    let mut out = format!(
        "Level {} · 💰 {} gold · 💎 {} diamonds · 🐟 {} caught\n\
         Experience: {}/{} (next level: {})",
        player.level(),
        player.gold(),
        player.diamonds(),
        player.history().len(),
        player.experience_into_level(),
        EXPERIENCE_PER_LEVEL,
        player.level() + 1,
    );

    if let (Some(message), Some(fishing_for)) = (phase_message(phase), fishing_for) {
        let _ = write!(out, "\n{message} ⏱️ {}", elapsed(fishing_for));
    }

    out
}

pub fn catch_card(catch: &Catch, catalog: &Catalog) -> String {
    let species = catch.species();
    format!(
        "🎉 You caught something!\n\
         {} {} [{}]\n\
         Weight: {:.1}kg\n\
         Value: {} gold\n\
         (type `ok` to put it away)",
        species.glyph,
        species.name,
        catalog.rarity(species.rarity).name,
        catch.size(),
        catch.value(),
    )
}

pub fn level_up(level_up: &LevelUp) -> String {
    format!(
        "🎉 Level up! You reached level {} and earned {} bonus gold!",
        level_up.to, level_up.bonus
    )
}

pub fn collection(player: &PlayerState, catalog: &Catalog) -> String {
    let progress = player.collection_progress(catalog);
    let mut out = format!(
        "📚 Collected: {}/{} species ({}%)",
        progress.discovered,
        progress.total,
        progress.percent()
    );

    for species in catalog.all_species() {
        match player.first_catch_of(species.id) {
            Some(catch) => {
                let _ = write!(
                    out,
                    "\n  {} {} [{}] {:.1}kg, first caught {}",
                    species.glyph,
                    species.name,
                    catalog.rarity(species.rarity).name,
                    catch.size(),
                    catch.caught_at().format("%Y-%m-%d %H:%M:%S"),
                );
            }
            None => out.push_str("\n  ❓ Unknown fish"),
        }
    }

    out
}

pub fn shop(shop: &Shop, player: &PlayerState) -> String {
    let mut out = format!("🛒 Tackle shop · 💰 {} gold", player.gold());

    for item in shop.items() {
        let _ = write!(
            out,
            "\n  {:<14} {} ({}) · {} gold",
            item.id, item.name, item.kind, item.price
        );
        if !shop.affordable(item, player) {
            out.push_str(" · can't afford");
        }
    }

    out
}
