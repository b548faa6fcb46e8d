#![forbid(unsafe_code)]

use std::sync::Arc;

use log::info;
use lure_core::{FishingSession, PlayerState, RngSource, Shop, SystemClock};
use lure_master::{
    config::Config,
    runner::{self, register_signals},
};
use miette::{Result, WrapErr};

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init_timed();
    dotenvy::dotenv().ok();

    run().await.wrap_err("failed to run game")
}

async fn run() -> Result<()> {
    let config = Config::load()?;

    let catalog = Arc::new(config.catalog()?);
    let timings = config.timings()?;
    info!(
        "Loaded {} species, casting takes {}",
        catalog.len(),
        humantime::format_duration(timings.cast())
    );

    let random = match config.seed {
        Some(seed) => {
            info!("Using seed {seed}");
            RngSource::seeded(seed)
        }
        None => RngSource::from_entropy(),
    };

    let session = FishingSession::with_parts(
        catalog,
        Shop::default(),
        timings,
        PlayerState::new(config.starting_gold),
        SystemClock::new(),
        random,
    );

    let (quit, quit_handle, quit_task) = register_signals()?;

    runner::run(session, config.level_up_notice, quit).await?;

    quit_handle.close();
    quit_task.await.map_err(runner::Error::SignalsTask)?;

    info!("Goodbye");

    Ok(())
}
