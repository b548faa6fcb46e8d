use std::{mem, sync::Arc, time::Duration};

use log::{debug, info};
use rand::rngs::StdRng;

use crate::{
    catalog::Catalog,
    clock::{Clock, SystemClock},
    ledger::{LevelUp, PlayerState, Progress},
    lifecycle::{Lifecycle, Phase, Timings, Transition},
    random::{RandomSource, RngSource},
    reward::{resolve_catch, Catch},
    shop::{PurchaseError, Shop, ShopItem},
};

/// Notifications for whoever presents the game, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PhaseChanged(Phase),
    CatchResolved { catch: Catch, progress: Progress },
    LevelUp(LevelUp),
    Cancelled,
}

/// The one owner of all mutable game state.
///
/// Intents and [`FishingSession::poll`] are the only ways to change anything;
/// a driver calls `poll` whenever [`FishingSession::next_deadline`] passes.
#[derive(Debug)]
pub struct FishingSession<C = SystemClock, R = RngSource<StdRng>> {
    catalog: Arc<Catalog>,
    shop: Shop,
    timings: Timings,
    player: PlayerState,
    lifecycle: Lifecycle,
    displayed: Option<Catch>,
    clock: C,
    random: R,
    events: Vec<Event>,
}

impl FishingSession {
    pub fn new(catalog: Arc<Catalog>, timings: Timings, player: PlayerState) -> Self {
        Self::with_parts(
            catalog,
            Shop::default(),
            timings,
            player,
            SystemClock::new(),
            RngSource::from_entropy(),
        )
    }
}

impl<C: Clock, R: RandomSource> FishingSession<C, R> {
    pub fn with_parts(
        catalog: Arc<Catalog>,
        shop: Shop,
        timings: Timings,
        player: PlayerState,
        clock: C,
        random: R,
    ) -> Self {
        Self {
            catalog,
            shop,
            timings,
            player,
            lifecycle: Lifecycle::new(),
            displayed: None,
            clock,
            random,
            events: Vec::new(),
        }
    }

    /// Casts the line. Ignored while an attempt is in flight.
    pub fn start_fishing(&mut self) -> bool {
        let now = self.clock.now();
        if !self.lifecycle.start(now, &self.timings, &mut self.random) {
            return false;
        }

        debug!("Started fishing");
        self.displayed = None;
        self.events.push(Event::PhaseChanged(Phase::Casting));

        true
    }

    /// Abandons the attempt in flight without any reward.
    pub fn cancel_fishing(&mut self) -> bool {
        if !self.lifecycle.cancel() {
            return false;
        }

        debug!("Cancelled fishing");
        self.events.push(Event::Cancelled);
        self.events.push(Event::PhaseChanged(Phase::Idle));

        true
    }

    /// Hides the last catch. Returns `false` if nothing was shown.
    pub fn dismiss_catch(&mut self) -> bool {
        self.displayed.take().is_some()
    }

    pub fn purchase(&mut self, item: &str) -> Result<&ShopItem, PurchaseError> {
        self.shop.purchase(&mut self.player, item)
    }

    /// Fires every transition that is due. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        let fired = self.lifecycle.poll(self.clock.now());

        for transition in &fired {
            match transition {
                Transition::Wait => self.events.push(Event::PhaseChanged(Phase::Waiting)),
                Transition::Bite => self.events.push(Event::PhaseChanged(Phase::Biting)),
                Transition::Resolve => self.resolve(),
            }
        }

        fired.len()
    }

    fn resolve(&mut self) {
        let catch = resolve_catch(&self.catalog, &mut self.random, self.clock.timestamp());
        info!("Caught {catch}");

        let progress = self.player.apply_catch(catch.clone());
        self.displayed = Some(catch.clone());

        self.events.push(Event::PhaseChanged(Phase::Idle));
        self.events.push(Event::CatchResolved { catch, progress });
        if let Some(level_up) = progress.level_up {
            self.events.push(Event::LevelUp(level_up));
        }
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.events)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.lifecycle.next_deadline()
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// Time since the line was cast, while fishing.
    pub fn elapsed(&self) -> Option<Duration> {
        self.lifecycle.elapsed(self.clock.now())
    }

    pub fn displayed_catch(&self) -> Option<&Catch> {
        self.displayed.as_ref()
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
