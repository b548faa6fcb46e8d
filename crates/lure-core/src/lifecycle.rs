use std::{fmt::Display, ops::Range, time::Duration};

use log::{debug, trace};
use miette::Diagnostic;

use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Casting,
    Waiting,
    /// Cosmetic part of waiting: only the message changes.
    Biting,
}

impl Phase {
    pub fn is_fishing(self) -> bool {
        self != Phase::Idle
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Casting => "casting",
            Phase::Waiting => "waiting",
            Phase::Biting => "biting",
        })
    }
}

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("{name} window ends before it starts")]
    #[diagnostic(code(lifecycle::inverted_window))]
    InvertedWindow { name: &'static str },
}

/// Delays of one attempt, measured from the moment the line is cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    cast: Duration,
    bite_window: Range<Duration>,
    resolve_window: Range<Duration>,
}

impl Timings {
    pub fn new(
        cast: Duration,
        bite_window: Range<Duration>,
        resolve_window: Range<Duration>,
    ) -> Result<Self, Error> {
        if bite_window.end < bite_window.start {
            return Err(Error::InvertedWindow { name: "bite" });
        }
        if resolve_window.end < resolve_window.start {
            return Err(Error::InvertedWindow { name: "resolve" });
        }

        Ok(Self {
            cast,
            bite_window,
            resolve_window,
        })
    }

    pub fn cast(&self) -> Duration {
        self.cast
    }

    pub fn bite_window(&self) -> &Range<Duration> {
        &self.bite_window
    }

    pub fn resolve_window(&self) -> &Range<Duration> {
        &self.resolve_window
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            cast: Duration::from_secs(1),
            bite_window: Duration::from_millis(2500)..Duration::from_millis(4000),
            resolve_window: Duration::from_secs(3)..Duration::from_secs(7),
        }
    }
}

fn delay_in(window: &Range<Duration>, draw: f64) -> Duration {
    window.start + (window.end - window.start).mul_f64(draw.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Wait,
    Bite,
    /// The only transition with effects on the player.
    Resolve,
}

#[derive(Debug, Clone)]
pub struct Attempt {
    started_at: Duration,
    phase: Phase,
    /// Ascending by due time.
    pending: Vec<(Duration, Transition)>,
}

impl Attempt {
    fn begin(now: Duration, timings: &Timings, random: &mut impl RandomSource) -> Self {
        let bite = delay_in(&timings.bite_window, random.next_unit());
        let resolve = delay_in(&timings.resolve_window, random.next_unit());

        let mut pending = vec![
            (now + timings.cast, Transition::Wait),
            (now + bite, Transition::Bite),
            (now + resolve, Transition::Resolve),
        ];
        // stable, so ties fire in the order above
        pending.sort_by_key(|(due, _)| *due);

        Self {
            started_at: now,
            phase: Phase::Casting,
            pending,
        }
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn resolves_at(&self) -> Option<Duration> {
        self.pending
            .iter()
            .find(|(_, transition)| *transition == Transition::Resolve)
            .map(|(due, _)| *due)
    }
}

/// Single-flight fishing state machine.
///
/// Time only moves through [`Lifecycle::poll`], which makes the machine
/// deterministic under a virtual clock.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    attempt: Option<Attempt>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Casts the line. Returns `false` without touching anything if an attempt
    /// is already in flight.
    pub fn start(
        &mut self,
        now: Duration,
        timings: &Timings,
        random: &mut impl RandomSource,
    ) -> bool {
        if self.attempt.is_some() {
            debug!("Ignoring cast while an attempt is in flight");
            return false;
        }

        let attempt = Attempt::begin(now, timings, random);
        trace!("Scheduled transitions: {:?}", attempt.pending);
        self.attempt = Some(attempt);

        true
    }

    /// Fires every transition due at `now`, in order.
    ///
    /// Firing [`Transition::Resolve`] ends the attempt and drops whatever was
    /// still pending.
    pub fn poll(&mut self, now: Duration) -> Vec<Transition> {
        let mut fired = Vec::new();

        let Some(attempt) = self.attempt.as_mut() else {
            return fired;
        };

        while attempt
            .pending
            .first()
            .map_or(false, |(due, _)| *due <= now)
        {
            let (_, transition) = attempt.pending.remove(0);
            fired.push(transition);

            match transition {
                Transition::Wait => attempt.phase = Phase::Waiting,
                Transition::Bite => attempt.phase = Phase::Biting,
                Transition::Resolve => break,
            }
        }

        if fired.last() == Some(&Transition::Resolve) {
            self.attempt = None;
        }

        fired
    }

    /// Abandons the attempt in flight. Returns `false` if there was none.
    pub fn cancel(&mut self) -> bool {
        self.attempt.take().is_some()
    }

    pub fn phase(&self) -> Phase {
        self.attempt
            .as_ref()
            .map_or(Phase::Idle, |attempt| attempt.phase)
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    pub fn elapsed(&self, now: Duration) -> Option<Duration> {
        self.attempt
            .as_ref()
            .map(|attempt| now.saturating_sub(attempt.started_at))
    }

    /// When the next transition is due, if an attempt is in flight.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.attempt
            .as_ref()
            .and_then(|attempt| attempt.pending.first())
            .map(|(due, _)| *due)
    }
}
