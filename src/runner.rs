use std::{io::BufRead, sync::Arc, thread, time::Duration};

use futures_lite::stream::StreamExt;
use log::{debug, info, warn};
use lure_core::{Clock, Event, FishingSession, RandomSource, SystemClock};
use miette::Diagnostic;
use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::{
    select,
    sync::{mpsc, Notify},
    task::JoinHandle,
    time::{sleep, sleep_until, Instant},
};

use crate::{commands::Command, render};

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("could not register signals")]
    #[diagnostic(code(runner::register_signals))]
    RegisterSignals(#[source] std::io::Error),

    #[error("could not read from stdin")]
    #[diagnostic(code(runner::read_input))]
    ReadInput(#[source] std::io::Error),

    #[error("failed to run signals task")]
    #[diagnostic(code(runner::signals_task))]
    SignalsTask(#[source] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn register_signals() -> Result<(Arc<Notify>, signal_hook_tokio::Handle, JoinHandle<()>), Error>
{
    info!("Registering signals");

    let signals = Signals::new([SIGINT, SIGTERM, SIGQUIT]).map_err(Error::RegisterSignals)?;
    let notify = Arc::new(Notify::new());

    let handle = signals.handle();
    let task = tokio::spawn(handle_signals(signals, notify.clone()));

    Ok((notify, handle, task))
}

/// Reads stdin on a plain thread so a pending read never holds up shutdown.
fn spawn_input() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

async fn handle_signals(mut signals: Signals, quit_signal: Arc<Notify>) {
    info!("Starting signal handler");
    while let Some(signal) = signals.next().await {
        match signal {
            SIGTERM | SIGINT | SIGQUIT => {
                // keeps a permit even if the game loop is busy right now
                quit_signal.notify_one();
                break;
            }
            _ => unreachable!(),
        }
    }
}

/// Owns the session and serializes every change to it: typed commands, due
/// transitions and shutdown are all handled on this one task.
pub async fn run<R: RandomSource>(
    mut session: FishingSession<SystemClock, R>,
    level_up_notice: Duration,
    quit: Arc<Notify>,
) -> Result<(), Error> {
    let origin = Instant::from_std(session.clock().origin());
    let mut lines = spawn_input();

    println!("🎣 Lure Master. Type `help` for commands.");

    loop {
        let deadline = session.next_deadline().map(|due| origin + due);

        select! {
            line = lines.recv() => {
                let Some(line) = line.transpose().map_err(Error::ReadInput)? else {
                    debug!("Input closed");
                    break;
                };
                if handle_line(&mut session, &line) == Flow::Quit {
                    break;
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                session.poll();
            }
            _ = quit.notified() => {
                info!("Received quit signal");
                break;
            }
        }

        for event in session.drain_events() {
            present(&session, event, level_up_notice);
        }
    }

    if session.phase().is_fishing() {
        warn!("Quitting in the middle of an attempt");
    }

    Ok(())
}

fn handle_line<C: Clock, R: RandomSource>(session: &mut FishingSession<C, R>, line: &str) -> Flow {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(crate::commands::Error::Empty) => return Flow::Continue,
        Err(err) => {
            println!("{err}");
            return Flow::Continue;
        }
    };

    debug!("Handling {command:?}");

    match command {
        Command::Fish => {
            if !session.start_fishing() {
                debug!("Already fishing");
            }
        }
        Command::Dismiss => {
            session.dismiss_catch();
        }
        Command::Leave => {
            session.cancel_fishing();
        }
        Command::Status => {
            println!(
                "{}",
                render::status(session.player(), session.phase(), session.elapsed())
            );
        }
        Command::Collection => {
            println!("{}", render::collection(session.player(), session.catalog()));
        }
        Command::Shop => {
            println!("{}", render::shop(session.shop(), session.player()));
        }
        Command::Buy(item) => match session.purchase(&item) {
            Ok(item) => println!("🛒 Bought {} for {} gold", item.name, item.price),
            Err(err) => println!("{err}"),
        },
        Command::Help => println!("{}", render::HELP),
        Command::Quit => return Flow::Quit,
    }

    Flow::Continue
}

fn present<C: Clock, R: RandomSource>(
    session: &FishingSession<C, R>,
    event: Event,
    level_up_notice: Duration,
) {
    match event {
        Event::PhaseChanged(phase) => {
            if let Some(message) = render::phase_message(phase) {
                println!("{message}");
            }
        }
        Event::CatchResolved { catch, .. } => {
            println!("{}", render::catch_card(&catch, session.catalog()));
        }
        Event::LevelUp(level_up) => {
            // the bonus is already paid, only the notice waits
            let notice = render::level_up(&level_up);
            tokio::spawn(async move {
                sleep(level_up_notice).await;
                println!("{notice}");
            });
        }
        Event::Cancelled => println!("🎣 You reel in your line."),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lure_core::{Catalog, ManualClock, Phase, PlayerState, Scripted, Shop, Timings};

    use super::*;

    fn session() -> FishingSession<ManualClock, Scripted> {
        FishingSession::with_parts(
            Arc::new(Catalog::builtin().unwrap()),
            Shop::default(),
            Timings::default(),
            PlayerState::default(),
            ManualClock::new(),
            Scripted::new(vec![0.0]),
        )
    }

    #[test]
    fn fish_starts_an_attempt() {
        let mut session = session();
        assert_eq!(handle_line(&mut session, "fish"), Flow::Continue);
        assert_eq!(session.phase(), Phase::Casting);
    }

    #[test]
    fn leave_cancels_the_attempt() {
        let mut session = session();
        handle_line(&mut session, "fish");
        handle_line(&mut session, "leave");
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn buy_spends_gold() {
        let mut session = session();
        handle_line(&mut session, "buy basic-lure");
        assert_eq!(session.player().gold(), 80);
    }

    #[test]
    fn bad_input_keeps_going() {
        let mut session = session();
        assert_eq!(handle_line(&mut session, ""), Flow::Continue);
        assert_eq!(handle_line(&mut session, "swim"), Flow::Continue);
        assert_eq!(handle_line(&mut session, "buy golden-rod"), Flow::Continue);
        assert_eq!(session.player().gold(), 100);
    }

    #[test]
    fn quit_stops_the_loop() {
        assert_eq!(handle_line(&mut session(), "quit"), Flow::Quit);
    }
}
