//! Periodic clock driver.
//!
//! The driver never touches the game. The actor charges elapsed time itself
//! whenever it handles a command; the driver only makes sure a command
//! arrives every period, so a flag falls even while nobody moves.

use crate::actor::GameHandle;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Handle to a running clock driver task.
pub struct ClockDriver {
    paused: watch::Sender<bool>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ClockDriver {
    /// Starts ticking `game` every `period`.
    pub fn spawn(game: GameHandle, period: Duration) -> Self {
        let (paused, paused_rx) = watch::channel(false);
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(drive(game, period, paused_rx, shutdown_rx));
        ClockDriver {
            paused,
            shutdown,
            task,
        }
    }

    /// Pauses the game clocks and stops ticking. Time spent paused is never
    /// charged.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Restarts the side to move's clock and resumes ticking.
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Stops the driver and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

async fn drive(
    game: GameHandle,
    period: Duration,
    mut paused: watch::Receiver<bool>,
    mut shutdown: oneshot::Receiver<()>,
) {
    info!(?period, "clock driver started");
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let idle = *paused.borrow();
        let sent = tokio::select! {
            _ = &mut shutdown => break,
            changed = paused.changed() => {
                if changed.is_err() {
                    break;
                }
                if *paused.borrow_and_update() {
                    game.pause_clocks().await
                } else {
                    interval.reset();
                    game.resume_clock().await
                }
            }
            _ = interval.tick(), if !idle => game.tick().await.map(|flagged| {
                if let Some(result) = flagged {
                    debug!(%result, "clock expired");
                }
            }),
        };
        if sent.is_err() {
            break;
        }
    }
    info!("clock driver stopped");
}
