//! Restart-on-exit supervision for long-running network loops.
//!
//! Each network loop (UDP ingestion, HTTP API) runs under its own
//! [`Supervisor`]. The supervisor drives a small state machine per
//! attempt:
//!
//! ```text
//! Starting -> Running -> Returned | Failed | Panicked -> CoolingDown -> Starting
//!                     \-> Stopped (fatal error, supervision ends)
//! ```
//!
//! The cool-down is a fixed delay: no exponential growth, no jitter, no
//! retry limit. Only errors whose [`Escalation::is_fatal`] returns `true`
//! end supervision; everything else, including a panic inside the loop,
//! leads to a restart.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt as _;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Classifies a loop error as recoverable or terminal.
pub trait Escalation {
    /// Whether this error must end supervision instead of triggering a
    /// restart.
    fn is_fatal(&self) -> bool;
}

/// Lifecycle phase of a supervised loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorPhase {
    /// About to start a new attempt.
    Starting,
    /// The loop is running.
    Running,
    /// The loop returned without an error.
    Returned,
    /// The loop returned a recoverable error.
    Failed,
    /// The loop panicked.
    Panicked,
    /// Waiting out the cool-down before the next attempt.
    CoolingDown,
    /// The loop returned a fatal error; no further attempts.
    Stopped,
}

/// Keeps one network loop alive for the life of the process.
#[derive(Debug)]
pub struct Supervisor {
    name: &'static str,
    cooldown: Duration,
    phase: watch::Sender<SupervisorPhase>,
}

impl Supervisor {
    /// Create a supervisor that waits `cooldown` between attempts.
    ///
    /// `name` identifies the loop in log output.
    pub fn new(name: &'static str, cooldown: Duration) -> Self {
        let (phase, _) = watch::channel(SupervisorPhase::Starting);
        Self {
            name,
            cooldown,
            phase,
        }
    }

    /// Follow phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<SupervisorPhase> {
        self.phase.subscribe()
    }

    /// The current phase.
    pub fn phase(&self) -> SupervisorPhase {
        *self.phase.borrow()
    }

    /// Run `start` repeatedly until it yields a fatal error.
    ///
    /// Each call to `start` produces one attempt. When the attempt ends
    /// with `Ok(())`, a non-fatal error, or a panic, the supervisor sleeps
    /// for the cool-down and calls `start` again. The first fatal error is
    /// returned to the caller; in the absence of one this future never
    /// completes.
    pub async fn run<F, Fut, E>(&self, mut start: F) -> E
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Escalation + std::fmt::Display,
    {
        let mut attempt: u64 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            self.enter(SupervisorPhase::Starting);
            let running = start();
            self.enter(SupervisorPhase::Running);
            info!(service = self.name, attempt, "supervised loop started");

            match AssertUnwindSafe(running).catch_unwind().await {
                Ok(Ok(())) => {
                    self.enter(SupervisorPhase::Returned);
                    warn!(
                        service = self.name,
                        attempt,
                        cooldown_ms = self.cooldown.as_millis(),
                        "supervised loop returned, restarting after cool-down"
                    );
                }
                Ok(Err(e)) if e.is_fatal() => {
                    self.enter(SupervisorPhase::Stopped);
                    error!(
                        service = self.name,
                        attempt,
                        error = %e,
                        "supervised loop hit a fatal error, giving up"
                    );
                    return e;
                }
                Ok(Err(e)) => {
                    self.enter(SupervisorPhase::Failed);
                    warn!(
                        service = self.name,
                        attempt,
                        error = %e,
                        cooldown_ms = self.cooldown.as_millis(),
                        "supervised loop failed, restarting after cool-down"
                    );
                }
                Err(payload) => {
                    self.enter(SupervisorPhase::Panicked);
                    error!(
                        service = self.name,
                        attempt,
                        panic = panic_message(payload.as_ref()),
                        cooldown_ms = self.cooldown.as_millis(),
                        "supervised loop panicked, restarting after cool-down"
                    );
                }
            }

            self.enter(SupervisorPhase::CoolingDown);
            tokio::time::sleep(self.cooldown).await;
        }
    }

    fn enter(&self, phase: SupervisorPhase) {
        self.phase.send_replace(phase);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
