//! Trigger bus: producers on one side, a single pass worker on the other.
//!
//! ```text
//! SIGHUP adapter ──┐
//!                  ├─► [ queue, depth 1 ] ─► worker ─► pass, pass, ...
//! startup trigger ─┘
//! ```
//!
//! The queue holds at most one pending trigger. While a pass runs, the first
//! trigger to arrive is kept and every further one is dropped until the
//! worker takes it, so any burst collapses to one follow-up pass.

use std::fmt;
use std::sync::Arc;

use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::{broadcast, mpsc};
use tokio::sync::mpsc::error::TrySendError;

use crate::error::DaemonError;

/// Depth of the trigger queue.
pub const QUEUE_DEPTH: usize = 1;

/// Why a pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Injected once when the process starts.
    Startup,
    /// SIGHUP received.
    Hangup,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Startup => write!(f, "startup"),
            Trigger::Hangup => write!(f, "sighup"),
        }
    }
}

/// What happened to a fired trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// A trigger was already pending.
    Dropped,
    /// The worker is gone.
    Closed,
}

/// Producer handle onto the trigger queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TriggerBus {
    tx: mpsc::Sender<Trigger>,
}

impl TriggerBus {
    pub fn new() -> (Self, mpsc::Receiver<Trigger>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        (Self { tx }, rx)
    }

    /// Offer `trigger` without waiting.
    pub fn fire(&self, trigger: Trigger) -> Delivery {
        match self.tx.try_send(trigger) {
            Ok(()) => {
                tracing::debug!(trigger = %trigger, "trigger queued");
                Delivery::Queued
            }
            Err(TrySendError::Full(_)) => {
                tracing::debug!(trigger = %trigger, "pass already pending; trigger dropped");
                Delivery::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(trigger = %trigger, "pass worker stopped; trigger discarded");
                Delivery::Closed
            }
        }
    }
}

/// Subscribe to SIGHUP. Once this returns the default "terminate" action is
/// replaced, so call it before anything can send the signal.
pub fn subscribe_hangup() -> Result<Signal, DaemonError> {
    signal(SignalKind::hangup()).map_err(|source| DaemonError::Signal {
        signal: "SIGHUP",
        source,
    })
}

/// Forward every SIGHUP to the bus until shutdown.
pub async fn hangup_task(
    bus: TriggerBus,
    mut hangup: Signal,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }
                tracing::info!("received SIGHUP");
                if bus.fire(Trigger::Hangup) == Delivery::Closed {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Consume triggers one at a time, running `pass` on the blocking pool and
/// waiting for it before taking the next trigger. Passes never overlap and
/// shutdown is only observed between passes.
pub async fn worker_task<F>(
    mut trigger_rx: mpsc::Receiver<Trigger>,
    pass: F,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError>
where
    F: Fn(Trigger) + Send + Sync + 'static,
{
    let pass = Arc::new(pass);
    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break,
            maybe_trigger = trigger_rx.recv() => {
                let Some(trigger) = maybe_trigger else { break };
                let pass = Arc::clone(&pass);
                tokio::task::spawn_blocking(move || (*pass)(trigger))
                    .await
                    .map_err(|err| DaemonError::Join {
                        task: "reconcile pass",
                        message: err.to_string(),
                    })?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (bus, _rx) = TriggerBus::new();
        assert_eq!(bus.fire(Trigger::Startup), Delivery::Queued);
        assert_eq!(bus.fire(Trigger::Hangup), Delivery::Dropped);
        assert_eq!(bus.fire(Trigger::Hangup), Delivery::Dropped);
    }

    #[tokio::test]
    async fn queue_accepts_again_once_drained() {
        let (bus, mut rx) = TriggerBus::new();
        assert_eq!(bus.fire(Trigger::Startup), Delivery::Queued);
        assert_eq!(rx.recv().await, Some(Trigger::Startup));
        assert_eq!(bus.fire(Trigger::Hangup), Delivery::Queued);
        assert_eq!(rx.recv().await, Some(Trigger::Hangup));
    }

    #[test]
    fn fire_after_worker_gone_reports_closed() {
        let (bus, rx) = TriggerBus::new();
        drop(rx);
        assert_eq!(bus.fire(Trigger::Hangup), Delivery::Closed);
    }

    #[test]
    fn trigger_display_names() {
        assert_eq!(Trigger::Startup.to_string(), "startup");
        assert_eq!(Trigger::Hangup.to_string(), "sighup");
    }
}
