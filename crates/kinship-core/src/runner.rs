//! Host run loop.
//!
//! [`run_host`] drives a [`HostSession`] on a single task. It waits on three
//! things at once:
//!
//! - **Day tick**: begin the day, hand the session to the [`DayCallback`]
//!   (where rule engines mutate the store), then end the day, which
//!   checkpoints when due and broadcasts.
//! - **Inbound envelopes**: snapshot requests are answered immediately.
//! - **Shutdown**: stop after a final checkpoint.
//!
//! Every store mutation happens on this one task, so the store never sees
//! two writers.

use std::time::Duration;

use kinship_db::CheckpointOutcome;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::channel::Envelope;
use crate::session::HostSession;

/// Why the run loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// The configured number of days ran.
    MaxDaysReached,
    /// Shutdown was requested.
    Shutdown,
    /// Every sender of the host inbox is gone.
    ChannelClosed,
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Why the loop stopped.
    pub end_reason: RunEndReason,
    /// Days completed during this run.
    pub days_run: u32,
    /// Day the session ended on.
    pub final_day: u32,
    /// Outcome of the checkpoint taken on the way out.
    pub final_checkpoint: CheckpointOutcome,
}

/// Run loop bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Real time per in-game day.
    pub day_interval: Duration,
    /// Stop after this many days. Zero runs until shutdown.
    pub max_days: u32,
}

impl RunOptions {
    /// Options from the session configuration.
    pub const fn from_config(session: &crate::config::SessionConfig) -> Self {
        Self {
            day_interval: Duration::from_millis(session.tick_interval_ms),
            max_days: session.max_days,
        }
    }
}

/// Callback invoked once per day, between day start and day end.
///
/// Rule engines plug in here: they read and mutate the session's store and
/// live sessions. Changes are picked up by the day-end checkpoint and
/// broadcast.
pub trait DayCallback: Send {
    /// Called once per day.
    fn on_day(&mut self, session: &mut HostSession, day: u32);
}

/// A no-op day callback.
pub struct NoOpCallback;

impl DayCallback for NoOpCallback {
    fn on_day(&mut self, _session: &mut HostSession, _day: u32) {}
}

/// Drive `session` until a stop condition is met.
pub async fn run_host(
    session: &mut HostSession,
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    shutdown: &mut watch::Receiver<bool>,
    callback: &mut dyn DayCallback,
    options: RunOptions,
) -> RunResult {
    let period = options.day_interval.max(Duration::from_millis(1));
    let first = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut ticker = tokio::time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut days_run: u32 = 0;

    info!(
        day = session.day(),
        day_interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        max_days = options.max_days,
        "Host loop starting"
    );

    let end_reason = loop {
        if *shutdown.borrow() {
            break RunEndReason::Shutdown;
        }

        tokio::select! {
            _ = ticker.tick() => {
                let day = session.day().saturating_add(1);
                session.begin_day(day);
                callback.on_day(session, day);
                let outcome = session.end_day();
                if let CheckpointOutcome::Failed(error) = outcome {
                    warn!(day, error = %error, "Day-end checkpoint failed");
                }
                days_run = days_run.saturating_add(1);
                if options.max_days > 0 && days_run >= options.max_days {
                    info!(day, max_days = options.max_days, "Day limit reached");
                    break RunEndReason::MaxDaysReached;
                }
            }
            received = inbox.recv() => {
                let Some(envelope) = received else {
                    break RunEndReason::ChannelClosed;
                };
                // Dropped messages are already logged by the sync endpoint.
                let _ = session.handle_envelope(&envelope);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break RunEndReason::Shutdown;
                }
            }
        }
    };

    let final_checkpoint = session.checkpoint();
    let result = RunResult {
        end_reason,
        days_run,
        final_day: session.day(),
        final_checkpoint,
    };
    log_run_end(&result);
    result
}

/// Log how the run ended.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        days_run = result.days_run,
        final_day = result.final_day,
        final_checkpoint = ?result.final_checkpoint,
        "Host loop ended"
    );
    if let CheckpointOutcome::Failed(ref error) = result.final_checkpoint {
        warn!(error = %error, "Unsaved changes remain after shutdown");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use kinship_db::{MemorySlot, SaveGateway};
    use kinship_store::transitions;
    use kinship_types::{PlayerId, Role};

    use crate::channel::{LocalHub, Outbox, Recipient};
    use crate::protocol::SyncMessage;
    use crate::session::SessionBuilder;

    const HOST: PlayerId = PlayerId(1);

    fn host(hub: &LocalHub, slot: &MemorySlot) -> Box<HostSession> {
        SessionBuilder::new(Role::Host)
            .local_player(HOST)
            .outbox(hub.outbox(HOST))
            .gateway(SaveGateway::new(slot.clone()))
            .build()
            .unwrap()
            .into_host()
            .unwrap()
    }

    fn options(max_days: u32) -> RunOptions {
        RunOptions {
            day_interval: Duration::from_millis(2),
            max_days,
        }
    }

    #[tokio::test]
    async fn stops_after_max_days() {
        let slot = MemorySlot::new();
        let (hub, mut inbox) = LocalHub::new(HOST);
        let mut session = host(&hub, &slot);
        let (_tx, mut shutdown) = watch::channel(false);

        let result = run_host(
            &mut session,
            &mut inbox,
            &mut shutdown,
            &mut NoOpCallback,
            options(3),
        )
        .await;

        assert_eq!(result.end_reason, RunEndReason::MaxDaysReached);
        assert_eq!(result.days_run, 3);
        assert_eq!(result.final_day, 3);
        assert_eq!(session.store().view().last_processed_day, 3);
    }

    #[tokio::test]
    async fn day_callback_mutations_are_saved() {
        struct Flirt;
        impl DayCallback for Flirt {
            fn on_day(&mut self, session: &mut HostSession, _day: u32) {
                let _ = session.store_mut().update_relationship(
                    PlayerId(5),
                    PlayerId(6),
                    "hearts:talk",
                    |r| {
                        transitions::add_heart_points(r, 20);
                        Ok::<_, ()>(())
                    },
                );
            }
        }

        let slot = MemorySlot::new();
        let (hub, mut inbox) = LocalHub::new(HOST);
        let mut session = host(&hub, &slot);
        let (_tx, mut shutdown) = watch::channel(false);

        let result = run_host(&mut session, &mut inbox, &mut shutdown, &mut Flirt, options(2)).await;

        assert_eq!(result.final_checkpoint, CheckpointOutcome::Clean);
        assert_eq!(slot.write_count(), 2);
        let saved = SaveGateway::new(slot).load().unwrap();
        let points = saved.relationships.values().map(|r| r.heart_points).sum::<i32>();
        assert_eq!(points, 40);
    }

    #[tokio::test]
    async fn answers_requests_and_honours_shutdown() {
        let slot = MemorySlot::new();
        let (hub, mut inbox) = LocalHub::new(HOST);
        let mut session = host(&hub, &slot);
        let (tx, mut shutdown) = watch::channel(false);

        let peer = PlayerId(9);
        let mut peer_rx = hub.join(peer);
        hub.outbox(peer)
            .send(Recipient::Host, SyncMessage::SnapshotRequest.encode().unwrap())
            .unwrap();

        let stopper = tokio::spawn(async move {
            let reply = peer_rx.recv().await;
            let _ = tx.send(true);
            reply
        });

        let options = RunOptions {
            day_interval: Duration::from_secs(3600),
            max_days: 0,
        };
        let result = run_host(&mut session, &mut inbox, &mut shutdown, &mut NoOpCallback, options).await;

        assert_eq!(result.end_reason, RunEndReason::Shutdown);
        assert_eq!(result.days_run, 0);
        let reply = stopper.await.unwrap();
        assert!(matches!(
            reply.map(|e| SyncMessage::decode(&e.payload)),
            Some(Ok(SyncMessage::SnapshotBroadcast { .. }))
        ));
    }
}
