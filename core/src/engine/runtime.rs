//! Cooperative event loop.
//!
//! One task owns the engine and interleaves inbound events with the voice
//! accrual and persistence timers. Nothing runs in parallel with anything
//! else; the only interleaving happens at awaits inside a handler.

use super::ActivityEngine;
use crate::events::InboundEvent;
use crate::platform::GuildPlatform;
use crate::ranks::RankReport;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub voice_tick: Duration,
    pub persist_interval: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            voice_tick: Duration::from_secs(15),
            persist_interval: Duration::from_secs(30),
        }
    }
}

/// Drive `engine` until `events` closes.
///
/// Rank reports are sent on `reports` when given. On close the loop runs one
/// last accrual pass and snapshot, then hands the engine back.
pub async fn run<P: GuildPlatform>(
    mut engine: ActivityEngine<P>,
    mut events: mpsc::Receiver<InboundEvent>,
    reports: Option<mpsc::UnboundedSender<RankReport>>,
    settings: RuntimeSettings,
) -> ActivityEngine<P> {
    let mut voice_tick = interval_after(settings.voice_tick);
    let mut persist_tick = interval_after(settings.persist_interval);

    tracing::info!(
        voice_tick = ?settings.voice_tick,
        persist_interval = ?settings.persist_interval,
        "Activity engine running"
    );

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                let Some(report) = engine.handle(event, Utc::now()).await else {
                    continue;
                };
                if let Some(tx) = &reports {
                    if tx.send(report).is_err() {
                        tracing::debug!("Rank report receiver dropped");
                    }
                }
            }
            _ = voice_tick.tick() => {
                engine.voice_tick(Utc::now()).await;
            }
            _ = persist_tick.tick() => {
                engine.persist(Utc::now()).await;
            }
        }
    }

    tracing::info!("Event stream closed, flushing");
    engine.shutdown(Utc::now()).await;
    engine
}

/// Interval whose first tick is one period from now rather than immediate.
fn interval_after(period: Duration) -> time::Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
