//! Expiration sweeper background task.
//!
//! Removes channels nobody joined within the grace period. The reactor only
//! runs on voice events, so a channel that is created and never joined
//! would otherwise live forever.

use crate::state::{DeleteReason, Switchboard};
use crate::telemetry::spans;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, info};

/// Spawn the sweeper. It runs every `ticker_delay` until shutdown.
pub fn spawn_sweeper(
    sb: Arc<Switchboard>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sb.config.ticker_delay);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    sweep_once(&sb, Utc::now()).instrument(spans::sweep()).await;
                }
                _ = shutdown_rx.recv() => {
                    info!("Sweeper stopped");
                    break;
                }
            }
        }
    })
}

/// Delete every channel that expired by `now`. Returns how many went.
///
/// Channels whose platform deletion fails are restored and retried on the
/// next tick.
pub async fn sweep_once(sb: &Switchboard, now: DateTime<Utc>) -> usize {
    if sb.registry.is_empty() {
        return 0;
    }
    let expired = sb
        .registry
        .drain_expired(now, sb.config.unjoined_delete_delay);

    let mut deleted = 0;
    for record in expired {
        if sb.finish_deletion(record, DeleteReason::Expired).await.is_ok() {
            deleted += 1;
        }
    }
    if deleted > 0 {
        info!(count = deleted, remaining = sb.registry.len(), "Expired channels swept");
    }
    deleted
}
