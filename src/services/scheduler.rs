use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::database::Database;
use crate::services::deadline::run_deadline_sweep;
use crate::utils::time::Clock;

/// Runs the deadline sweep every `every`, starting one interval from now.
/// A failed sweep is logged and the next tick retries from scratch.
pub fn spawn_periodic_sweep(
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> JoinHandle<()> {
    log::info!("🕒 Periodic deadline sweep every {}s", every.as_secs());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; startup already swept.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = run_deadline_sweep(db.as_ref(), clock.as_ref()).await {
                log::error!("Periodic deadline sweep failed: {}", e);
            }
        }
    })
}
