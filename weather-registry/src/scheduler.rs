//! Background refresh of every known location.

use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info};

use crate::service::WeatherService;

/// Default refresh period: once per day.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn the repeating refresh task.
///
/// The first pass is expected to have run already through
/// [`WeatherService::initialize`], so the first tick fires one `period` after
/// spawning. The task runs for the life of the runtime unless the returned
/// handle is aborted.
pub fn spawn_refresh_task(service: Arc<WeatherService>, period: Duration) -> JoinHandle<()> {
    info!(interval_secs = period.as_secs(), "Starting weather refresh task");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Consume the immediate tick; initialize() covered it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            debug!("Refresh tick");
            service.refresh_all().await;
        }
    })
}
