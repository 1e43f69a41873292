//! Device-state refresh collaborator

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;

/// Re-reads cached device state after a mutating command
///
/// Implementations own the cached field values. The dirty set on the
/// [`DeviceRecord`](petkit_types::DeviceRecord) tells them what went stale;
/// they clear it once an authoritative read has completed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateRefresher: Send + Sync {
    /// Refresh every cached field, regardless of the dirty set
    async fn force_refresh(&self);
}

/// Refresher that re-polls device state and config
pub struct PollingRefresher {
    dispatcher: Dispatcher,
    interval: Duration,
}

impl PollingRefresher {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            interval: petkit_core::constants::STEP_INTERVAL,
        }
    }

    /// Set the pause between the state and config reads
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[async_trait]
impl StateRefresher for PollingRefresher {
    async fn force_refresh(&self) {
        debug!(
            dirty = ?self.dispatcher.record().dirty().fields(),
            "Refreshing device state"
        );

        if let Err(e) = self.dispatcher.get_device_state() {
            warn!("State refresh failed: {}", e);
            return;
        }
        sleep(self.interval).await;
        if let Err(e) = self.dispatcher.get_device_config() {
            warn!("Config refresh failed: {}", e);
        }
    }
}
