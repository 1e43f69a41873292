//! Handshake timing configuration

use std::time::Duration;

use petkit_core::constants;

/// Timing and retry settings for bring-up
///
/// Defaults match what the appliance firmware tolerates; the waits are fixed
/// intervals, not a backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeConfig {
    /// Wait after each device-details poll
    pub identity_poll_interval: Duration,

    /// Wait between ordinary steps
    pub step_interval: Duration,

    /// Wait after re-sending `INIT_DEVICE` before forcing a reconnect
    pub reauth_settle: Duration,

    /// Wait after the forced disconnect and after the reconnect
    pub reconnect_pause: Duration,

    /// Wait between a mutating command and the confirmation refresh
    pub refresh_settle: Duration,

    /// Reconnect cycles allowed before giving up (`None` = retry forever)
    pub max_restarts: Option<u32>,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            identity_poll_interval: constants::IDENTITY_POLL_INTERVAL,
            step_interval: constants::STEP_INTERVAL,
            reauth_settle: constants::REAUTH_SETTLE,
            reconnect_pause: constants::RECONNECT_PAUSE,
            refresh_settle: constants::REFRESH_SETTLE,
            max_restarts: None,
        }
    }
}

impl HandshakeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set identity poll interval
    pub fn with_identity_poll_interval(mut self, interval: Duration) -> Self {
        self.identity_poll_interval = interval;
        self
    }

    /// Set step interval
    pub fn with_step_interval(mut self, interval: Duration) -> Self {
        self.step_interval = interval;
        self
    }

    /// Set re-authentication settle time
    pub fn with_reauth_settle(mut self, settle: Duration) -> Self {
        self.reauth_settle = settle;
        self
    }

    /// Set reconnect pause
    pub fn with_reconnect_pause(mut self, pause: Duration) -> Self {
        self.reconnect_pause = pause;
        self
    }

    /// Set refresh settle time
    pub fn with_refresh_settle(mut self, settle: Duration) -> Self {
        self.refresh_settle = settle;
        self
    }

    /// Bound the number of reconnect cycles
    pub fn with_max_restarts(mut self, restarts: u32) -> Self {
        self.max_restarts = Some(restarts);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = HandshakeConfig::default();
        assert_eq!(config.identity_poll_interval, Duration::from_millis(1500));
        assert_eq!(config.step_interval, Duration::from_millis(750));
        assert_eq!(config.reauth_settle, Duration::from_secs(3));
        assert_eq!(config.reconnect_pause, Duration::from_secs(1));
        assert_eq!(config.refresh_settle, Duration::from_secs(1));
        assert_eq!(config.max_restarts, None);
    }

    #[test]
    fn test_builder() {
        let config = HandshakeConfig::new()
            .with_step_interval(Duration::from_millis(10))
            .with_max_restarts(3);
        assert_eq!(config.step_interval, Duration::from_millis(10));
        assert_eq!(config.max_restarts, Some(3));
    }
}
