//! Protocol constants

use std::time::Duration;

/// Pause between device-details polls while waiting for identity
pub const IDENTITY_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Pause between ordinary handshake and post-handshake steps
pub const STEP_INTERVAL: Duration = Duration::from_millis(750);

/// Settle time after re-sending `INIT_DEVICE` before forcing a reconnect
pub const REAUTH_SETTLE: Duration = Duration::from_secs(3);

/// Pause after each half of the forced disconnect/reconnect
pub const RECONNECT_PAUSE: Duration = Duration::from_secs(1);

/// Settle time between a mutating command and the confirmation refresh
pub const REFRESH_SETTLE: Duration = Duration::from_secs(1);

/// Payload prefix used by polls and bring-up commands
pub const ZERO_PREFIX: [u8; 2] = [0, 0];

/// Light / DND switch values
pub mod switch {
    /// Off
    pub const OFF: u8 = 0;

    /// On
    pub const ON: u8 = 1;
}
