//! Error types for petkit-core



/// Result type alias for petkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Raw device id has a length the identity derivation cannot use
    #[error("Invalid device id length: expected 1..={max} bytes, got {actual} bytes")]
    InvalidIdentityLength {
        max: usize,
        actual: usize,
    },

    /// Device id has not been reported yet
    #[error("Device identity not known - request device details first")]
    IdentityUnknown,

    /// Command id does not fit the frame envelope
    #[error("Command id {0} does not fit in a single byte")]
    CommandIdOutOfRange(u16),

    /// Payload too large
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Frame is too short to be valid
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// Start or end marker missing
    #[error("Invalid frame marker: {0}")]
    InvalidMarker(String),

    /// Length byte disagrees with the frame size
    #[error("Frame length mismatch: header says {declared} bytes, frame carries {actual} bytes")]
    LengthMismatch {
        declared: usize,
        actual: usize,
    },

    /// Unknown command code
    #[error("Unknown command code: {0}")]
    UnknownCommand(u16),

    /// Unknown frame type
    #[error("Unknown frame type: {0}")]
    UnknownFrameType(u8),
}

impl Error {
    /// Check if error is recoverable (retry might succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::IdentityUnknown)
    }

    /// Check if error indicates a corrupted inbound frame
    pub fn is_malformed_frame(&self) -> bool {
        matches!(
            self,
            Self::FrameTooShort { .. } | Self::InvalidMarker(_) | Self::LengthMismatch { .. }
        )
    }
}
