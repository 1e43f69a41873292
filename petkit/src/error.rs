//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] petkit_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] petkit_transport::Error),

    #[error("Device not initialized - complete the handshake first")]
    NotInitialized,

    #[error("Handshake cancelled")]
    Cancelled,

    #[error("Device still not initialized after {restarts} reconnect cycles")]
    RestartsExhausted { restarts: u32 },
}
