//! Transport layer for the Petkit BLE protocol
//!
//! The session hands encoded frames to a [`Transport`], which must deliver
//! them to the device in the order they were queued. [`QueuedTransport`]
//! provides that ordering on top of any [`Link`] (the radio itself).

pub mod error;
pub mod memory;
pub mod queue;

pub use error::{Error, Result};
pub use memory::{LinkEvent, MemoryLink};
pub use queue::QueuedTransport;

use async_trait::async_trait;
use bytes::Bytes;

/// Outbound path used by the command dispatcher
#[async_trait]
pub trait Transport: Send + Sync {
    /// Queue a frame for sending (non-blocking, fire-and-forget)
    fn send(&self, frame: Bytes) -> Result<()>;

    /// Connect to device
    async fn connect(&self, address: &str) -> Result<()>;

    /// Disconnect from device
    async fn disconnect(&self, address: &str) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;
}

/// Raw link to the device (BLE characteristic writes)
#[async_trait]
pub trait Link: Send {
    /// Connect to device
    async fn connect(&mut self, address: &str) -> Result<()>;

    /// Disconnect from device
    async fn disconnect(&mut self, address: &str) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Write one frame
    async fn write(&mut self, frame: &[u8]) -> Result<()>;
}
