//! # petkit
//!
//! Command sequencing and bring-up for Petkit BLE appliances.
//!
//! ## Features
//!
//! - One method per device command, with per-connection sequence numbering
//! - Identity and secret derivation for the authentication commands
//! - Multi-stage bring-up handshake with reconnect-and-restart recovery
//! - Dirty-field tracking so callers know what to re-read after a write
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use petkit::{Device, HandshakeConfig};
//! use petkit_transport::{MemoryLink, QueuedTransport};
//!
//! #[tokio::main]
//! async fn main() -> petkit::Result<()> {
//!     let (link, _events) = MemoryLink::connected();
//!     let transport = Arc::new(QueuedTransport::new(link));
//!
//!     // Replies from the device are written into `device.record()`
//!     let device = Device::new("A4:C1:38:00:00:01", transport)
//!         .with_config(HandshakeConfig::new().with_max_restarts(5));
//!
//!     device.connect().await?;
//!     device.reset_filter().await?;
//!
//!     device.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod handshake;
pub mod refresh;

#[cfg(test)]
mod testing;

// Re-exports
pub use config::HandshakeConfig;
pub use device::Device;
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use handshake::{Handshake, HandshakeReport};
pub use refresh::{PollingRefresher, StateRefresher};

// Re-export types
pub use petkit_core::{BringUpPhase, Command, DeviceIdentity, FrameType, Session};
pub use petkit_types::{DeviceRecord, DirtyField, DirtyFields, Serial};
