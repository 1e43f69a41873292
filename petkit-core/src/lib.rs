//! # petkit-core
//!
//! Core protocol implementation for Petkit BLE appliances.
//!
//! This crate provides the low-level protocol primitives:
//! - Command table and frame types
//! - Sequence counter and per-connection session
//! - Identity derivation for the authentication commands
//! - Frame encoder contract and the default envelope codec
//! - Protocol constants

pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod identity;
pub mod sequence;
pub mod session;
pub mod timestamp;

pub use command::{Command, FrameType};
pub use error::{Error, Result};
pub use frame::{CommandFrame, FrameEncoder, PetkitFrameCodec};
pub use identity::DeviceIdentity;
pub use sequence::SequenceCounter;
pub use session::{BringUpPhase, Dispatched, Session};

/// Protocol version information
pub const PROTOCOL_VERSION: &str = "1.0";
