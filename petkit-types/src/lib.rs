//! Type definitions for petkit

pub mod bring_up;
pub mod dirty;
pub mod error;
pub mod record;

pub use bring_up::{BringUpState, Serial};
pub use dirty::{DirtyField, DirtyFields};
pub use error::{Error, Result};
pub use record::DeviceRecord;
