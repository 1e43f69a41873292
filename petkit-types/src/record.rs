//! Shared per-device record
//!
//! Owns the bring-up state and the dirty-field set. Reply handlers write
//! bring-up facts, the command dispatcher marks fields dirty, and the state
//! refresh path clears them once an authoritative read completes.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::bring_up::{BringUpState, Serial};
use crate::dirty::{DirtyField, DirtyFields};

/// Device record
///
/// Thread-safe and can be cloned cheaply (Arc internally).
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    inner: Arc<RecordInner>,
}

#[derive(Debug)]
struct RecordInner {
    address: String,
    bring_up: RwLock<BringUpState>,
    dirty: Mutex<DirtyFields>,
}

impl DeviceRecord {
    /// Create an empty record for the device at `address`
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                address: address.into(),
                bring_up: RwLock::new(BringUpState::new()),
                dirty: Mutex::new(DirtyFields::empty()),
            }),
        }
    }

    /// BLE address of the device
    pub fn address(&self) -> &str {
        &self.inner.address
    }

    /// Snapshot of the bring-up state
    pub fn bring_up(&self) -> BringUpState {
        self.inner.bring_up.read().clone()
    }

    /// Raw device id, if reported
    pub fn device_id(&self) -> Option<Bytes> {
        self.inner.bring_up.read().device_id.clone()
    }

    /// Check if the device id is known
    pub fn identity_known(&self) -> bool {
        self.inner.bring_up.read().identity_known()
    }

    /// Check if a real serial has been reported
    pub fn serial_known(&self) -> bool {
        self.inner.bring_up.read().serial.is_known()
    }

    /// Check if the device reports itself initialized
    pub fn is_initialized(&self) -> bool {
        self.inner.bring_up.read().device_initialized
    }

    /// Record the device id from a device-details reply
    pub fn set_device_id(&self, device_id: impl Into<Bytes>) {
        let device_id = device_id.into();
        debug!(address = %self.address(), id = ?device_id.as_ref(), "Device id recorded");
        self.inner.bring_up.write().device_id = Some(device_id);
    }

    /// Record the serial from a device-details reply
    pub fn set_serial(&self, serial: impl Into<Serial>) {
        let serial = serial.into();
        debug!(address = %self.address(), serial = %serial, "Serial recorded");
        self.inner.bring_up.write().serial = serial;
    }

    /// Record the device's initialized flag
    pub fn set_initialized(&self, initialized: bool) {
        debug!(address = %self.address(), initialized, "Initialization state recorded");
        self.inner.bring_up.write().device_initialized = initialized;
    }

    /// Mark `field` stale
    pub fn mark_dirty(&self, field: DirtyField) {
        *self.inner.dirty.lock() |= DirtyFields::from(field);
        debug!(address = %self.address(), field = %field, "Marked for update");
    }

    /// Mark every cached field stale
    pub fn mark_all_dirty(&self) {
        self.mark_dirty(DirtyField::All);
    }

    /// Current dirty set
    pub fn dirty(&self) -> DirtyFields {
        *self.inner.dirty.lock()
    }

    /// Check if anything awaits a refresh
    pub fn needs_update(&self) -> bool {
        !self.dirty().is_empty()
    }

    /// Clear and return the dirty set after an authoritative read
    pub fn take_dirty(&self) -> DirtyFields {
        std::mem::take(&mut *self.inner.dirty.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_new() {
        let record = DeviceRecord::new("AA:BB:CC:DD:EE:FF");
        assert_eq!(record.address(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(record.bring_up(), BringUpState::default());
        assert!(!record.needs_update());
    }

    #[test]
    fn test_bring_up_updates() {
        let record = DeviceRecord::new("addr");
        record.set_device_id(vec![1, 2, 3]);
        record.set_serial("0");
        assert!(record.identity_known());
        assert!(!record.serial_known());

        record.set_serial("SN1".to_string());
        record.set_initialized(true);
        assert!(record.serial_known());
        assert!(record.is_initialized());
        assert_eq!(record.device_id().unwrap().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn test_dirty_mark_and_take() {
        let record = DeviceRecord::new("addr");
        record.mark_dirty(DirtyField::Led);
        record.mark_dirty(DirtyField::Led);
        record.mark_dirty(DirtyField::Mode);

        assert_eq!(record.dirty(), DirtyFields::LED | DirtyFields::MODE);

        let taken = record.take_dirty();
        assert_eq!(taken.fields(), vec![DirtyField::Led, DirtyField::Mode]);
        assert!(!record.needs_update());
    }

    #[test]
    fn test_record_clone_shares_state() {
        let record = DeviceRecord::new("addr");
        let other = record.clone();
        record.mark_all_dirty();
        assert!(other.dirty().has(DirtyField::All));
    }
}
