//! Command dispatcher
//!
//! One method per device command. Each call builds the payload, takes the
//! session's next sequence number, encodes the frame, queues it on the
//! transport, advances the sequence, and marks any cached fields the command
//! invalidates. Nothing here waits for the device to answer.

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, info};

use petkit_core::constants::ZERO_PREFIX;
use petkit_core::{
    Command, CommandFrame, DeviceIdentity, Dispatched, FrameEncoder, PetkitFrameCodec, Session,
    timestamp,
};
use petkit_transport::Transport;
use petkit_types::{DeviceRecord, DirtyField};

use crate::error::{Error, Result};

/// Cached field a command invalidates, if any
///
/// # Examples
///
/// ```
/// use petkit::{Command, DirtyField, dispatcher::dirty_field};
///
/// assert_eq!(dirty_field(Command::SetLight), Some(DirtyField::Led));
/// assert_eq!(dirty_field(Command::GetBattery), None);
/// ```
pub fn dirty_field(command: Command) -> Option<DirtyField> {
    match command {
        Command::SetLight | Command::UpdateLight => Some(DirtyField::Led),
        Command::SetDnd | Command::UpdateDnd => Some(DirtyField::Dnd),
        Command::SetMode => Some(DirtyField::Mode),
        Command::SetDeviceConfig => Some(DirtyField::All),
        Command::ResetFilter => Some(DirtyField::Filter),
        _ => None,
    }
}

/// Per-connection command dispatcher
///
/// Cheap to clone; clones share the session, record, and transport.
#[derive(Clone)]
pub struct Dispatcher {
    session: Session,
    record: DeviceRecord,
    transport: Arc<dyn Transport>,
    encoder: Arc<dyn FrameEncoder>,
}

impl Dispatcher {
    /// Create a dispatcher using the default frame codec
    pub fn new(transport: Arc<dyn Transport>, record: DeviceRecord) -> Self {
        Self {
            session: Session::new(),
            record,
            transport,
            encoder: Arc::new(PetkitFrameCodec),
        }
    }

    /// Use a different frame encoder
    pub fn with_encoder(mut self, encoder: impl FrameEncoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Start the sequence counter at `start`
    pub fn with_sequence(mut self, start: u8) -> Self {
        self.session = Session::with_sequence(start);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn record(&self) -> &DeviceRecord {
        &self.record
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// BLE address of the device
    pub fn address(&self) -> &str {
        self.record.address()
    }

    /// Identity derived from the reported device id
    ///
    /// Derived once and cached on the session.
    pub fn identity(&self) -> Result<DeviceIdentity> {
        if let Some(identity) = self.session.identity() {
            return Ok(identity);
        }

        let raw = self
            .record
            .device_id()
            .ok_or(petkit_core::Error::IdentityUnknown)?;
        let identity = DeviceIdentity::derive(&raw)?;

        debug!(
            "Device ID: {}, Secret: {}",
            hex::encode(identity.device_id()),
            hex::encode(identity.secret())
        );

        self.session.set_identity(identity.clone());
        Ok(identity)
    }

    /// GET_BATTERY (66)
    pub fn get_battery(&self) -> Result<()> {
        self.ensure_initialized()?;
        self.dispatch(Command::GetBattery, Bytes::from_static(&ZERO_PREFIX))
    }

    /// INIT_DEVICE (73): zero prefix, padded device id, derived secret
    pub fn init_device(&self) -> Result<()> {
        let identity = self.identity()?;

        let mut payload = BytesMut::with_capacity(18);
        payload.put_slice(&ZERO_PREFIX);
        payload.put_slice(identity.device_id());
        payload.put_slice(identity.secret());

        self.dispatch(Command::InitDevice, payload.freeze())
    }

    /// SET_DATETIME (84) with the current local time
    pub fn set_datetime(&self) -> Result<()> {
        self.dispatch(Command::SetDateTime, timestamp::now())
    }

    /// SYNC_SECRET (86): zero prefix, derived secret
    pub fn sync_secret(&self) -> Result<()> {
        let identity = self.identity()?;

        let mut payload = BytesMut::with_capacity(10);
        payload.put_slice(&ZERO_PREFIX);
        payload.put_slice(identity.secret());

        self.dispatch(Command::SyncSecret, payload.freeze())
    }

    /// GET_DEVICE_INFO (200)
    pub fn get_device_info(&self) -> Result<()> {
        self.dispatch(Command::GetDeviceInfo, Bytes::new())
    }

    /// GET_DEVICE_TYPE (201)
    pub fn get_device_type(&self) -> Result<()> {
        self.dispatch(Command::GetDeviceType, Bytes::new())
    }

    /// GET_DEVICE_STATE (210)
    pub fn get_device_state(&self) -> Result<()> {
        self.ensure_initialized()?;
        self.dispatch(Command::GetDeviceState, Bytes::from_static(&ZERO_PREFIX))
    }

    /// GET_DEVICE_CONFIG (211)
    pub fn get_device_config(&self) -> Result<()> {
        self.ensure_initialized()?;
        self.dispatch(Command::GetDeviceConfig, Bytes::from_static(&ZERO_PREFIX))
    }

    /// GET_DEVICE_DETAILS (213), skipped when the device id is already known
    ///
    /// Returns `true` if a frame was queued. A skipped call sends nothing and
    /// does not consume a sequence number.
    pub fn get_device_details(&self) -> Result<bool> {
        if self.record.identity_known() {
            return Ok(false);
        }

        self.request_device_details()?;
        Ok(true)
    }

    /// GET_DEVICE_DETAILS (213), always sent
    pub fn request_device_details(&self) -> Result<()> {
        self.dispatch(Command::GetDeviceDetails, Bytes::from_static(&ZERO_PREFIX))
    }

    /// SET_LIGHT (215)
    pub fn set_light(&self, state: u8) -> Result<()> {
        self.dispatch(Command::SetLight, Bytes::copy_from_slice(&[state]))
    }

    /// SET_DND (216)
    pub fn set_dnd(&self, state: u8) -> Result<()> {
        self.dispatch(Command::SetDnd, Bytes::copy_from_slice(&[state]))
    }

    /// SET_MODE (220)
    pub fn set_mode(&self, state: u8, mode: u8) -> Result<()> {
        self.dispatch(Command::SetMode, Bytes::copy_from_slice(&[state, mode]))
    }

    /// SET_DEVICE_CONFIG (221) with caller-supplied bytes
    pub fn set_device_config(&self, config: impl Into<Bytes>) -> Result<()> {
        self.dispatch(Command::SetDeviceConfig, config.into())
    }

    /// RESET_FILTER (222)
    pub fn reset_filter(&self) -> Result<()> {
        self.dispatch(Command::ResetFilter, Bytes::from_static(&[0]))
    }

    /// UPDATE_LIGHT (225)
    pub fn update_light(&self, state: u8) -> Result<()> {
        self.dispatch(Command::UpdateLight, Bytes::copy_from_slice(&[state]))
    }

    /// UPDATE_DND (226)
    pub fn update_dnd(&self, state: u8) -> Result<()> {
        self.dispatch(Command::UpdateDnd, Bytes::copy_from_slice(&[state]))
    }

    /// REQUEST_UPDATE (230), sent as an update-trigger frame
    pub fn request_update(&self) -> Result<()> {
        self.dispatch(Command::RequestUpdate, Bytes::from_static(&[1]))
    }

    // Helper methods

    fn ensure_initialized(&self) -> Result<()> {
        if !self.record.is_initialized() {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    fn dispatch(&self, command: Command, payload: Bytes) -> Result<()> {
        let encoder = self.encoder.as_ref();
        let transport = self.transport.as_ref();

        // A frame that reached the send step has consumed its sequence and
        // may have left the host, so its fields go stale either way.
        let (sequence, sent) = self.session.dispatch(|sequence| {
            let frame = CommandFrame::new(sequence, command, payload);
            match frame.encode_with(encoder) {
                Ok(bytes) => Dispatched::Sent(Ok((sequence, transport.send(bytes)))),
                Err(e) => Dispatched::NotSent(Error::from(e)),
            }
        })?;

        if let Some(field) = dirty_field(command) {
            self.record.mark_dirty(field);
        }

        sent?;
        info!(command = %command, sequence, "Queued command: {}", command.id());

        Ok(())
    }
}
