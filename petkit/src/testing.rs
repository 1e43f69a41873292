//! Test transports

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use petkit_core::{Command, CommandFrame, PetkitFrameCodec};
use petkit_transport::{Error, Result, Transport};
use petkit_types::DeviceRecord;

/// Records decoded outbound frames
#[derive(Default)]
pub struct RecordingTransport {
    frames: Mutex<Vec<CommandFrame>>,
    closed: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<CommandFrame> {
        self.frames.lock().unwrap().clone()
    }

    /// Make every later `send` fail
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn send(&self, frame: Bytes) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::QueueClosed);
        }
        let frame = PetkitFrameCodec.decode(frame).unwrap();
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }

    async fn connect(&self, _address: &str) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&self, _address: &str) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Observable step of a simulated session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Send(Command),
    Connect,
    Disconnect,
}

/// Device behaviour for [`SimulatedDevice`]
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Device id is reported in reply to this device-details request (1-based)
    pub identity_on_poll: usize,

    /// Device initializes in reply to this INIT_DEVICE (1-based, `None` = never)
    pub initialized_on_auth: Option<usize>,

    /// Let the connect call fail
    pub fail_connect: bool,
}

/// Transport that answers frames the way an appliance would
///
/// Replies are applied straight to the shared [`DeviceRecord`]:
/// - device id arrives on the scripted device-details poll
/// - serial arrives on the first device-details request after INIT_DEVICE
/// - initialized flag flips on the scripted INIT_DEVICE
pub struct SimulatedDevice {
    record: DeviceRecord,
    script: Script,
    ops: Mutex<Vec<Op>>,
    sequences: Mutex<Vec<u8>>,
    connected: AtomicBool,
}

impl SimulatedDevice {
    pub fn new(record: DeviceRecord, script: Script) -> Self {
        Self {
            record,
            script,
            ops: Mutex::new(Vec::new()),
            sequences: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
        }
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn sequences(&self) -> Vec<u8> {
        self.sequences.lock().unwrap().clone()
    }

    fn count(&self, command: Command) -> usize {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| **op == Op::Send(command))
            .count()
    }
}

#[async_trait]
impl Transport for SimulatedDevice {
    fn send(&self, frame: Bytes) -> Result<()> {
        let frame = PetkitFrameCodec.decode(frame).unwrap();
        let command = frame.command().unwrap();

        self.ops.lock().unwrap().push(Op::Send(command));
        self.sequences.lock().unwrap().push(frame.sequence);

        match command {
            Command::GetDeviceDetails => {
                if self.count(command) >= self.script.identity_on_poll {
                    self.record.set_device_id(vec![0x00, 0x00, 0xA1, 0xB2, 0xC3, 0xD4]);
                }
                if self.count(Command::InitDevice) > 0 {
                    self.record.set_serial("W5C-0042");
                }
            }
            Command::InitDevice => {
                if Some(self.count(command)) == self.script.initialized_on_auth {
                    self.record.set_initialized(true);
                }
            }
            _ => {}
        }

        Ok(())
    }

    async fn connect(&self, _address: &str) -> Result<()> {
        self.ops.lock().unwrap().push(Op::Connect);
        if self.script.fail_connect {
            return Err(Error::ConnectionFailed("simulated".into()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self, _address: &str) -> Result<()> {
        self.ops.lock().unwrap().push(Op::Disconnect);
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
