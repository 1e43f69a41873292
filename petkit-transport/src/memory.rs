//! In-memory loopback link
//!
//! Records everything the transport does as a stream of [`LinkEvent`]s.
//! Useful for tests and for running the handshake without a radio.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::{Link, error::*};

/// Something that happened on a [`MemoryLink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected(String),
    Disconnected(String),
    Frame(Bytes),
}

/// Loopback link backed by an unbounded channel
#[derive(Debug)]
pub struct MemoryLink {
    events: mpsc::UnboundedSender<LinkEvent>,
    connected: bool,
}

impl MemoryLink {
    /// Create a disconnected link and the receiver for its events
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LinkEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                events,
                connected: false,
            },
            rx,
        )
    }

    /// Create a link that starts out connected
    pub fn connected() -> (Self, mpsc::UnboundedReceiver<LinkEvent>) {
        let (mut link, rx) = Self::new();
        link.connected = true;
        (link, rx)
    }

    fn emit(&self, event: LinkEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| Error::ConnectionFailed("event receiver dropped".into()))
    }
}

#[async_trait]
impl Link for MemoryLink {
    async fn connect(&mut self, address: &str) -> Result<()> {
        if self.connected {
            return Err(Error::AlreadyConnected);
        }

        debug!("Connected to {} (memory)", address);
        self.connected = true;
        self.emit(LinkEvent::Connected(address.to_string()))
    }

    async fn disconnect(&mut self, address: &str) -> Result<()> {
        if self.connected {
            debug!("Disconnected from {} (memory)", address);
        }
        self.connected = false;
        self.emit(LinkEvent::Disconnected(address.to_string()))
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn write(&mut self, frame: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        trace!("Writing {} bytes: {:02X?}", frame.len(), &frame[..frame.len().min(16)]);
        self.emit(LinkEvent::Frame(Bytes::copy_from_slice(frame)))
    }
}
