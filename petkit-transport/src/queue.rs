//! Ordered outbound queue
//!
//! All frames for one connection go through a single channel drained by a
//! single writer task, so they reach the link in exactly the order they were
//! queued. Connect and disconnect take the same link lock as the writer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::{Link, Transport, error::*};

type SharedLink = Arc<Mutex<LinkState>>;

/// Link plus frames waiting for it to come back
struct LinkState {
    link: Box<dyn Link>,
    held: VecDeque<Bytes>,
}

impl LinkState {
    /// Write held frames in queue order, stopping at the first failure
    async fn flush(&mut self) {
        if !self.held.is_empty() {
            debug!("Flushing {} held frames", self.held.len());
        }

        while self.link.is_connected() {
            let Some(frame) = self.held.pop_front() else {
                break;
            };
            if let Err(e) = self.link.write(&frame).await {
                warn!("Write failed: {}", e);
            }
        }
    }
}

/// Single-writer transport over a [`Link`]
///
/// Frames queued while the link is down are held, in order, and written as
/// soon as [`connect`](Transport::connect) succeeds, so the device never sees
/// a gap in the sequence numbers already assigned to them.
///
/// Must be created inside a Tokio runtime.
pub struct QueuedTransport {
    queue: mpsc::UnboundedSender<Bytes>,
    link: SharedLink,
    connected: Arc<AtomicBool>,
    writer: JoinHandle<()>,
}

impl QueuedTransport {
    /// Wrap `link` and start the writer task
    pub fn new(link: impl Link + 'static) -> Self {
        let connected = Arc::new(AtomicBool::new(link.is_connected()));
        let link: SharedLink = Arc::new(Mutex::new(LinkState {
            link: Box::new(link),
            held: VecDeque::new(),
        }));
        let (queue, rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(Self::drain(rx, link.clone()));

        Self {
            queue,
            link,
            connected,
            writer,
        }
    }

    async fn drain(mut rx: mpsc::UnboundedReceiver<Bytes>, link: SharedLink) {
        while let Some(frame) = rx.recv().await {
            let mut state = link.lock().await;
            state.held.push_back(frame);

            if !state.link.is_connected() {
                trace!("Link not connected, holding {} frames", state.held.len());
                continue;
            }

            state.flush().await;
        }

        debug!("Outbound queue closed, writer stopping");
    }

    /// Frames waiting for the link to reconnect
    pub async fn held(&self) -> usize {
        self.link.lock().await.held.len()
    }
}

#[async_trait]
impl Transport for QueuedTransport {
    fn send(&self, frame: Bytes) -> Result<()> {
        trace!("Queueing {} bytes: {:02X?}", frame.len(), &frame[..frame.len().min(16)]);
        self.queue.send(frame).map_err(|_| Error::QueueClosed)
    }

    async fn connect(&self, address: &str) -> Result<()> {
        let mut state = self.link.lock().await;
        let result = state.link.connect(address).await;
        self.connected.store(state.link.is_connected(), Ordering::Release);
        state.flush().await;
        result
    }

    async fn disconnect(&self, address: &str) -> Result<()> {
        let mut state = self.link.lock().await;
        let result = state.link.disconnect(address).await;
        self.connected.store(state.link.is_connected(), Ordering::Release);
        result
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Drop for QueuedTransport {
    fn drop(&mut self) {
        self.writer.abort();
    }
}
