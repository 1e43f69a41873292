//! High-level device interface

use std::sync::Arc;

use bytes::Bytes;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use petkit_core::BringUpPhase;
use petkit_transport::Transport;
use petkit_types::DeviceRecord;

use crate::config::HandshakeConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::handshake::{Handshake, HandshakeReport};
use crate::refresh::StateRefresher;

/// Petkit BLE appliance
///
/// Owns one connection session: its sequence counter, derived identity, and
/// bring-up phase. Commands are queued on the transport and never wait for
/// the device to answer; replies are expected to land in the shared
/// [`DeviceRecord`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use petkit::Device;
/// use petkit_transport::{MemoryLink, QueuedTransport};
///
/// #[tokio::main]
/// async fn main() -> petkit::Result<()> {
///     let (link, _events) = MemoryLink::new();
///     let transport = Arc::new(QueuedTransport::new(link));
///
///     let device = Device::new("A4:C1:38:00:00:01", transport);
///     let report = device.connect().await?;
///     println!("Ready after {} restarts", report.restarts);
///
///     device.set_light(1).await?;
///     device.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Device {
    dispatcher: Dispatcher,
    config: HandshakeConfig,
    refresher: Option<Arc<dyn StateRefresher>>,
    shutdown: CancellationToken,
}

impl Device {
    /// Create a device for `address` on the given transport
    pub fn new(address: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let record = DeviceRecord::new(address);
        Self {
            dispatcher: Dispatcher::new(transport, record),
            config: HandshakeConfig::default(),
            refresher: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Set handshake timings
    pub fn with_config(mut self, config: HandshakeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the collaborator that re-reads state after mutating commands
    pub fn with_refresher(mut self, refresher: Arc<dyn StateRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn record(&self) -> &DeviceRecord {
        self.dispatcher.record()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Check if the handshake reached steady state
    pub fn is_ready(&self) -> bool {
        self.dispatcher.session().is_ready() && self.dispatcher.transport().is_connected()
    }

    /// Connect and run the bring-up handshake
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The initial connect fails
    /// - [`shutdown`](Self::shutdown) is called while the handshake waits
    /// - A configured restart bound is exhausted
    pub async fn connect(&self) -> Result<HandshakeReport> {
        let address = self.dispatcher.address();
        let transport = self.dispatcher.transport();

        if !transport.is_connected() {
            info!("Connecting to {}...", address);
            transport.connect(address).await?;
        }

        let handshake = Handshake::new(self.dispatcher.clone(), self.config.clone());
        handshake.run(&self.shutdown.child_token()).await
    }

    /// Disconnect from device
    pub async fn disconnect(&self) -> Result<()> {
        let address = self.dispatcher.address();
        self.dispatcher.transport().disconnect(address).await?;
        self.dispatcher.session().set_phase(BringUpPhase::Disconnected);
        info!("Disconnected from {}", address);
        Ok(())
    }

    /// Abort any running handshake
    ///
    /// Pending waits return [`Error::Cancelled`](crate::Error::Cancelled);
    /// later calls to [`connect`](Self::connect) are cancelled immediately.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait for the device to settle, then refresh cached state
    ///
    /// No-op without a refresher.
    pub async fn refresh_after_command(&self) {
        let Some(refresher) = &self.refresher else {
            debug!("No refresher configured, skipping refresh");
            return;
        };

        sleep(self.config.refresh_settle).await;
        refresher.force_refresh().await;
        info!("Device state updated after command");
    }

    /// Switch the light and confirm
    pub async fn set_light(&self, state: u8) -> Result<()> {
        self.dispatcher.set_light(state)?;
        self.refresh_after_command().await;
        Ok(())
    }

    /// Switch do-not-disturb and confirm
    pub async fn set_dnd(&self, state: u8) -> Result<()> {
        self.dispatcher.set_dnd(state)?;
        self.refresh_after_command().await;
        Ok(())
    }

    /// Set operating mode and confirm
    pub async fn set_mode(&self, state: u8, mode: u8) -> Result<()> {
        self.dispatcher.set_mode(state, mode)?;
        self.refresh_after_command().await;
        Ok(())
    }

    /// Write a raw configuration blob and confirm
    pub async fn set_device_config(&self, config: impl Into<Bytes>) -> Result<()> {
        self.dispatcher.set_device_config(config)?;
        self.refresh_after_command().await;
        Ok(())
    }

    /// Reset the filter counter and confirm
    pub async fn reset_filter(&self) -> Result<()> {
        self.dispatcher.reset_filter()?;
        self.refresh_after_command().await;
        Ok(())
    }

    /// Switch the light through the alternate command and confirm
    pub async fn update_light(&self, state: u8) -> Result<()> {
        self.dispatcher.update_light(state)?;
        self.refresh_after_command().await;
        Ok(())
    }

    /// Switch do-not-disturb through the alternate command and confirm
    pub async fn update_dnd(&self, state: u8) -> Result<()> {
        self.dispatcher.update_dnd(state)?;
        self.refresh_after_command().await;
        Ok(())
    }
}
