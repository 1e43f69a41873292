//! Bring-up handshake
//!
//! Drives the device from a fresh connection to steady state:
//!
//! ```text
//! IdentityPending ─► Authenticating ─► TimeSyncing ─► ConfirmingIdentity
//!        ▲                                                   │
//!        │                                                   ▼
//!  (reconnect) ◄──── not initialized ──── VerifyingInitialization
//!                                                   │ initialized
//!                                                   ▼
//!                                          SteadyStatePolling
//! ```
//!
//! Every obstruction is handled by waiting and retrying. A device that never
//! reports itself initialized is reconnected and the whole sequence restarts,
//! forever unless [`HandshakeConfig::max_restarts`] is set.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use petkit_core::BringUpPhase;

use crate::config::HandshakeConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};

/// Outcome of a completed handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeReport {
    /// Reconnect cycles needed before the device reported itself initialized
    pub restarts: u32,
}

/// Bring-up state machine for one device session
pub struct Handshake {
    dispatcher: Dispatcher,
    config: HandshakeConfig,
}

impl Handshake {
    pub fn new(dispatcher: Dispatcher, config: HandshakeConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Run the handshake to steady state
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `cancel` fires during any wait
    /// - [`Error::RestartsExhausted`] if a restart bound is configured and reached
    /// - Dispatch errors (closed outbound queue, identity of invalid length)
    pub async fn run(&self, cancel: &CancellationToken) -> Result<HandshakeReport> {
        let record = self.dispatcher.record();
        let mut restarts = 0u32;

        info!(address = %self.dispatcher.address(), "Starting device handshake");

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            self.enter(BringUpPhase::IdentityPending);
            while !record.identity_known() {
                self.dispatcher.get_device_details()?;
                self.pause(self.config.identity_poll_interval, cancel).await?;
            }

            self.enter(BringUpPhase::Authenticating);
            self.dispatcher.init_device()?;

            self.enter(BringUpPhase::TimeSyncing);
            self.dispatcher.sync_secret()?;
            self.pause(self.config.step_interval, cancel).await?;
            self.dispatcher.set_datetime()?;
            self.pause(self.config.step_interval, cancel).await?;

            self.enter(BringUpPhase::ConfirmingIdentity);
            while !record.serial_known() {
                self.dispatcher.request_device_details()?;
                self.pause(self.config.identity_poll_interval, cancel).await?;
            }

            self.enter(BringUpPhase::VerifyingInitialization);
            if record.is_initialized() {
                break;
            }

            if let Some(max) = self.config.max_restarts {
                if restarts >= max {
                    return Err(Error::RestartsExhausted { restarts });
                }
            }

            restarts += 1;
            warn!(
                address = %self.dispatcher.address(),
                restarts,
                "Device not initialized, reconnecting"
            );
            self.recover(cancel).await?;
        }

        self.enter(BringUpPhase::SteadyStatePolling);
        self.dispatcher.get_device_info()?;
        self.pause(self.config.step_interval, cancel).await?;
        self.dispatcher.get_device_type()?;
        self.pause(self.config.step_interval, cancel).await?;
        self.dispatcher.get_battery()?;
        self.pause(self.config.step_interval, cancel).await?;
        self.dispatcher.get_device_state()?;
        self.pause(self.config.step_interval, cancel).await?;
        self.dispatcher.get_device_config()?;

        info!(
            address = %self.dispatcher.address(),
            restarts,
            "Device handshake complete"
        );

        Ok(HandshakeReport { restarts })
    }

    /// Re-authenticate, then force a transport reconnect
    ///
    /// Transport failures are logged and absorbed; the next pass of the
    /// handshake retries from the top either way.
    async fn recover(&self, cancel: &CancellationToken) -> Result<()> {
        let address = self.dispatcher.address();
        let transport = self.dispatcher.transport();

        self.dispatcher.init_device()?;
        self.pause(self.config.reauth_settle, cancel).await?;

        if let Err(e) = transport.disconnect(address).await {
            warn!("Forced disconnect failed: {}", e);
        }
        self.dispatcher.session().set_phase(BringUpPhase::Disconnected);
        self.pause(self.config.reconnect_pause, cancel).await?;

        if let Err(e) = transport.connect(address).await {
            warn!("Reconnect failed: {}", e);
        }
        self.pause(self.config.reconnect_pause, cancel).await
    }

    fn enter(&self, phase: BringUpPhase) {
        let previous = self.dispatcher.session().set_phase(phase);
        if previous != phase {
            debug!(from = %previous, to = %phase, "Handshake phase");
        }
    }

    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = sleep(duration) => Ok(()),
        }
    }
}
