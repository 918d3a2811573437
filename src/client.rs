// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level smart socket client.
//!
//! [`SmartSocketClient`] ties the connection manager to the state snapshot:
//! every operation runs on the wire first and then applies exactly one
//! [`StateChange`] describing its outcome.

use std::fmt;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::command::Command;
use crate::error::{ConnectError, Error, IoError, StateError};
use crate::protocol::{ConnectionConfig, ConnectionManager};
use crate::response::{CommandReply, DeviceInfo};
use crate::state::{ClientState, ClientStatus, StateChange};
use crate::types::{DeviceState, Endpoint};

/// A client controlling one smart socket over TCP.
///
/// All operations take `&self`. Calls issued concurrently are queued and
/// reach the device in the order they were made; each one finishes its state
/// update before the next starts.
///
/// # Examples
///
/// ```no_run
/// use smartsocket::SmartSocketClient;
///
/// # async fn example() -> smartsocket::Result<()> {
/// let client = SmartSocketClient::new();
///
/// client.connect("127.0.0.1:55333").await?;
/// client.switch_on().await?;
/// println!("{client}"); // Client(state=Connected, device=On)
///
/// client.disconnect().await;
/// # Ok(())
/// # }
/// ```
///
/// # Cancellation
///
/// Dropping the future of a call that is waiting in the queue has no effect.
/// Dropping it once the call is on the wire moves the client to `Failed`
/// before the next queued call runs: an abandoned `connect` records
/// `ConnectError::Abandoned` and an abandoned command records
/// `IoError::Abandoned`. The late reply is never read; reconnect to continue.
#[derive(Debug)]
pub struct SmartSocketClient {
    config: ConnectionConfig,
    manager: Mutex<ConnectionManager>,
    status: RwLock<ClientStatus>,
}

impl SmartSocketClient {
    /// Creates a disconnected client with default timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ConnectionConfig::default())
    }

    /// Creates a disconnected client with custom timeouts.
    #[must_use]
    pub fn with_config(config: ConnectionConfig) -> Self {
        Self {
            config,
            manager: Mutex::new(ConnectionManager::new(config)),
            status: RwLock::new(ClientStatus::new()),
        }
    }

    /// Returns the timeouts used by this client.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    // ========== Lifecycle ==========

    /// Connects to the device at `address` (`"host:port"`).
    ///
    /// Any existing connection is closed first. On success the client is
    /// `Connected` and the device state is whatever the device reported in
    /// the handshake.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if `address` is malformed; nothing else happens
    /// - `Error::Connect` if dialing or the handshake fails; the client moves
    ///   to `Failed` and keeps the error in [`last_error`](Self::last_error)
    pub async fn connect(&self, address: &str) -> Result<(), Error> {
        let endpoint: Endpoint = address.parse()?;

        let mut manager = self.manager.lock().await;

        tracing::info!(endpoint = %endpoint, "Connecting to smart socket");
        self.apply(&StateChange::Connecting {
            endpoint: endpoint.clone(),
        });

        let guard = AbandonGuard::arm(&self.status, ConnectError::Abandoned.into());
        let dialed = manager.dial(&endpoint).await;
        guard.disarm();

        match dialed {
            Ok(reply) => {
                tracing::info!(endpoint = %endpoint, state = ?reply.state, "Connected");
                self.apply(&StateChange::Connected {
                    device: DeviceState::from(reply.state),
                    power: reply.power,
                    info: reply.device,
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(endpoint = %endpoint, error = %err, "Connection failed");
                let err = Error::from(err);
                self.apply(&StateChange::Failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Closes the connection and resets the client to its initial state.
    ///
    /// Safe to call when not connected; calling it twice is the same as once.
    pub async fn disconnect(&self) {
        let mut manager = self.manager.lock().await;
        manager.close().await;

        if self.apply(&StateChange::Reset) {
            tracing::info!("Disconnected");
        }
    }

    // ========== Power Control ==========

    /// Switches the socket on.
    ///
    /// # Errors
    ///
    /// - `Error::State` if the client is not connected
    /// - `Error::Io` if the transport fails; the client moves to `Failed`
    /// - `Error::Rejected` if the device refuses; nothing changes
    pub async fn switch_on(&self) -> Result<(), Error> {
        self.execute(&Command::SwitchOn, |_, _| DeviceState::On)
            .await
            .map(|_| ())
    }

    /// Switches the socket off.
    ///
    /// # Errors
    ///
    /// Same as [`switch_on`](Self::switch_on).
    pub async fn switch_off(&self) -> Result<(), Error> {
        self.execute(&Command::SwitchOff, |_, _| DeviceState::Off)
            .await
            .map(|_| ())
    }

    /// Asks the device for its relay state and load.
    ///
    /// A reply without a state keeps the last known one.
    ///
    /// # Errors
    ///
    /// Same as [`switch_on`](Self::switch_on).
    pub async fn status(&self) -> Result<DeviceState, Error> {
        self.execute(&Command::StatusQuery, |reply, current| {
            reply.state.map_or(current, DeviceState::from)
        })
        .await
    }

    // ========== State Accessors ==========

    /// Returns the connection lifecycle state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        self.status.read().state()
    }

    /// Returns the last known relay state.
    #[must_use]
    pub fn device_state(&self) -> DeviceState {
        self.status.read().device()
    }

    /// Returns `true` if the client is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Returns whether the relay is on, or `None` while it is unknown.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotConnected` if the client is not connected.
    pub fn is_switched_on(&self) -> Result<Option<bool>, Error> {
        let status = self.status.read();
        if !status.state().is_connected() {
            return Err(StateError::NotConnected.into());
        }
        Ok(status.device().is_on())
    }

    /// Returns the last reported load in watts.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotConnected` if the client is not connected.
    pub fn power(&self) -> Result<Option<f64>, Error> {
        let status = self.status.read();
        if !status.state().is_connected() {
            return Err(StateError::NotConnected.into());
        }
        Ok(status.power())
    }

    /// Returns the identity the device reported in the handshake.
    #[must_use]
    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.status.read().device_info().cloned()
    }

    /// Returns the endpoint of the current or last connection attempt.
    #[must_use]
    pub fn endpoint(&self) -> Option<Endpoint> {
        self.status.read().endpoint().cloned()
    }

    /// Returns the error that moved the client to `Failed`.
    #[must_use]
    pub fn last_error(&self) -> Option<Error> {
        self.status.read().last_error().cloned()
    }

    /// Returns a copy of the whole snapshot.
    #[must_use]
    pub fn status_snapshot(&self) -> ClientStatus {
        self.status.read().clone()
    }

    // ========== Internals ==========

    /// Sends a switch or status command and records the outcome.
    ///
    /// `resolve` maps the acknowledgment and the current relay state to the
    /// new relay state.
    async fn execute<F>(&self, command: &Command, resolve: F) -> Result<DeviceState, Error>
    where
        F: FnOnce(&CommandReply, DeviceState) -> DeviceState,
    {
        let mut manager = self.manager.lock().await;

        if !self.state().is_connected() {
            return Err(StateError::NotConnected.into());
        }

        let guard = AbandonGuard::arm(&self.status, IoError::Abandoned.into());
        let sent = manager.send(command).await;
        guard.disarm();

        let result = match sent {
            Ok(response) => response.command_reply().cloned().ok_or_else(|| {
                IoError::Corrupt(format!("reply to {command} carries no acknowledgment"))
            }),
            Err(err) => Err(err),
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                manager.close().await;
                let err = Error::from(err);
                self.apply(&StateChange::Failed(err.clone()));
                return Err(err);
            }
        };

        if !reply.ok {
            tracing::warn!(
                command = %command,
                reason = reply.rejection_reason(),
                "Device rejected command"
            );
            return Err(Error::Rejected(reply.rejection_reason().to_string()));
        }

        let device = resolve(&reply, self.device_state());
        self.apply(&StateChange::Device {
            state: device,
            power: reply.power,
        });
        tracing::debug!(command = %command, device = %device, "Command acknowledged");

        Ok(device)
    }

    fn apply(&self, change: &StateChange) -> bool {
        let changed = self.status.write().apply(change);
        if changed {
            tracing::trace!(change = ?change, "Client state updated");
        }
        changed
    }
}

/// Moves the client to `Failed` if dropped while still armed.
///
/// Must be created after the manager lock is taken so it drops first.
struct AbandonGuard<'a> {
    status: &'a RwLock<ClientStatus>,
    error: Option<Error>,
}

impl<'a> AbandonGuard<'a> {
    fn arm(status: &'a RwLock<ClientStatus>, error: Error) -> Self {
        Self {
            status,
            error: Some(error),
        }
    }

    fn disarm(mut self) {
        self.error = None;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if let Some(error) = self.error.take() {
            tracing::warn!(error = %error, "Operation dropped before it finished");
            self.status.write().apply(&StateChange::Failed(error));
        }
    }
}

impl Default for SmartSocketClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SmartSocketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status.read();
        write!(
            f,
            "Client(state={}, device={})",
            status.state(),
            status.device()
        )
    }
}
