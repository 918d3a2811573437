// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ownership of the client's single device connection.

use crate::command::Command;
use crate::error::{ConnectError, IoError};
use crate::protocol::ConnectionConfig;
use crate::protocol::connection::Connection;
use crate::response::{HandshakeReply, Response};
use crate::types::Endpoint;

/// Holds at most one [`Connection`] and drops it as soon as it fails.
///
/// The manager has no locking of its own; the owner serializes access.
#[derive(Debug)]
pub struct ConnectionManager {
    config: ConnectionConfig,
    connection: Option<Connection>,
}

impl ConnectionManager {
    /// Creates a manager with no open connection.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// Returns the timeouts used for new connections.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Returns `true` while a connection is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_open)
    }

    /// Opens a new connection to `endpoint`, closing any previous one first.
    ///
    /// # Errors
    ///
    /// Returns the [`ConnectError`] from [`Connection::dial`]. The manager
    /// holds no connection afterwards.
    pub async fn dial(&mut self, endpoint: &Endpoint) -> Result<HandshakeReply, ConnectError> {
        if self.connection.is_some() {
            tracing::debug!(endpoint = %endpoint, "Replacing existing connection");
            self.close().await;
        }

        let (connection, reply) = Connection::dial(endpoint, &self.config).await?;
        self.connection = Some(connection);
        Ok(reply)
    }

    /// Sends a command over the open connection.
    ///
    /// # Errors
    ///
    /// Returns `IoError::Closed` when no connection is open, otherwise the
    /// error from [`Connection::send`]. A failed connection is discarded.
    pub async fn send(&mut self, command: &Command) -> Result<Response, IoError> {
        let Some(connection) = self.connection.as_mut() else {
            return Err(IoError::Closed);
        };

        let result = connection.send(command).await;
        if result.is_err() {
            self.connection = None;
        }
        result
    }

    /// Closes the connection if one is open.
    pub async fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close().await;
        }
    }
}
