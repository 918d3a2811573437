// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP connection to a single smart socket.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::command::{Command, Handshake, PROTOCOL_VERSION};
use crate::error::{ConnectError, IoError};
use crate::protocol::ConnectionConfig;
use crate::protocol::codec::{ClientCodec, FrameHeader, HEADER_LEN};
use crate::response::{HandshakeReply, Response};
use crate::types::Endpoint;

/// An established, handshaken connection to a device.
///
/// The connection carries one request at a time: [`Connection::send`] writes
/// a frame and waits for its reply before returning. Any failure closes the
/// connection; it is never reused after a timeout or a corrupt reply.
///
/// If a `send` future is dropped mid-exchange the reply may still arrive
/// later, so the next `send` closes the connection and returns
/// `IoError::Abandoned` instead of reading that stale frame.
#[derive(Debug)]
pub struct Connection {
    stream: Option<TcpStream>,
    peer: SocketAddr,
    request_timeout: Duration,
    /// Set while an exchange is on the wire.
    in_flight: bool,
}

impl Connection {
    /// Dials `endpoint` and performs the protocol handshake.
    ///
    /// Returns the connection together with the device's handshake reply.
    ///
    /// # Errors
    ///
    /// - `ConnectError::InvalidEndpoint` if the host does not resolve
    /// - `ConnectError::Timeout` if no TCP connection is made within the connect timeout
    /// - `ConnectError::Refused` / `ConnectError::Unreachable` for dial failures
    /// - `ConnectError::HandshakeFailed` if the device does not answer the
    ///   handshake correctly; the socket is closed before returning
    pub async fn dial(
        endpoint: &Endpoint,
        config: &ConnectionConfig,
    ) -> Result<(Self, HandshakeReply), ConnectError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((endpoint.host(), endpoint.port()))
            .await
            .map_err(|e| ConnectError::InvalidEndpoint(format!("{endpoint}: {e}")))?
            .collect();

        if addrs.is_empty() {
            return Err(ConnectError::InvalidEndpoint(format!(
                "{endpoint} did not resolve to any address"
            )));
        }

        tracing::debug!(endpoint = %endpoint, candidates = addrs.len(), "Dialing device");

        let stream = tokio::time::timeout(config.connect_timeout(), connect_any(&addrs))
            .await
            .map_err(|_| ConnectError::Timeout)??;

        if let Err(err) = stream.set_nodelay(true) {
            tracing::debug!(error = %err, "Could not disable Nagle's algorithm");
        }

        let peer = stream
            .peer_addr()
            .map_err(|e| ConnectError::Unreachable(e.to_string()))?;

        let mut connection = Self {
            stream: Some(stream),
            peer,
            request_timeout: config.request_timeout(),
            in_flight: false,
        };

        match connection.handshake().await {
            Ok(reply) => {
                tracing::info!(peer = %peer, device = ?reply.device, "Handshake completed");
                Ok((connection, reply))
            }
            Err(err) => {
                tracing::warn!(peer = %peer, error = %err, "Handshake failed");
                connection.close().await;
                Err(err)
            }
        }
    }

    /// Sends a command and waits for its reply.
    ///
    /// # Errors
    ///
    /// - `IoError::Closed` if the connection is closed or the peer hangs up
    /// - `IoError::Timeout` if no reply arrives within the request timeout
    /// - `IoError::Corrupt` if the reply cannot be decoded or answers
    ///   another command
    /// - `IoError::Abandoned` if a previous `send` was dropped before its
    ///   reply arrived
    ///
    /// The connection is closed on every error.
    pub async fn send(&mut self, command: &Command) -> Result<Response, IoError> {
        let timeout = self.request_timeout;

        let result = if self.in_flight {
            Err(IoError::Abandoned)
        } else {
            self.in_flight = true;
            let result = match tokio::time::timeout(timeout, self.exchange(command)).await {
                Ok(result) => result,
                Err(_) => Err(IoError::Timeout(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                )),
            };
            self.in_flight = false;
            result
        };

        if let Err(err) = &result {
            tracing::warn!(
                peer = %self.peer,
                command = %command,
                error = %err,
                "Request failed, closing connection"
            );
            self.close().await;
        }

        result
    }

    /// Closes the connection. Calling it again does nothing.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.shutdown().await {
                tracing::debug!(peer = %self.peer, error = %err, "Shutdown failed");
            }
            tracing::debug!(peer = %self.peer, "Connection closed");
        }
    }

    /// Returns `true` until the connection is closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns `true` if a `send` was dropped before its reply arrived.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.in_flight
    }

    /// Returns the address of the device.
    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    async fn handshake(&mut self) -> Result<HandshakeReply, ConnectError> {
        let handshake = Handshake::new();

        let reply = self
            .send(&Command::Handshake(handshake))
            .await
            .map_err(|e| ConnectError::HandshakeFailed(e.to_string()))?
            .into_handshake()
            .ok_or_else(|| ConnectError::HandshakeFailed("unexpected reply".to_string()))?;

        if reply.version != PROTOCOL_VERSION {
            return Err(ConnectError::HandshakeFailed(format!(
                "device speaks protocol version {}, expected {PROTOCOL_VERSION}",
                reply.version
            )));
        }
        if !handshake.verify(&reply.challenge) {
            return Err(ConnectError::HandshakeFailed(
                "challenge answer does not match".to_string(),
            ));
        }

        Ok(reply)
    }

    async fn exchange(&mut self, command: &Command) -> Result<Response, IoError> {
        let stream = self.stream.as_mut().ok_or(IoError::Closed)?;

        let frame = ClientCodec.encode(command);
        tracing::debug!(peer = %self.peer, command = %command, bytes = frame.len(), "Sending command");

        stream.write_all(&frame).await.map_err(transport_error)?;
        let reply = read_frame(stream).await?;
        let response = ClientCodec.decode(reply)?;

        if !response.answers(command) {
            return Err(IoError::Corrupt(format!(
                "expected reply to {command}, got reply to {}",
                response.opcode()
            )));
        }

        tracing::debug!(peer = %self.peer, command = %command, "Received reply");
        Ok(response)
    }
}

/// Tries each resolved address in turn and returns the first stream.
async fn connect_any(addrs: &[SocketAddr]) -> Result<TcpStream, ConnectError> {
    let mut last_error = ConnectError::Unreachable("no address to try".to_string());

    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                tracing::debug!(addr = %addr, error = %err, "Dial attempt failed");
                last_error = connect_error(&err);
            }
        }
    }

    Err(last_error)
}

fn connect_error(err: &io::Error) -> ConnectError {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => ConnectError::Refused,
        io::ErrorKind::TimedOut => ConnectError::Timeout,
        _ => ConnectError::Unreachable(err.to_string()),
    }
}

/// Reads exactly one frame off the stream.
async fn read_frame(stream: &mut TcpStream) -> Result<Bytes, IoError> {
    let mut header = [0u8; HEADER_LEN];
    stream
        .read_exact(&mut header)
        .await
        .map_err(transport_error)?;

    let parsed = FrameHeader::parse(&header)?;

    let mut frame = BytesMut::with_capacity(HEADER_LEN + parsed.payload_len());
    frame.extend_from_slice(&header);
    frame.resize(HEADER_LEN + parsed.payload_len(), 0);
    stream
        .read_exact(&mut frame[HEADER_LEN..])
        .await
        .map_err(transport_error)?;

    Ok(frame.freeze())
}

fn transport_error(err: io::Error) -> IoError {
    tracing::debug!(error = %err, kind = ?err.kind(), "Transport failure");
    IoError::Closed
}
