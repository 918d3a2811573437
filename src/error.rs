// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `smartsocket` library.
//!
//! Errors are layered the same way the client is: address validation,
//! connection establishment, post-connection transport failures, frame
//! decoding, and misuse of the client state machine. All of them are
//! cheap to clone so the client can both return an error and retain it
//! for later inspection.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The supplied configuration or address is invalid. No I/O was attempted.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dialing the device or completing the handshake failed.
    #[error("connect error: {0}")]
    Connect(#[from] ConnectError),

    /// The transport failed after the connection was established.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The client is not in a state that allows the operation.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// The device answered but refused to execute the command.
    #[error("command rejected by device: {0}")]
    Rejected(String),
}

/// Errors raised while validating user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The address is not of the form `<host>:<port>`.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors raised while dialing a device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The TCP connection was not established in time.
    #[error("connection timed out")]
    Timeout,

    /// The device actively refused the connection.
    #[error("connection refused")]
    Refused,

    /// The device could not be reached.
    #[error("device unreachable: {0}")]
    Unreachable(String),

    /// The endpoint could not be resolved to a socket address.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The device did not complete the protocol handshake.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// The caller dropped the connect call before it finished.
    #[error("connection attempt abandoned")]
    Abandoned,
}

/// Errors raised by an established connection.
///
/// Any of these leaves the connection closed; it has to be dialed again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IoError {
    /// The connection is closed or was closed by the peer.
    #[error("connection closed")]
    Closed,

    /// No reply arrived within the request timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The peer sent a frame that could not be understood.
    #[error("corrupt reply: {0}")]
    Corrupt(String),

    /// The caller dropped a request before its reply arrived.
    ///
    /// The late reply may still be in the socket, so the connection is not
    /// reused.
    #[error("request abandoned before its reply arrived")]
    Abandoned,
}

/// Errors raised when an operation is not allowed in the current state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// A command was issued while the client is not connected.
    #[error("client is not connected")]
    NotConnected,
}

/// Errors raised while decoding a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ends before the frame does.
    #[error("truncated frame: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes the frame requires.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// The buffer holds bytes past the end of the frame.
    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),

    /// The opcode is not part of the protocol, or not valid in this direction.
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),

    /// The declared payload length exceeds the protocol limit.
    #[error("payload of {0} bytes exceeds limit")]
    PayloadTooLarge(u32),

    /// The payload does not match what the opcode requires.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<DecodeError> for IoError {
    fn from(err: DecodeError) -> Self {
        Self::Corrupt(err.to_string())
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
