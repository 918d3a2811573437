// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smart socket command definitions.
//!
//! The protocol knows exactly four requests. They form the closed
//! [`Command`] enum, so every layer that handles them is checked for
//! exhaustiveness at compile time.
//!
//! | Command | Opcode | Payload |
//! |---------|--------|---------|
//! | [`Command::Handshake`] | `0x01` | protocol version + 16-byte challenge |
//! | [`Command::SwitchOn`] | `0x02` | empty |
//! | [`Command::SwitchOff`] | `0x03` | empty |
//! | [`Command::StatusQuery`] | `0x04` | empty |
//!
//! Replies reuse the request opcode with the high bit set.
//!
//! # Examples
//!
//! ```
//! use smartsocket::command::{Command, Opcode};
//!
//! let cmd = Command::SwitchOn;
//! assert_eq!(cmd.opcode(), Opcode::SwitchOn);
//! assert_eq!(cmd.opcode().reply_byte(), 0x82);
//! ```

use std::fmt;

use uuid::Uuid;

/// Version of the wire protocol spoken by this client.
pub const PROTOCOL_VERSION: u8 = 1;

/// Length of the handshake challenge in bytes.
pub const CHALLENGE_LEN: usize = 16;

/// Mask a device XORs the challenge with to prove it speaks the protocol.
pub const HANDSHAKE_MASK: [u8; CHALLENGE_LEN] = *b"smartsocket-v1\x5a\xa5";

/// Discriminator byte of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Connection handshake.
    Handshake = 0x01,
    /// Close the relay.
    SwitchOn = 0x02,
    /// Open the relay.
    SwitchOff = 0x03,
    /// Read the current state.
    StatusQuery = 0x04,
}

impl Opcode {
    /// Bit set on the opcode of every reply frame.
    pub const REPLY_FLAG: u8 = 0x80;

    /// Returns the byte used in request frames.
    #[must_use]
    pub const fn request_byte(self) -> u8 {
        self as u8
    }

    /// Returns the byte used in reply frames.
    #[must_use]
    pub const fn reply_byte(self) -> u8 {
        self as u8 | Self::REPLY_FLAG
    }

    /// Looks up a request opcode.
    #[must_use]
    pub const fn from_request_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Handshake),
            0x02 => Some(Self::SwitchOn),
            0x03 => Some(Self::SwitchOff),
            0x04 => Some(Self::StatusQuery),
            _ => None,
        }
    }

    /// Looks up a reply opcode.
    #[must_use]
    pub const fn from_reply_byte(byte: u8) -> Option<Self> {
        if byte & Self::REPLY_FLAG == 0 {
            return None;
        }
        Self::from_request_byte(byte & !Self::REPLY_FLAG)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Handshake => "Handshake",
            Self::SwitchOn => "SwitchOn",
            Self::SwitchOff => "SwitchOff",
            Self::StatusQuery => "StatusQuery",
        };
        f.write_str(name)
    }
}

/// A request sent to a smart socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Opens the session and checks protocol compatibility.
    Handshake(Handshake),
    /// Switches the socket on.
    SwitchOn,
    /// Switches the socket off.
    SwitchOff,
    /// Asks for the current state without changing it.
    StatusQuery,
}

impl Command {
    /// Returns the opcode identifying this command on the wire.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Handshake(_) => Opcode::Handshake,
            Self::SwitchOn => Opcode::SwitchOn,
            Self::SwitchOff => Opcode::SwitchOff,
            Self::StatusQuery => Opcode::StatusQuery,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.opcode().fmt(f)
    }
}

/// Handshake request.
///
/// The client sends a random challenge; a compatible device answers with the
/// challenge XOR-ed with [`HANDSHAKE_MASK`].
///
/// # Examples
///
/// ```
/// use smartsocket::command::{Handshake, HANDSHAKE_MASK};
///
/// let hs = Handshake::with_challenge([0u8; 16]);
/// assert_eq!(hs.expected_answer(), HANDSHAKE_MASK);
/// assert!(hs.verify(&HANDSHAKE_MASK));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handshake {
    version: u8,
    challenge: [u8; CHALLENGE_LEN],
}

impl Handshake {
    /// Creates a handshake for [`PROTOCOL_VERSION`] with a random challenge.
    ///
    /// The challenge is the byte form of a v4 UUID. Its version and variant
    /// bits are fixed, so 122 of the 128 bits are random.
    #[must_use]
    pub fn new() -> Self {
        Self::with_challenge(Uuid::new_v4().into_bytes())
    }

    /// Creates a handshake with a fixed challenge.
    #[must_use]
    pub const fn with_challenge(challenge: [u8; CHALLENGE_LEN]) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            challenge,
        }
    }

    /// Creates a handshake as received from the wire.
    #[must_use]
    pub const fn from_parts(version: u8, challenge: [u8; CHALLENGE_LEN]) -> Self {
        Self { version, challenge }
    }

    /// Returns the protocol version announced by the sender.
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Returns the challenge bytes.
    #[must_use]
    pub const fn challenge(&self) -> &[u8; CHALLENGE_LEN] {
        &self.challenge
    }

    /// Returns the answer a compatible device must send back.
    #[must_use]
    pub fn expected_answer(&self) -> [u8; CHALLENGE_LEN] {
        let mut answer = self.challenge;
        for (byte, mask) in answer.iter_mut().zip(HANDSHAKE_MASK) {
            *byte ^= mask;
        }
        answer
    }

    /// Checks a device's answer against the challenge.
    #[must_use]
    pub fn verify(&self, answer: &[u8; CHALLENGE_LEN]) -> bool {
        self.expected_answer() == *answer
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}
