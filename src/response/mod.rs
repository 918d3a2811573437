// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Replies sent by a smart socket.
//!
//! Every request is answered by exactly one reply frame whose opcode mirrors
//! the request. The reply payload is a JSON object described by
//! [`HandshakeReply`] or [`CommandReply`].

mod command;
mod handshake;

pub use command::CommandReply;
pub use handshake::{DeviceInfo, HandshakeReply};

use crate::command::{Command, Opcode};

/// A decoded reply frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Answer to [`Command::Handshake`].
    Handshake(HandshakeReply),
    /// Answer to [`Command::SwitchOn`].
    SwitchOn(CommandReply),
    /// Answer to [`Command::SwitchOff`].
    SwitchOff(CommandReply),
    /// Answer to [`Command::StatusQuery`].
    Status(CommandReply),
}

impl Response {
    /// Returns the opcode of the request this reply answers.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Handshake(_) => Opcode::Handshake,
            Self::SwitchOn(_) => Opcode::SwitchOn,
            Self::SwitchOff(_) => Opcode::SwitchOff,
            Self::Status(_) => Opcode::StatusQuery,
        }
    }

    /// Returns `true` if this reply answers `command`.
    #[must_use]
    pub fn answers(&self, command: &Command) -> bool {
        self.opcode() == command.opcode()
    }

    /// Returns the acknowledgment of a switch or status command.
    #[must_use]
    pub fn command_reply(&self) -> Option<&CommandReply> {
        match self {
            Self::Handshake(_) => None,
            Self::SwitchOn(reply) | Self::SwitchOff(reply) | Self::Status(reply) => Some(reply),
        }
    }

    /// Consumes the reply, returning the handshake payload if it is one.
    #[must_use]
    pub fn into_handshake(self) -> Option<HandshakeReply> {
        match self {
            Self::Handshake(reply) => Some(reply),
            _ => None,
        }
    }
}
