// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client state management types.
//!
//! [`ClientState`] is the connection lifecycle. [`ClientStatus`] is the full
//! snapshot the client exposes, updated only by applying a [`StateChange`].
//!
//! # Examples
//!
//! ```
//! use smartsocket::state::{ClientStatus, StateChange};
//! use smartsocket::types::DeviceState;
//!
//! let mut status = ClientStatus::new();
//! status.apply(&StateChange::device(DeviceState::On));
//! assert_eq!(status.device(), DeviceState::On);
//! ```

mod client_state;
mod client_status;
mod state_change;

pub use client_state::ClientState;
pub use client_status::ClientStatus;
pub use state_change::StateChange;
