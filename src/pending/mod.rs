// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pending actions: delayed device actions waiting to fire.
//!
//! The [`PendingActionTracker`] is the only owner of pending actions. It
//! arms one timer per action and resolves each action exactly once: it
//! either fires through the gateway or is cancelled.

mod pending_action;
mod pending_id;
mod tracker;

pub use pending_action::PendingAction;
pub use pending_id::PendingId;
pub use tracker::{PendingActionTracker, PendingSnapshot};
