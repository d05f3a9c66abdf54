// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tracker notification types.

use crate::pending::{PendingAction, PendingId};
use crate::types::DeviceMac;

/// Why a pending action was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// An explicit `cancel` request.
    Requested,
    /// A competing event scheduled the opposite action on the same device.
    Conflict,
    /// The tracker was shut down.
    Shutdown,
}

/// Notifications emitted by the pending action tracker.
///
/// Every pending action produces exactly one `Scheduled` notification and
/// then exactly one terminal notification (`Fired`, `FireFailed` or
/// `Cancelled`).
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// A pending action was created and its timer armed.
    Scheduled {
        /// The new pending action.
        pending: PendingAction,
    },

    /// The delay elapsed and the gateway performed the action.
    Fired {
        /// The action that fired.
        pending: PendingAction,
    },

    /// The delay elapsed but the gateway failed. The action is dropped.
    FireFailed {
        /// The action that failed.
        pending: PendingAction,
        /// The gateway's error message.
        error: String,
    },

    /// The action was removed before its delay elapsed.
    Cancelled {
        /// The cancelled action (with its cancelled flag set).
        pending: PendingAction,
        /// Why it was cancelled.
        reason: CancelReason,
    },
}

impl TrackerEvent {
    /// Returns the pending action this notification is about.
    #[must_use]
    pub fn pending(&self) -> &PendingAction {
        match self {
            Self::Scheduled { pending }
            | Self::Fired { pending }
            | Self::FireFailed { pending, .. }
            | Self::Cancelled { pending, .. } => pending,
        }
    }

    /// Returns the identifier of the pending action.
    #[must_use]
    pub fn pending_id(&self) -> PendingId {
        self.pending().id()
    }

    /// Returns the target device.
    #[must_use]
    pub fn device(&self) -> &DeviceMac {
        self.pending().device()
    }

    /// Returns `true` if this notification ends the pending action's life.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Scheduled { .. })
    }

    /// Creates a scheduled notification.
    #[must_use]
    pub fn scheduled(pending: PendingAction) -> Self {
        Self::Scheduled { pending }
    }

    /// Creates a fired notification.
    #[must_use]
    pub fn fired(pending: PendingAction) -> Self {
        Self::Fired { pending }
    }

    /// Creates a failed notification.
    #[must_use]
    pub fn fire_failed(pending: PendingAction, error: impl Into<String>) -> Self {
        Self::FireFailed {
            pending,
            error: error.into(),
        }
    }

    /// Creates a cancelled notification, marking the action cancelled.
    #[must_use]
    pub fn cancelled(pending: PendingAction, reason: CancelReason) -> Self {
        Self::Cancelled {
            pending: pending.into_cancelled(),
            reason,
        }
    }
}
