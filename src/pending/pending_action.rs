// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot of an in-flight delayed action.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::types::{Action, Delay, DeviceMac, PrinterEvent};

use super::PendingId;

/// An action waiting for its delay to elapse.
///
/// Values of this type are complete snapshots: the tracker builds them in
/// full before publishing them, and hands out clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingAction {
    id: PendingId,
    device: DeviceMac,
    event: PrinterEvent,
    action: Action,
    scheduled_at: DateTime<Utc>,
    delay: Delay,
    cancel_on_conflict: bool,
    cancelled: bool,
}

impl PendingAction {
    pub(crate) fn new(
        id: PendingId,
        device: DeviceMac,
        event: PrinterEvent,
        action: Action,
        scheduled_at: DateTime<Utc>,
        delay: Delay,
        cancel_on_conflict: bool,
    ) -> Self {
        Self {
            id,
            device,
            event,
            action,
            scheduled_at,
            delay,
            cancel_on_conflict,
            cancelled: false,
        }
    }

    /// Returns the pending action's identifier.
    #[must_use]
    pub fn id(&self) -> PendingId {
        self.id
    }

    /// Returns the target device.
    #[must_use]
    pub fn device(&self) -> &DeviceMac {
        &self.device
    }

    /// Returns the event that triggered this action.
    #[must_use]
    pub fn event(&self) -> PrinterEvent {
        self.event
    }

    /// Returns the action to apply.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns when the action was scheduled.
    #[must_use]
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Returns the delay captured from the registration at trigger time.
    #[must_use]
    pub fn delay(&self) -> Delay {
        self.delay
    }

    /// Returns the conflict cancellation policy captured at trigger time.
    #[must_use]
    pub fn cancel_on_conflict(&self) -> bool {
        self.cancel_on_conflict
    }

    /// Returns true if the action was cancelled.
    ///
    /// Cancelled actions leave the tracker immediately, so snapshots taken
    /// from it always report `false`.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns the wall-clock time at which the action is due.
    #[must_use]
    pub fn fires_at(&self) -> DateTime<Utc> {
        TimeDelta::from_std(self.delay.as_duration())
            .ok()
            .and_then(|delta| self.scheduled_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub(crate) fn into_cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }
}
