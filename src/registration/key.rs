// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registration identity and policy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Action, Delay, DeviceMac, PrinterEvent};

/// Identity of a binding: which device, on which event, does what.
///
/// At most one registration exists per key. Keys order by device, then
/// event, then action.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistrationKey {
    /// Target device.
    pub device: DeviceMac,
    /// Triggering printer event.
    pub event: PrinterEvent,
    /// Action applied to the device.
    pub action: Action,
}

impl RegistrationKey {
    /// Creates a registration key.
    #[must_use]
    pub fn new(device: DeviceMac, event: PrinterEvent, action: Action) -> Self {
        Self {
            device,
            event,
            action,
        }
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.device, self.event, self.action)
    }
}

/// Delay and cancellation policy of a binding.
///
/// Pending actions copy this policy when they are created. Changing a
/// registration later does not affect actions already pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// How long to wait after the trigger before acting.
    pub delay: Delay,
    /// Whether a pending action from this binding is cancelled when a
    /// competing event schedules the opposite action on the same device.
    pub cancel_on_conflict: bool,
}

impl RegistrationConfig {
    /// Creates a policy with the given delay and no conflict cancellation.
    #[must_use]
    pub fn new(delay: Delay) -> Self {
        Self {
            delay,
            cancel_on_conflict: false,
        }
    }

    /// Sets conflict cancellation.
    #[must_use]
    pub fn with_cancel_on_conflict(mut self, cancel: bool) -> Self {
        self.cancel_on_conflict = cancel;
        self
    }
}

/// A registration snapshot: key plus policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Identity of the binding.
    pub key: RegistrationKey,
    /// Policy of the binding.
    pub config: RegistrationConfig,
}

impl Registration {
    /// Returns the target device.
    #[must_use]
    pub fn device(&self) -> &DeviceMac {
        &self.key.device
    }

    /// Returns the triggering event.
    #[must_use]
    pub fn event(&self) -> PrinterEvent {
        self.key.event
    }

    /// Returns the action.
    #[must_use]
    pub fn action(&self) -> Action {
        self.key.action
    }

    /// Returns the delay.
    #[must_use]
    pub fn delay(&self) -> Delay {
        self.config.delay
    }

    /// Returns the conflict cancellation flag.
    #[must_use]
    pub fn cancel_on_conflict(&self) -> bool {
        self.config.cancel_on_conflict
    }
}
