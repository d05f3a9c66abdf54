// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable responses of the command surface.

use serde::Serialize;

use crate::device::Device;
use crate::pending::{PendingAction, PendingId};
use crate::registration::Registration;
use crate::types::{Action, PrinterEvent};

/// Vocabulary for UIs: event and action names, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumsView {
    /// Printer event names.
    pub events: Vec<String>,
    /// Action names.
    pub actions: Vec<String>,
}

impl EnumsView {
    pub(crate) fn current() -> Self {
        Self {
            events: PrinterEvent::names(),
            actions: Action::names(),
        }
    }
}

/// One registration of a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationView {
    pub event_name: String,
    pub action_name: String,
    /// Delay in seconds.
    pub delay: f64,
    pub cancel_on_conflict: bool,
}

impl From<&Registration> for RegistrationView {
    fn from(registration: &Registration) -> Self {
        Self {
            event_name: registration.event().to_string(),
            action_name: registration.action().to_string(),
            delay: registration.delay().as_secs_f64(),
            cancel_on_conflict: registration.cancel_on_conflict(),
        }
    }
}

/// One pending action. Times are RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingActionView {
    pub pending_id: String,
    pub device_mac: String,
    pub event_name: String,
    pub action_name: String,
    pub scheduled_at: String,
    pub fires_at: String,
    /// Delay in seconds.
    pub delay: f64,
    pub cancelled: bool,
}

impl From<&PendingAction> for PendingActionView {
    fn from(pending: &PendingAction) -> Self {
        Self {
            pending_id: pending.id().to_string(),
            device_mac: pending.device().to_string(),
            event_name: pending.event().to_string(),
            action_name: pending.action().to_string(),
            scheduled_at: pending.scheduled_at().to_rfc3339(),
            fires_at: pending.fires_at().to_rfc3339(),
            delay: pending.delay().as_secs_f64(),
            cancelled: pending.is_cancelled(),
        }
    }
}

/// A device with its registrations and pending actions.
///
/// `turn_on_registrations` and `turn_off_registrations` are indexed like
/// [`EnumsView::events`]: entry `i` tells whether the device has a binding
/// for the `i`-th event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceView {
    pub device_mac: String,
    pub device_name: String,
    pub device_type: String,
    pub registrations: Vec<RegistrationView>,
    pub turn_on_registrations: Vec<bool>,
    pub turn_off_registrations: Vec<bool>,
    pub pending: Vec<PendingActionView>,
}

impl DeviceView {
    pub(crate) fn new(
        device: &Device,
        registrations: &[Registration],
        pending: &[PendingAction],
    ) -> Self {
        let flags = |action: Action| -> Vec<bool> {
            let mut flags = vec![false; PrinterEvent::ALL.len()];
            for registration in registrations.iter().filter(|r| r.action() == action) {
                flags[registration.event().index()] = true;
            }
            flags
        };

        Self {
            device_mac: device.mac().to_string(),
            device_name: device.name().to_string(),
            device_type: device.device_type().to_string(),
            registrations: registrations.iter().map(RegistrationView::from).collect(),
            turn_on_registrations: flags(Action::TurnOn),
            turn_off_registrations: flags(Action::TurnOff),
            pending: pending.iter().map(PendingActionView::from).collect(),
        }
    }
}

/// Response to an [`ApiCommand`](super::ApiCommand).
///
/// Serializes without a tag: each variant has a distinct shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    /// Answer to `get_enums`.
    Enums(EnumsView),
    /// Answer to `get_devices`.
    Devices { devices: Vec<DeviceView> },
    /// Answer to `get_pending_actions`.
    Pending { pending_actions: Vec<PendingActionView> },
    /// Answer to `on_event`: the pending actions created.
    Scheduled { pending_ids: Vec<PendingId> },
    /// Answer to `cancel_pending`: whether the action was still pending.
    Cancelled { cancelled: bool },
    /// Plain acknowledgement.
    Ok {},
}
