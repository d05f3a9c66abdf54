// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trigger dispatcher: turns printer events into pending actions.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::gateway::ActuatorGateway;
use crate::pending::{PendingActionTracker, PendingId};
use crate::registration::RegistrationSource;
use crate::types::{DeviceMac, PrinterEvent};

/// Which devices an incoming event applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceScope {
    /// Every registered device.
    #[default]
    All,
    /// A single device.
    Device(DeviceMac),
    /// An explicit set of devices, possibly empty.
    Devices(BTreeSet<DeviceMac>),
}

impl DeviceScope {
    /// Returns true if `device` is within the scope.
    #[must_use]
    pub fn contains(&self, device: &DeviceMac) -> bool {
        match self {
            Self::All => true,
            Self::Device(mac) => mac == device,
            Self::Devices(set) => set.contains(device),
        }
    }

    /// Narrows the scope to the given devices.
    ///
    /// Used to keep events away from registrations whose device is no
    /// longer discovered.
    #[must_use]
    pub fn restrict_to<I>(&self, devices: I) -> Self
    where
        I: IntoIterator<Item = DeviceMac>,
    {
        Self::Devices(
            devices
                .into_iter()
                .filter(|device| self.contains(device))
                .collect(),
        )
    }
}

impl From<Option<DeviceMac>> for DeviceScope {
    fn from(device: Option<DeviceMac>) -> Self {
        device.map_or(Self::All, Self::Device)
    }
}

/// Reacts to printer events by scheduling the registered actions.
///
/// For every registration matching the event, the dispatcher first cancels
/// pending actions that conflict with it, then schedules a new pending
/// action with the registration's delay and policy.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use printplug_lib::dispatch::{DeviceScope, TriggerDispatcher};
/// use printplug_lib::gateway::DryRunGateway;
/// use printplug_lib::pending::PendingActionTracker;
/// use printplug_lib::registration::{RegistrationKey, RegistrationStore};
/// use printplug_lib::types::{Action, Delay, DeviceMac, PrinterEvent};
///
/// #[tokio::main]
/// async fn main() -> printplug_lib::Result<()> {
///     let store = Arc::new(RegistrationStore::new());
///     store.register(
///         RegistrationKey::new(
///             DeviceMac::new("AA:BB")?,
///             PrinterEvent::PrintDone,
///             Action::TurnOff,
///         ),
///         Delay::from_secs(600),
///         false,
///     );
///
///     let tracker = PendingActionTracker::new(DryRunGateway);
///     let dispatcher = TriggerDispatcher::new(store, tracker.clone());
///
///     let ids = dispatcher.on_event(&DeviceScope::All, PrinterEvent::PrintDone)?;
///     assert_eq!(ids.len(), 1);
///     assert_eq!(tracker.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct TriggerDispatcher<S, G> {
    source: Arc<S>,
    tracker: PendingActionTracker<G>,
}

impl<S, G> TriggerDispatcher<S, G>
where
    S: RegistrationSource,
    G: ActuatorGateway,
{
    /// Creates a dispatcher reading `source` and scheduling on `tracker`.
    #[must_use]
    pub fn new(source: Arc<S>, tracker: PendingActionTracker<G>) -> Self {
        Self { source, tracker }
    }

    /// Returns the tracker pending actions are scheduled on.
    #[must_use]
    pub fn tracker(&self) -> &PendingActionTracker<G> {
        &self.tracker
    }

    /// Handles one printer event.
    ///
    /// Returns the ids of the pending actions created, in dispatch order.
    /// An event without matching registrations yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `Error::UpstreamUnavailable` if the registrations cannot be
    /// read; the event is dropped. If scheduling fails for every match, the
    /// first scheduling error is returned.
    pub fn on_event(
        &self,
        scope: &DeviceScope,
        event: PrinterEvent,
    ) -> Result<Vec<PendingId>, Error> {
        let matches = self.source.matching(event, scope).map_err(|e| {
            tracing::warn!(event = %event, error = %e, "Dropping event, registrations unavailable");
            e
        })?;

        if matches.is_empty() {
            tracing::trace!(event = %event, "No registrations for event");
            return Ok(Vec::new());
        }

        let mut scheduled = Vec::with_capacity(matches.len());
        let mut first_error = None;

        for registration in matches {
            let device = registration.device().clone();
            let action = registration.action();

            self.tracker.cancel_conflicting(&device, action, event);

            match self.tracker.schedule(
                device,
                event,
                action,
                registration.delay(),
                registration.cancel_on_conflict(),
            ) {
                Ok(id) => scheduled.push(id),
                Err(e) => {
                    tracing::warn!(
                        device_mac = %registration.device(),
                        event = %event,
                        action = %action,
                        error = %e,
                        "Failed to schedule action"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if scheduled.is_empty() => Err(e),
            _ => Ok(scheduled),
        }
    }

    /// Handles an event delivered by name from the host.
    ///
    /// Names that are not printer events are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`on_event`](Self::on_event).
    pub fn on_event_name(&self, scope: &DeviceScope, name: &str) -> Result<Vec<PendingId>, Error> {
        match PrinterEvent::from_name(name) {
            Some(event) => self.on_event(scope, event),
            None => {
                tracing::trace!(event_name = name, "Ignoring unrelated event");
                Ok(Vec::new())
            }
        }
    }
}

impl<S, G> Clone for TriggerDispatcher<S, G> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            tracker: self.tracker.clone(),
        }
    }
}
