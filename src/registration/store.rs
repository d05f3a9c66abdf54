// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory registration store.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::dispatch::DeviceScope;
use crate::error::{Error, NotFoundError, UpstreamError};
use crate::types::{Action, Delay, DeviceMac, PrinterEvent};

use super::key::{Registration, RegistrationConfig, RegistrationKey};

/// Bindings of one device, keyed so iteration yields event then action order.
type DeviceBindings = BTreeMap<(PrinterEvent, Action), RegistrationConfig>;

/// Read access to registrations, as needed by the trigger dispatcher.
///
/// [`RegistrationStore`] implements this infallibly. Other implementations
/// (for instance a store backed by a remote service) may fail, in which
/// case the dispatcher drops the event.
pub trait RegistrationSource: Send + Sync {
    /// Returns every registration for `event` whose device is in `scope`,
    /// ordered by device, then action.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the registrations cannot be read.
    fn matching(
        &self,
        event: PrinterEvent,
        scope: &DeviceScope,
    ) -> Result<Vec<Registration>, UpstreamError>;
}

/// Thread-safe store of (device, event, action) bindings.
///
/// The store is the only owner of registrations. All mutation goes through
/// its methods, each of which holds the write lock for a single map
/// operation. Listings copy under the read lock and return owned snapshots.
///
/// # Examples
///
/// ```
/// use printplug_lib::registration::{RegistrationKey, RegistrationStore};
/// use printplug_lib::types::{Action, Delay, DeviceMac, PrinterEvent};
///
/// let store = RegistrationStore::new();
/// let key = RegistrationKey::new(
///     DeviceMac::new("AA:BB").unwrap(),
///     PrinterEvent::PrintFailed,
///     Action::TurnOff,
/// );
///
/// store.register(key.clone(), Delay::from_secs(30), false);
/// assert_eq!(store.len(), 1);
///
/// store.unregister(&key);
/// store.unregister(&key); // absent: still fine
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RegistrationStore {
    /// Bindings grouped by device.
    devices: RwLock<BTreeMap<DeviceMac, DeviceBindings>>,
}

impl RegistrationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the registration for `key`.
    ///
    /// Returns the previous policy if the key was already registered.
    pub fn register(
        &self,
        key: RegistrationKey,
        delay: Delay,
        cancel_on_conflict: bool,
    ) -> Option<RegistrationConfig> {
        tracing::info!(
            device_mac = %key.device,
            event = %key.event,
            action = %key.action,
            delay = %delay,
            cancel_on_conflict,
            "Registering"
        );

        let config = RegistrationConfig {
            delay,
            cancel_on_conflict,
        };
        self.devices
            .write()
            .entry(key.device)
            .or_default()
            .insert((key.event, key.action), config)
    }

    /// Registers `key` without conflict cancellation.
    pub fn register_default(
        &self,
        key: RegistrationKey,
        delay: Delay,
    ) -> Option<RegistrationConfig> {
        self.register(key, delay, false)
    }

    /// Removes the registration for `key`.
    ///
    /// Returns `true` if a registration was removed. Removing an absent key
    /// is a no-op.
    pub fn unregister(&self, key: &RegistrationKey) -> bool {
        tracing::info!(
            device_mac = %key.device,
            event = %key.event,
            action = %key.action,
            "Unregistering"
        );

        let mut devices = self.devices.write();
        let Some(bindings) = devices.get_mut(&key.device) else {
            return false;
        };

        let removed = bindings.remove(&(key.event, key.action)).is_some();
        if bindings.is_empty() {
            devices.remove(&key.device);
        }
        removed
    }

    /// Updates the conflict cancellation flag of an existing registration.
    ///
    /// Actions already pending keep the flag they were created with.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if `key` is not registered.
    pub fn set_cancel_flag(&self, key: &RegistrationKey, cancel: bool) -> Result<(), Error> {
        let mut devices = self.devices.write();
        let config = devices
            .get_mut(&key.device)
            .and_then(|bindings| bindings.get_mut(&(key.event, key.action)))
            .ok_or_else(|| NotFoundError::Registration(key.clone()))?;

        config.cancel_on_conflict = cancel;
        drop(devices);

        tracing::debug!(
            device_mac = %key.device,
            event = %key.event,
            action = %key.action,
            cancel,
            "Updated conflict cancellation"
        );
        Ok(())
    }

    /// Returns the policy registered for `key`.
    #[must_use]
    pub fn get(&self, key: &RegistrationKey) -> Option<RegistrationConfig> {
        self.devices
            .read()
            .get(&key.device)
            .and_then(|bindings| bindings.get(&(key.event, key.action)))
            .copied()
    }

    /// Returns all registrations of a device, ordered by event then action.
    #[must_use]
    pub fn list_for(&self, device: &DeviceMac) -> Vec<Registration> {
        let devices = self.devices.read();
        let Some(bindings) = devices.get(device) else {
            return Vec::new();
        };

        bindings
            .iter()
            .map(|(&(event, action), &config)| Registration {
                key: RegistrationKey::new(device.clone(), event, action),
                config,
            })
            .collect()
    }

    /// Returns every registration for `event` within `scope`, ordered by
    /// device then action.
    #[must_use]
    pub fn matching(&self, event: PrinterEvent, scope: &DeviceScope) -> Vec<Registration> {
        let devices = self.devices.read();

        devices
            .iter()
            .filter(|(device, _)| scope.contains(device))
            .flat_map(|(device, bindings)| {
                Action::ALL.into_iter().filter_map(move |action| {
                    bindings.get(&(event, action)).map(|&config| Registration {
                        key: RegistrationKey::new(device.clone(), event, action),
                        config,
                    })
                })
            })
            .collect()
    }

    /// Returns the devices that have at least one registration.
    #[must_use]
    pub fn devices(&self) -> Vec<DeviceMac> {
        self.devices.read().keys().cloned().collect()
    }

    /// Returns the total number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().values().map(BTreeMap::len).sum()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

impl RegistrationSource for RegistrationStore {
    fn matching(
        &self,
        event: PrinterEvent,
        scope: &DeviceScope,
    ) -> Result<Vec<Registration>, UpstreamError> {
        Ok(RegistrationStore::matching(self, event, scope))
    }
}
