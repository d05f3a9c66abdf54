// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Devices known to the system and the directory that discovers them.
//!
//! Discovery itself belongs to the host (a vendor cloud account, a local
//! scan, a static list). The core only needs identity, a display name and a
//! type hint, and reaches the host through the [`DeviceDirectory`] trait.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{UpstreamError, ValueError};
use crate::types::DeviceMac;

/// Kind of a supported smart device.
///
/// This is a capability hint for presentation only. Every supported type
/// understands `TurnOn` and `TurnOff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// A smart bulb.
    Light,
    /// A mesh-networked smart bulb.
    MeshLight,
    /// An indoor smart plug.
    Plug,
    /// An outdoor smart plug.
    OutdoorPlug,
    /// A camera (power can be toggled).
    Camera,
}

impl DeviceType {
    /// Returns the vendor type tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::MeshLight => "MeshLight",
            Self::Plug => "Plug",
            Self::OutdoorPlug => "OutdoorPlug",
            Self::Camera => "Camera",
        }
    }

    /// Parses a vendor type tag.
    ///
    /// Returns `None` for device types that cannot be switched.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Light" => Some(Self::Light),
            "MeshLight" => Some(Self::MeshLight),
            "Plug" => Some(Self::Plug),
            "OutdoorPlug" => Some(Self::OutdoorPlug),
            "Camera" => Some(Self::Camera),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A switchable device, as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    mac: DeviceMac,
    name: String,
    device_type: DeviceType,
}

impl Device {
    /// Creates a device.
    #[must_use]
    pub fn new(mac: DeviceMac, name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            mac,
            name: name.into(),
            device_type,
        }
    }

    /// Returns the hardware identifier.
    #[must_use]
    pub fn mac(&self) -> &DeviceMac {
        &self.mac
    }

    /// Returns the human readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device type.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }
}

/// Source of the devices the command surface can show and switch.
pub trait DeviceDirectory: Send + Sync {
    /// Returns every supported device currently known.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if discovery is unavailable.
    fn devices(&self) -> impl Future<Output = Result<Vec<Device>, UpstreamError>> + Send;
}

/// In-memory device directory.
///
/// Useful for hosts that configure devices by hand, and in tests.
///
/// # Examples
///
/// ```
/// use printplug_lib::device::{DeviceType, StaticDirectory};
///
/// let directory = StaticDirectory::from_tagged([
///     ("AA:BB", "Printer plug", "Plug"),
///     ("CC:DD", "Doorbell", "Doorbell"), // unsupported, skipped
/// ])
/// .unwrap();
///
/// assert_eq!(directory.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct StaticDirectory {
    devices: RwLock<BTreeMap<DeviceMac, Device>>,
}

impl StaticDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device (builder style).
    #[must_use]
    pub fn with_device(self, device: Device) -> Self {
        self.insert(device);
        self
    }

    /// Builds a directory from `(mac, name, type tag)` triples.
    ///
    /// Entries whose type tag is not a supported [`DeviceType`] are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMac` if any identifier is invalid.
    pub fn from_tagged<'a, I>(entries: I) -> Result<Self, ValueError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let directory = Self::new();
        for (mac, name, tag) in entries {
            let mac = DeviceMac::from_str(mac)?;
            let Some(device_type) = DeviceType::from_tag(tag) else {
                tracing::debug!(device_mac = %mac, tag = %tag, "Skipping unsupported device type");
                continue;
            };
            directory.insert(Device::new(mac, name, device_type));
        }
        Ok(directory)
    }

    /// Inserts or replaces a device.
    pub fn insert(&self, device: Device) {
        self.devices.write().insert(device.mac.clone(), device);
    }

    /// Removes a device, returning it if it was present.
    pub fn remove(&self, mac: &DeviceMac) -> Option<Device> {
        self.devices.write().remove(mac)
    }

    /// Returns the device with the given identifier.
    #[must_use]
    pub fn get(&self, mac: &DeviceMac) -> Option<Device> {
        self.devices.read().get(mac).cloned()
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Returns true if the directory holds no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

impl DeviceDirectory for StaticDirectory {
    async fn devices(&self) -> Result<Vec<Device>, UpstreamError> {
        Ok(self.devices.read().values().cloned().collect())
    }
}
