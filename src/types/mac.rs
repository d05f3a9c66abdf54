// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device hardware identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

/// Stable hardware identifier of a smart device (usually its MAC address).
///
/// Vendors format these differently (`2CAA8E123456`, `AA:BB:CC:DD:EE:FF`,
/// `7C78B2-0001`), so the identifier is kept verbatim. Only the character
/// set and length are checked.
///
/// # Examples
///
/// ```
/// use printplug_lib::types::DeviceMac;
///
/// let mac = DeviceMac::new("AA:BB").unwrap();
/// assert_eq!(mac.as_str(), "AA:BB");
///
/// assert!(DeviceMac::new("").is_err());
/// assert!(DeviceMac::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceMac(String);

impl DeviceMac {
    /// Maximum accepted identifier length.
    pub const MAX_LEN: usize = 64;

    /// Creates a device identifier.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMac` if the identifier is empty, longer
    /// than [`MAX_LEN`](Self::MAX_LEN), or contains characters other than
    /// ASCII alphanumerics and `:`, `-`, `_`, `.`.
    pub fn new(mac: impl Into<String>) -> Result<Self, ValueError> {
        let mac = mac.into();
        let trimmed = mac.trim();

        let valid = !trimmed.is_empty()
            && trimmed.len() <= Self::MAX_LEN
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '_' | '.'));

        if !valid {
            return Err(ValueError::InvalidMac(mac));
        }

        if trimmed.len() == mac.len() {
            Ok(Self(mac))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceMac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceMac {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DeviceMac {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for DeviceMac {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeviceMac {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_formats() {
        for mac in ["AA:BB", "2CAA8E123456", "7C78B2-0001", "aa_bb.cc"] {
            assert_eq!(DeviceMac::new(mac).unwrap().as_str(), mac);
        }
    }

    #[test]
    fn trims_whitespace() {
        let mac = DeviceMac::new("  AA:BB\n").unwrap();
        assert_eq!(mac.as_str(), "AA:BB");
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(
            DeviceMac::new(""),
            Err(ValueError::InvalidMac(String::new()))
        );
        assert!(DeviceMac::new("   ").is_err());
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(DeviceMac::new("AA BB").is_err());
        assert!(DeviceMac::new("AA/BB").is_err());
        assert!(DeviceMac::new("ÄA:BB").is_err());
    }

    #[test]
    fn rejects_too_long() {
        let long = "A".repeat(DeviceMac::MAX_LEN + 1);
        assert!(DeviceMac::new(long).is_err());
        assert!(DeviceMac::new("A".repeat(DeviceMac::MAX_LEN)).is_ok());
    }

    #[test]
    fn case_is_preserved() {
        let lower = DeviceMac::new("aa:bb").unwrap();
        let upper = DeviceMac::new("AA:BB").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn serde_as_plain_string() {
        let mac = DeviceMac::new("AA:BB").unwrap();
        assert_eq!(serde_json::to_string(&mac).unwrap(), "\"AA:BB\"");

        let parsed: DeviceMac = serde_json::from_str("\"CC:DD\"").unwrap();
        assert_eq!(parsed.as_str(), "CC:DD");

        assert!(serde_json::from_str::<DeviceMac>("\"bad mac\"").is_err());
    }
}
