// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pending action identifier type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValueError;

/// Unique identifier of one scheduled (pending) action.
///
/// Every trigger gets a fresh id, even when the same binding fires twice,
/// so cancelling one pending action never touches another.
///
/// # Examples
///
/// ```
/// use printplug_lib::pending::PendingId;
///
/// let id = PendingId::new();
/// let parsed: PendingId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingId(Uuid);

impl PendingId {
    /// Creates a new unique identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PendingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show only first 8 characters for readability
        let short = &self.0.to_string()[..8];
        write!(f, "PendingId({short}...)")
    }
}

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PendingId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ValueError::InvalidPendingId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLAY: &str = "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8";

    #[test]
    fn new_creates_unique_ids() {
        assert_ne!(PendingId::new(), PendingId::new());
    }

    #[test]
    fn parse_display_form() {
        let id: PendingId = DISPLAY.parse().unwrap();
        assert_eq!(id.to_string(), DISPLAY);
        assert_eq!(format!("  {DISPLAY}\n").parse::<PendingId>().unwrap(), id);
    }

    #[test]
    fn parse_garbage() {
        assert_eq!(
            "not-a-uuid".parse::<PendingId>(),
            Err(ValueError::InvalidPendingId("not-a-uuid".to_string()))
        );
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", PendingId::new());
        assert!(debug.starts_with("PendingId("));
        assert!(debug.ends_with("...)"));
    }

    #[test]
    fn serializes_as_string() {
        let id: PendingId = DISPLAY.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{DISPLAY}\""));
        assert_eq!(serde_json::from_str::<PendingId>(&json).unwrap(), id);
    }
}
