// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// An action applied to a device when a binding fires.
///
/// # Examples
///
/// ```
/// use printplug_lib::types::Action;
///
/// assert_eq!(Action::TurnOn.as_str(), "TurnOn");
/// assert_eq!(Action::TurnOn.opposite(), Action::TurnOff);
/// assert_eq!(Action::from(false), Action::TurnOff);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Switch the device on.
    TurnOn,
    /// Switch the device off.
    TurnOff,
}

impl Action {
    /// Every action, in listing order.
    pub const ALL: [Self; 2] = [Self::TurnOn, Self::TurnOff];

    /// Returns the host-facing action name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TurnOn => "TurnOn",
            Self::TurnOff => "TurnOff",
        }
    }

    /// Returns the action that undoes this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TurnOn => Self::TurnOff,
            Self::TurnOff => Self::TurnOn,
        }
    }

    /// Returns the names of all actions, in listing order.
    #[must_use]
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|a| a.as_str().to_string()).collect()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TurnOn" => Ok(Self::TurnOn),
            "TurnOff" => Ok(Self::TurnOff),
            _ => Err(ValueError::UnknownAction(s.to_string())),
        }
    }
}

impl From<bool> for Action {
    fn from(on: bool) -> Self {
        if on { Self::TurnOn } else { Self::TurnOff }
    }
}
