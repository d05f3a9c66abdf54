// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delay before a scheduled action fires.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

/// A non-negative delay between a trigger and its action.
///
/// Commands carry delays as floating point seconds, so the fallible
/// constructor [`from_secs_f64`](Self::from_secs_f64) is where negative or
/// non-finite values are rejected. Once built, a `Delay` is always valid.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use printplug_lib::types::Delay;
///
/// let delay = Delay::from_secs_f64(2.5).unwrap();
/// assert_eq!(delay.as_duration(), Duration::from_millis(2500));
///
/// assert!(Delay::from_secs_f64(-1.0).is_err());
/// assert!(Delay::ZERO.is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Delay(Duration);

impl Delay {
    /// No delay: the action fires as soon as the scheduler gets to it.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Creates a delay from a duration.
    #[must_use]
    pub const fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    /// Creates a delay from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Creates a delay from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Creates a delay from fractional seconds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NegativeDelay` for values below zero, and
    /// `ValueError::InvalidDelay` for NaN, infinite or overflowing values.
    pub fn from_secs_f64(secs: f64) -> Result<Self, ValueError> {
        if secs.is_nan() || secs.is_infinite() {
            return Err(ValueError::InvalidDelay(secs));
        }
        if secs < 0.0 {
            return Err(ValueError::NegativeDelay(secs));
        }
        Duration::try_from_secs_f64(secs)
            .map(Self)
            .map_err(|_| ValueError::InvalidDelay(secs))
    }

    /// Returns the delay as a duration.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Returns the delay in fractional seconds.
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Returns true if there is no delay.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.as_secs_f64())
    }
}

impl From<Duration> for Delay {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<Delay> for Duration {
    fn from(delay: Delay) -> Self {
        delay.0
    }
}

impl TryFrom<f64> for Delay {
    type Error = ValueError;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        Self::from_secs_f64(secs)
    }
}

impl Serialize for Delay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_secs_f64())
    }
}

impl<'de> Deserialize<'de> for Delay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Self::from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
