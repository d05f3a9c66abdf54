// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ValueError};

/// Limits of the pending action tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum number of simultaneously pending actions.
    pub max_pending: usize,
    /// Capacity of the notification channel.
    pub event_capacity: usize,
}

impl TrackerConfig {
    /// Default maximum number of pending actions.
    pub const DEFAULT_MAX_PENDING: usize = 1024;
    /// Default notification channel capacity.
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;

    /// Sets the maximum number of pending actions.
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Sets the notification channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }

    /// Checks the limits.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidLimit` if a limit is zero.
    pub fn validate(&self) -> Result<(), ValueError> {
        if self.max_pending == 0 {
            return Err(ValueError::InvalidLimit("max_pending"));
        }
        if self.event_capacity == 0 {
            return Err(ValueError::InvalidLimit("event_capacity"));
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_pending: Self::DEFAULT_MAX_PENDING,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Serializable settings of the HTTP webhook gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Base URL of the bridge service.
    pub base_url: String,
    /// Optional bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "WebhookSettings::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl WebhookSettings {
    /// Creates settings for the bridge at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_ms: Self::default_timeout_ms(),
        }
    }

    fn default_timeout_ms() -> u64 {
        10_000
    }
}

#[cfg(feature = "http")]
impl From<WebhookSettings> for crate::gateway::WebhookConfig {
    fn from(settings: WebhookSettings) -> Self {
        let config = Self::new(settings.base_url)
            .with_timeout(Duration::from_millis(settings.timeout_ms));
        match settings.token {
            Some(token) => config.with_token(token),
            None => config,
        }
    }
}

/// Top-level configuration of a scheduler instance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use printplug_lib::config::HubConfig;
///
/// let config = HubConfig::from_json_str(r#"{"tracker": {"max_pending": 16}}"#).unwrap();
/// assert_eq!(config.tracker.max_pending, 16);
/// assert_eq!(config.tracker.event_capacity, 256);
/// assert_eq!(config.poll_interval, Duration::from_millis(500));
///
/// assert!(HubConfig::from_json_str(r#"{"tracker": {"max_pending": 0}}"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Tracker limits.
    pub tracker: TrackerConfig,
    /// Recommended cadence for polling the pending action list.
    #[serde(rename = "poll_interval_ms", with = "duration_ms")]
    pub poll_interval: Duration,
    /// Webhook gateway settings, if one is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookSettings>,
}

impl HubConfig {
    /// Default pending list poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

    /// Parses and validates a JSON configuration. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if the JSON is malformed or a
    /// value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ValueError::MalformedCommand(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every limit.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidLimit` if a limit or interval is zero.
    pub fn validate(&self) -> Result<(), ValueError> {
        self.tracker.validate()?;
        if self.poll_interval.is_zero() {
            return Err(ValueError::InvalidLimit("poll_interval"));
        }
        Ok(())
    }

    /// Sets the maximum number of pending actions.
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.tracker.max_pending = max_pending;
        self
    }

    /// Sets the notification channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.tracker.event_capacity = event_capacity;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the webhook gateway settings.
    #[must_use]
    pub fn with_webhook(mut self, webhook: WebhookSettings) -> Self {
        self.webhook = Some(webhook);
        self
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            webhook: None,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
