// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP webhook gateway.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::error::GatewayError;
use crate::types::{Action, DeviceMac};

use super::ActuatorGateway;

// ============================================================================
// WebhookConfig
// ============================================================================

/// Configuration of a [`WebhookGateway`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use printplug_lib::gateway::WebhookConfig;
///
/// let config = WebhookConfig::new("http://bridge.local:8080/")
///     .with_token("s3cret")
///     .with_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.base_url(), "http://bridge.local:8080");
/// ```
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl WebhookConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the bridge at `base_url`.
    ///
    /// A missing scheme defaults to `http://`; trailing slashes are dropped.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url
        } else {
            format!("http://{base_url}")
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the bridge's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the bearer token, if set.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates the gateway.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the HTTP client cannot be created.
    pub fn into_gateway(self) -> Result<WebhookGateway, GatewayError> {
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(WebhookGateway {
            base_url: self.base_url,
            token: self.token,
            client,
        })
    }
}

// ============================================================================
// WebhookGateway
// ============================================================================

/// Gateway relaying actions to an HTTP bridge service.
///
/// Each action becomes `POST {base}/devices/{mac}/{turn_on|turn_off}` with
/// a JSON body naming the device and action. Any 2xx status is success.
#[derive(Debug, Clone)]
pub struct WebhookGateway {
    base_url: String,
    token: Option<String>,
    client: Client,
}

#[derive(Serialize)]
struct ActionRequest<'a> {
    device_mac: &'a DeviceMac,
    action: Action,
}

impl WebhookGateway {
    /// Creates a gateway with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        WebhookConfig::new(base_url).into_gateway()
    }

    /// Returns the bridge's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn action_url(&self, device: &DeviceMac, action: Action) -> String {
        let verb = match action {
            Action::TurnOn => "turn_on",
            Action::TurnOff => "turn_off",
        };
        format!(
            "{}/devices/{}/{verb}",
            self.base_url,
            urlencoding::encode(device.as_str())
        )
    }
}

impl ActuatorGateway for WebhookGateway {
    async fn actuate(&self, device: &DeviceMac, action: Action) -> Result<(), GatewayError> {
        let url = self.action_url(device, action);

        tracing::debug!(url = %url, device_mac = %device, action = %action, "Sending webhook");

        let mut request = self
            .client
            .post(&url)
            .json(&ActionRequest { device_mac: device, action });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::UnknownDevice(device.clone()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                body.trim().to_string()
            };
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        tracing::debug!(status = status.as_u16(), "Webhook accepted");
        Ok(())
    }
}
