// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Actuator gateways: the boundary where actions reach physical devices.
//!
//! The core never talks to devices directly. When a pending action elapses,
//! or when a manual `turn_on`/`turn_off` command arrives, it calls
//! [`ActuatorGateway::actuate`] and treats the result as opaque success or
//! failure. Gateways are expected to be idempotent and may retry
//! internally; the core itself never retries.
//!
//! # Gateways
//!
//! - [`WebhookGateway`] - relays actions to an HTTP bridge (feature `http`)
//! - [`DryRunGateway`] - logs actions without performing them

#[cfg(feature = "http")]
mod webhook;

use std::future::Future;
use std::sync::Arc;

#[cfg(feature = "http")]
pub use webhook::{WebhookConfig, WebhookGateway};

use crate::error::GatewayError;
use crate::types::{Action, DeviceMac};

/// Capability to switch a device on or off.
///
/// Implementations can use `async fn` as long as the returned future is
/// `Send`, since pending actions fire from spawned tasks.
///
/// # Examples
///
/// ```
/// use printplug_lib::error::GatewayError;
/// use printplug_lib::gateway::ActuatorGateway;
/// use printplug_lib::types::{Action, DeviceMac};
///
/// struct Printer;
///
/// impl ActuatorGateway for Printer {
///     async fn actuate(&self, device: &DeviceMac, action: Action) -> Result<(), GatewayError> {
///         println!("{action} -> {device}");
///         Ok(())
///     }
/// }
/// ```
pub trait ActuatorGateway: Send + Sync + 'static {
    /// Applies `action` to `device`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the action could not be performed.
    fn actuate(
        &self,
        device: &DeviceMac,
        action: Action,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

impl<G: ActuatorGateway> ActuatorGateway for Arc<G> {
    fn actuate(
        &self,
        device: &DeviceMac,
        action: Action,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        G::actuate(self, device, action)
    }
}

/// Gateway that only logs the actions it receives.
///
/// Handy while setting up bindings, before a real gateway is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunGateway;

impl ActuatorGateway for DryRunGateway {
    async fn actuate(&self, device: &DeviceMac, action: Action) -> Result<(), GatewayError> {
        tracing::info!(device_mac = %device, action = %action, "Dry run: not switching device");
        Ok(())
    }
}
