// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command surface for UIs and host integrations.
//!
//! Commands arrive either typed ([`ApiCommand`]) or as JSON objects tagged
//! with a `command` field:
//!
//! ```json
//! {"command": "register", "device_mac": "AA:BB", "event_name": "PrintDone",
//!  "action_name": "TurnOff", "delay": 300, "cancel_on_conflict": true}
//! ```
//!
//! Identifiers travel as strings and are validated by the handler, so a bad
//! value reports the precise [`ValueError`] instead of a parse failure.

mod views;

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use views::{ApiResponse, DeviceView, EnumsView, PendingActionView, RegistrationView};

use crate::device::{Device, DeviceDirectory};
use crate::dispatch::{DeviceScope, TriggerDispatcher};
use crate::error::{Error, NotFoundError, UpstreamError, ValueError};
use crate::gateway::ActuatorGateway;
use crate::pending::{PendingActionTracker, PendingId};
use crate::registration::{RegistrationKey, RegistrationStore};
use crate::types::{Action, Delay, DeviceMac, PrinterEvent};

/// A command, as sent by a UI or host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ApiCommand {
    /// List event and action names.
    GetEnums,
    /// List devices with their registrations and pending actions.
    GetDevices,
    /// Create or replace a registration.
    Register {
        device_mac: String,
        event_name: String,
        action_name: String,
        /// Delay in seconds.
        #[serde(default)]
        delay: f64,
        #[serde(default)]
        cancel_on_conflict: bool,
    },
    /// Remove a registration.
    Unregister {
        device_mac: String,
        event_name: String,
        action_name: String,
    },
    /// Enable conflict cancellation on a registration.
    AddCancel {
        device_mac: String,
        event_name: String,
        action_name: String,
    },
    /// Disable conflict cancellation on a registration.
    RemoveCancel {
        device_mac: String,
        event_name: String,
        action_name: String,
    },
    /// Switch a device on now.
    TurnOn { device_mac: String },
    /// Switch a device off now.
    TurnOff { device_mac: String },
    /// List pending actions.
    GetPendingActions,
    /// Cancel one pending action.
    CancelPending { pending_id: String },
    /// Deliver a printer event.
    OnEvent {
        event_name: String,
        #[serde(default)]
        device_mac: Option<String>,
    },
}

fn parse_key(
    device_mac: &str,
    event_name: &str,
    action_name: &str,
) -> Result<RegistrationKey, ValueError> {
    Ok(RegistrationKey::new(
        DeviceMac::new(device_mac)?,
        PrinterEvent::from_str(event_name)?,
        Action::from_str(action_name)?,
    ))
}

fn encode_response<T: Serialize>(response: &T) -> Result<serde_json::Value, Error> {
    serde_json::to_value(response).map_err(|e| {
        tracing::warn!(error = %e, "Failed to encode response");
        Error::ResponseEncoding(e)
    })
}

/// Executes commands against a store, a tracker and a device directory.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use printplug_lib::api::ApiHandler;
/// use printplug_lib::device::{Device, DeviceType, StaticDirectory};
/// use printplug_lib::gateway::DryRunGateway;
/// use printplug_lib::pending::PendingActionTracker;
/// use printplug_lib::registration::RegistrationStore;
/// use printplug_lib::types::DeviceMac;
///
/// #[tokio::main]
/// async fn main() -> printplug_lib::Result<()> {
///     let directory = StaticDirectory::new()
///         .with_device(Device::new(DeviceMac::new("AA:BB")?, "Printer", DeviceType::Plug));
///     let api = ApiHandler::new(
///         Arc::new(RegistrationStore::new()),
///         Arc::new(directory),
///         PendingActionTracker::new(DryRunGateway),
///     );
///
///     api.handle_json(r#"{"command": "register", "device_mac": "AA:BB",
///         "event_name": "PrintDone", "action_name": "TurnOff", "delay": 60}"#)
///         .await?;
///
///     let reply = api.handle_json(r#"{"command": "on_event", "event_name": "PrintDone"}"#).await?;
///     assert_eq!(reply["pending_ids"].as_array().map(Vec::len), Some(1));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ApiHandler<D, G> {
    store: Arc<RegistrationStore>,
    directory: Arc<D>,
    tracker: PendingActionTracker<G>,
    dispatcher: TriggerDispatcher<RegistrationStore, G>,
}

impl<D, G> ApiHandler<D, G>
where
    D: DeviceDirectory,
    G: ActuatorGateway,
{
    /// Creates a handler. The dispatcher reads `store` and schedules on
    /// `tracker`.
    #[must_use]
    pub fn new(
        store: Arc<RegistrationStore>,
        directory: Arc<D>,
        tracker: PendingActionTracker<G>,
    ) -> Self {
        let dispatcher = TriggerDispatcher::new(Arc::clone(&store), tracker.clone());
        Self {
            store,
            directory,
            tracker,
            dispatcher,
        }
    }

    /// Returns the registration store.
    #[must_use]
    pub fn store(&self) -> &Arc<RegistrationStore> {
        &self.store
    }

    /// Returns the pending action tracker.
    #[must_use]
    pub fn tracker(&self) -> &PendingActionTracker<G> {
        &self.tracker
    }

    /// Returns the trigger dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &TriggerDispatcher<RegistrationStore, G> {
        &self.dispatcher
    }

    /// Parses a JSON command, executes it and serializes the response.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MalformedCommand` if the JSON is not a known
    /// command, `Error::ResponseEncoding` if the reply cannot be encoded, or
    /// whatever error the command itself returns.
    pub async fn handle_json(&self, json: &str) -> Result<serde_json::Value, Error> {
        let command: ApiCommand = serde_json::from_str(json)
            .map_err(|e| ValueError::MalformedCommand(e.to_string()))?;
        let response = self.handle(command).await?;
        encode_response(&response)
    }

    /// Executes a command.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation.
    pub async fn handle(&self, command: ApiCommand) -> Result<ApiResponse, Error> {
        match command {
            ApiCommand::GetEnums => Ok(ApiResponse::Enums(self.get_enums())),
            ApiCommand::GetDevices => Ok(ApiResponse::Devices {
                devices: self.get_devices().await?,
            }),
            ApiCommand::Register {
                device_mac,
                event_name,
                action_name,
                delay,
                cancel_on_conflict,
            } => {
                let key = parse_key(&device_mac, &event_name, &action_name)?;
                self.register(key, Delay::from_secs_f64(delay)?, cancel_on_conflict);
                Ok(ApiResponse::Ok {})
            }
            ApiCommand::Unregister {
                device_mac,
                event_name,
                action_name,
            } => {
                self.unregister(&parse_key(&device_mac, &event_name, &action_name)?);
                Ok(ApiResponse::Ok {})
            }
            ApiCommand::AddCancel {
                device_mac,
                event_name,
                action_name,
            } => {
                self.add_cancel(&parse_key(&device_mac, &event_name, &action_name)?)?;
                Ok(ApiResponse::Ok {})
            }
            ApiCommand::RemoveCancel {
                device_mac,
                event_name,
                action_name,
            } => {
                self.remove_cancel(&parse_key(&device_mac, &event_name, &action_name)?)?;
                Ok(ApiResponse::Ok {})
            }
            ApiCommand::TurnOn { device_mac } => {
                self.turn_on(&DeviceMac::new(device_mac)?).await?;
                Ok(ApiResponse::Ok {})
            }
            ApiCommand::TurnOff { device_mac } => {
                self.turn_off(&DeviceMac::new(device_mac)?).await?;
                Ok(ApiResponse::Ok {})
            }
            ApiCommand::GetPendingActions => Ok(ApiResponse::Pending {
                pending_actions: self.get_pending_actions(),
            }),
            ApiCommand::CancelPending { pending_id } => Ok(ApiResponse::Cancelled {
                cancelled: self.cancel_pending(PendingId::from_str(&pending_id)?),
            }),
            ApiCommand::OnEvent {
                event_name,
                device_mac,
            } => {
                let scope = DeviceScope::from(device_mac.map(DeviceMac::new).transpose()?);
                Ok(ApiResponse::Scheduled {
                    pending_ids: self.on_event(&scope, &event_name).await?,
                })
            }
        }
    }

    // =========================================================================
    // Typed operations
    // =========================================================================

    /// Returns the event and action vocabularies.
    #[must_use]
    pub fn get_enums(&self) -> EnumsView {
        EnumsView::current()
    }

    /// Lists the directory's devices with their registrations and pending
    /// actions.
    ///
    /// # Errors
    ///
    /// Returns `Error::UpstreamUnavailable` if the directory fails.
    pub async fn get_devices(&self) -> Result<Vec<DeviceView>, Error> {
        let devices = self.directory.devices().await?;
        let pending = self.tracker.list_pending();

        Ok(devices
            .iter()
            .map(|device| {
                let registrations = self.store.list_for(device.mac());
                let device_pending: Vec<_> = pending
                    .iter()
                    .filter(|p| p.device() == device.mac())
                    .cloned()
                    .collect();
                DeviceView::new(device, &registrations, &device_pending)
            })
            .collect())
    }

    /// Creates or replaces a registration.
    pub fn register(&self, key: RegistrationKey, delay: Delay, cancel_on_conflict: bool) {
        self.store.register(key, delay, cancel_on_conflict);
    }

    /// Removes a registration. Pending actions it created are left alone.
    pub fn unregister(&self, key: &RegistrationKey) -> bool {
        self.store.unregister(key)
    }

    /// Enables conflict cancellation for future triggers of `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if `key` is not registered.
    pub fn add_cancel(&self, key: &RegistrationKey) -> Result<(), Error> {
        self.store.set_cancel_flag(key, true)
    }

    /// Disables conflict cancellation for future triggers of `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if `key` is not registered.
    pub fn remove_cancel(&self, key: &RegistrationKey) -> Result<(), Error> {
        self.store.set_cancel_flag(key, false)
    }

    /// Switches a device on immediately, bypassing the tracker.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for devices unknown to the directory and
    /// `Error::UpstreamUnavailable` if the gateway fails.
    pub async fn turn_on(&self, device: &DeviceMac) -> Result<(), Error> {
        self.switch(device, Action::TurnOn).await
    }

    /// Switches a device off immediately, bypassing the tracker.
    ///
    /// # Errors
    ///
    /// Same as [`turn_on`](Self::turn_on).
    pub async fn turn_off(&self, device: &DeviceMac) -> Result<(), Error> {
        self.switch(device, Action::TurnOff).await
    }

    /// Returns a snapshot of pending actions, oldest first.
    #[must_use]
    pub fn get_pending_actions(&self) -> Vec<PendingActionView> {
        self.tracker
            .list_pending()
            .iter()
            .map(PendingActionView::from)
            .collect()
    }

    /// Cancels a pending action. Returns true if it was still pending.
    pub fn cancel_pending(&self, id: PendingId) -> bool {
        self.tracker.cancel(id)
    }

    /// Delivers a host event by name. Unknown names are ignored.
    ///
    /// Only devices the directory currently reports are switched, so a
    /// registration left behind by a removed device schedules nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::UpstreamUnavailable` if the directory fails; the event
    /// is dropped. Otherwise see [`TriggerDispatcher::on_event`].
    pub async fn on_event(
        &self,
        scope: &DeviceScope,
        event_name: &str,
    ) -> Result<Vec<PendingId>, Error> {
        let Some(event) = PrinterEvent::from_name(event_name) else {
            tracing::trace!(event_name, "Ignoring unrelated event");
            return Ok(Vec::new());
        };

        let devices = self.directory.devices().await.map_err(|e| {
            tracing::warn!(event = %event, error = %e, "Dropping event, devices unavailable");
            e
        })?;
        let scope = scope.restrict_to(devices.into_iter().map(|device| device.mac().clone()));

        self.dispatcher.on_event(&scope, event)
    }

    async fn switch(&self, mac: &DeviceMac, action: Action) -> Result<(), Error> {
        let device = self.find_device(mac).await?;

        tracing::info!(
            device_mac = %mac,
            device_name = %device.name(),
            action = %action,
            "Switching device manually"
        );

        self.tracker
            .gateway()
            .actuate(mac, action)
            .await
            .map_err(|e| {
                tracing::warn!(
                    device_mac = %mac,
                    action = %action,
                    error = %e,
                    "Manual switch failed"
                );
                Error::from(UpstreamError::from(e))
            })
    }

    async fn find_device(&self, mac: &DeviceMac) -> Result<Device, Error> {
        self.directory
            .devices()
            .await?
            .into_iter()
            .find(|device| device.mac() == mac)
            .ok_or_else(|| NotFoundError::Device(mac.clone()).into())
    }
}
