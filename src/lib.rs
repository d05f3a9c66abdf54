// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `PrintPlug` Lib - Switch smart devices in reaction to 3D printer events.
//!
//! Users bind a device, a printer event and an action ("turn the enclosure
//! plug off ten minutes after the print is done"). When the event occurs,
//! each matching binding becomes a *pending action* that fires after its
//! delay unless it is cancelled first.
//!
//! # Building Blocks
//!
//! - [`RegistrationStore`]: the (device, event, action) bindings with their
//!   delay and conflict cancellation policy
//! - [`PendingActionTracker`]: owns in-flight delayed actions and resolves
//!   each one exactly once, fired or cancelled
//! - [`TriggerDispatcher`]: turns an incoming printer event into pending
//!   actions
//! - [`ActuatorGateway`]: the boundary where actions reach the devices
//! - [`ApiHandler`]: JSON command surface for UIs and hosts
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use printplug_lib::{
//!     Action, Delay, DeviceMac, DeviceScope, PendingActionTracker, PrinterEvent,
//!     RegistrationKey, RegistrationStore, TriggerDispatcher, WebhookGateway,
//! };
//!
//! #[tokio::main]
//! async fn main() -> printplug_lib::Result<()> {
//!     let plug = DeviceMac::new("2C:AA:8E:00:11:22")?;
//!
//!     let store = Arc::new(RegistrationStore::new());
//!     store.register(
//!         RegistrationKey::new(plug.clone(), PrinterEvent::PrintStarted, Action::TurnOn),
//!         Delay::ZERO,
//!         false,
//!     );
//!     store.register(
//!         RegistrationKey::new(plug, PrinterEvent::PrintDone, Action::TurnOff),
//!         Delay::from_secs(600),
//!         true,
//!     );
//!
//!     let gateway = WebhookGateway::new("http://bridge.local:8080")
//!         .map_err(printplug_lib::error::UpstreamError::from)?;
//!     let tracker = PendingActionTracker::new(gateway);
//!     let dispatcher = TriggerDispatcher::new(store, tracker.clone());
//!
//!     // Plug turns off ten minutes after the print, unless a new print
//!     // starts first.
//!     dispatcher.on_event(&DeviceScope::All, PrinterEvent::PrintDone)?;
//!     dispatcher.on_event(&DeviceScope::All, PrinterEvent::PrintStarted)?;
//!
//!     for pending in &tracker.list_pending() {
//!         println!("{} -> {} at {}", pending.action(), pending.device(), pending.fires_at());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Observing Pending Actions
//!
//! [`PendingActionTracker::list_pending`] returns a consistent snapshot and
//! is the primary way to observe state. Lifecycle notifications are also
//! available through [`PendingActionTracker::subscribe`].

pub mod api;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod gateway;
pub mod pending;
pub mod registration;
pub mod types;

pub use api::{ApiCommand, ApiHandler, ApiResponse};
pub use config::{HubConfig, TrackerConfig, WebhookSettings};
pub use device::{Device, DeviceDirectory, DeviceType, StaticDirectory};
pub use dispatch::{DeviceScope, TriggerDispatcher};
pub use error::{Error, ErrorKind, GatewayError, NotFoundError, Result, UpstreamError, ValueError};
pub use event::{CancelReason, TrackerEvent};
pub use gateway::{ActuatorGateway, DryRunGateway};
#[cfg(feature = "http")]
pub use gateway::{WebhookConfig, WebhookGateway};
pub use pending::{PendingAction, PendingActionTracker, PendingId, PendingSnapshot};
pub use registration::{
    Registration, RegistrationConfig, RegistrationKey, RegistrationSource, RegistrationStore,
};
pub use types::{Action, Delay, DeviceMac, PrinterEvent};
