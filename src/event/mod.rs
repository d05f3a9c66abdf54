// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notifications about pending action lifecycles.
//!
//! The tracker publishes a [`TrackerEvent`] whenever a pending action is
//! scheduled, fires, fails or is cancelled. Polling
//! [`list_pending`](crate::pending::PendingActionTracker::list_pending)
//! remains the way to read current state; notifications are for observers
//! that want to react to transitions (logs, toasts, tests).
//!
//! # Examples
//!
//! ```no_run
//! use printplug_lib::event::TrackerEvent;
//! use printplug_lib::gateway::DryRunGateway;
//! use printplug_lib::pending::PendingActionTracker;
//!
//! # async fn example() {
//! let tracker = PendingActionTracker::new(DryRunGateway);
//! let mut rx = tracker.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = rx.recv().await {
//!         if let TrackerEvent::FireFailed { pending, error } = event {
//!             eprintln!("{} failed on {}: {error}", pending.action(), pending.device());
//!         }
//!     }
//! });
//! # }
//! ```

mod tracker_event;

pub use tracker_event::{CancelReason, TrackerEvent};
