// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the registration store, the tracker and the
//! command surface.
//!
//! Each type validates at construction time, so the rest of the crate only
//! ever sees well-formed values.
//!
//! # Types
//!
//! - [`DeviceMac`] - Stable hardware identifier of a device
//! - [`PrinterEvent`] - Printer lifecycle events (fixed vocabulary)
//! - [`Action`] - `TurnOn` / `TurnOff`
//! - [`Delay`] - Non-negative delay before an action fires

mod action;
mod delay;
mod mac;
mod printer_event;

pub use action::Action;
pub use delay::Delay;
pub use mac::DeviceMac;
pub use printer_event::PrinterEvent;
