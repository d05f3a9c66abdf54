// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registration store: which device does what on which printer event.
//!
//! A registration binds a [`RegistrationKey`] (device, event, action) to a
//! [`RegistrationConfig`] (delay and conflict cancellation policy). Presence
//! in the store means the binding is active; there is no "disabled" state.
//!
//! The [`RegistrationStore`] is the in-process owner of all bindings. The
//! trigger dispatcher reads it through the [`RegistrationSource`] trait.

mod key;
mod store;

pub use key::{Registration, RegistrationConfig, RegistrationKey};
pub use store::{RegistrationSource, RegistrationStore};
