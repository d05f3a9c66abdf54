// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Printer lifecycle events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A named point in the printer's lifecycle.
///
/// The set is fixed. Declaration order is also the stable listing order
/// used for registrations and for the event arrays in device views.
///
/// # Examples
///
/// ```
/// use printplug_lib::types::PrinterEvent;
///
/// let event: PrinterEvent = "PrintFailed".parse().unwrap();
/// assert_eq!(event, PrinterEvent::PrintFailed);
/// assert_eq!(event.as_str(), "PrintFailed");
///
/// // Host events outside the vocabulary are simply not ours
/// assert_eq!(PrinterEvent::from_name("SlicingStarted"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrinterEvent {
    /// A client connected to the printer host.
    ClientOpened,
    /// A client disconnected from the printer host.
    ClientClosed,
    /// A print job started.
    PrintStarted,
    /// A print job failed.
    PrintFailed,
    /// A print job finished successfully.
    PrintDone,
    /// A print job was cancelled.
    PrintCancelled,
    /// A print job was paused.
    PrintPaused,
    /// A paused print job was resumed.
    PrintResumed,
    /// A timelapse capture started.
    CaptureStart,
    /// A timelapse capture finished.
    CaptureDone,
    /// A timelapse capture failed.
    CaptureFailed,
}

impl PrinterEvent {
    /// Every event, in listing order.
    pub const ALL: [Self; 11] = [
        Self::ClientOpened,
        Self::ClientClosed,
        Self::PrintStarted,
        Self::PrintFailed,
        Self::PrintDone,
        Self::PrintCancelled,
        Self::PrintPaused,
        Self::PrintResumed,
        Self::CaptureStart,
        Self::CaptureDone,
        Self::CaptureFailed,
    ];

    /// Returns the host-facing event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClientOpened => "ClientOpened",
            Self::ClientClosed => "ClientClosed",
            Self::PrintStarted => "PrintStarted",
            Self::PrintFailed => "PrintFailed",
            Self::PrintDone => "PrintDone",
            Self::PrintCancelled => "PrintCancelled",
            Self::PrintPaused => "PrintPaused",
            Self::PrintResumed => "PrintResumed",
            Self::CaptureStart => "CaptureStart",
            Self::CaptureDone => "CaptureDone",
            Self::CaptureFailed => "CaptureFailed",
        }
    }

    /// Looks up an event by its exact name.
    ///
    /// Returns `None` for names outside the vocabulary.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }

    /// Returns the position of this event in [`ALL`](Self::ALL).
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the names of all events, in listing order.
    #[must_use]
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|e| e.as_str().to_string()).collect()
    }
}

impl fmt::Display for PrinterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrinterEvent {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValueError::UnknownEvent(s.to_string()))
    }
}
