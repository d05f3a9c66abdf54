// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `PrintPlug` library.
//!
//! Failures fall into a small taxonomy: bad input ([`ValueError`]), missing
//! targets ([`NotFoundError`]) and unreachable collaborators
//! ([`UpstreamError`]). The top-level [`Error`] wraps them so callers of the
//! command surface can match on the category with [`Error::kind`].

use thiserror::Error;

use crate::registration::RegistrationKey;
use crate::types::DeviceMac;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A value or command was malformed or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ValueError),

    /// The targeted registration or device does not exist.
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// A collaborator (store, directory, gateway, runtime) could not be reached.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),

    /// The tracker already holds its maximum number of pending actions.
    #[error("too many pending actions (limit {limit})")]
    CapacityExhausted {
        /// The configured limit.
        limit: usize,
    },

    /// A command succeeded but its response could not be encoded.
    #[error("response encoding failed: {0}")]
    ResponseEncoding(#[source] serde_json::Error),
}

/// Coarse classification of an [`Error`], for transports that map errors
/// onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::InvalidConfiguration`].
    InvalidConfiguration,
    /// See [`Error::NotFound`].
    NotFound,
    /// See [`Error::UpstreamUnavailable`].
    UpstreamUnavailable,
    /// See [`Error::CapacityExhausted`].
    CapacityExhausted,
    /// See [`Error::ResponseEncoding`].
    Internal,
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::CapacityExhausted { .. } => ErrorKind::CapacityExhausted,
            Self::ResponseEncoding(_) => ErrorKind::Internal,
        }
    }
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A delay below zero seconds was supplied.
    #[error("delay must not be negative (got {0}s)")]
    NegativeDelay(f64),

    /// A delay that is not a finite, representable number of seconds.
    #[error("invalid delay: {0}s")]
    InvalidDelay(f64),

    /// An event name outside the printer event vocabulary.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// An action name outside the action vocabulary.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A device identifier that is empty, too long or has invalid characters.
    #[error("invalid device mac: {0:?}")]
    InvalidMac(String),

    /// A pending action identifier that is not a UUID.
    #[error("invalid pending id: {0:?}")]
    InvalidPendingId(String),

    /// A limit that must be positive was zero.
    #[error("{0} must be greater than zero")]
    InvalidLimit(&'static str),

    /// A command payload that could not be decoded.
    #[error("malformed command: {0}")]
    MalformedCommand(String),
}

/// Errors for operations that target something that does not exist.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    /// No registration exists for the triple.
    #[error("no registration for {0}")]
    Registration(RegistrationKey),

    /// The device directory does not know the device.
    #[error("unknown device {0}")]
    Device(DeviceMac),
}

/// Errors raised when a collaborator cannot serve a request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The actuator gateway failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The registration source could not be queried.
    #[error("registration store unavailable: {0}")]
    RegistrationStore(String),

    /// The device directory could not be queried.
    #[error("device directory unavailable: {0}")]
    DeviceDirectory(String),

    /// No tokio runtime is available to run timers on.
    #[error("no tokio runtime available")]
    NoRuntime,
}

/// Errors reported by an actuator gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway could not be reached.
    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    /// The gateway answered but refused the action.
    #[error("action rejected ({status}): {reason}")]
    Rejected {
        /// Status code reported by the gateway.
        status: u16,
        /// Human readable reason.
        reason: String,
    },

    /// The gateway does not know the device.
    #[error("gateway does not know device {0}")]
    UnknownDevice(DeviceMac),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
