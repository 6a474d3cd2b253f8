// novade-input-manager/src/error.rs

//! Error types for the input manager.
//!
//! Nothing in this crate is allowed to take the session down because a device
//! is misconfigured, so most of these errors end up in a log line rather than
//! in front of a user. They are still returned as values so that callers (and
//! tests) can see exactly which event was dropped and why.

use std::path::PathBuf;
use thiserror::Error;

use crate::device::{DeviceId, DriverHandle};
use crate::driver::SettingKind;

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum InputError {
    /// The driver refused a single configuration field. Remaining fields of the
    /// same apply/reset call are still pushed.
    #[error("Driver rejected {setting} for device '{identifier}': {source}")]
    DriverRejected {
        identifier: String,
        setting: SettingKind,
        #[source]
        source: DriverError,
    },

    /// A backend event referenced a driver handle that is not registered.
    #[error("No registered input device for driver handle {handle}")]
    DeviceNotFound { handle: DriverHandle },

    /// A device id that is not (or no longer) in the registry.
    #[error("Unknown input device {0}")]
    UnknownDevice(DeviceId),

    /// The backend announced the same driver handle twice.
    #[error("Driver handle {handle} is already registered as '{identifier}'")]
    DuplicateHandle {
        handle: DriverHandle,
        identifier: String,
    },

    /// The device id space is exhausted; the new device could not be allocated.
    #[error("Unable to allocate an id for input device '{identifier}'")]
    DeviceIdExhausted { identifier: String },

    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
}

/// Error type for loading and validating input/seat configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An error occurred while attempting to read a configuration file.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML or does not match the expected layout.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The document parsed, but a value is not acceptable.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Status of a single driver-level configuration push.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The device does not support this option at all.
    #[error("option not supported by device")]
    Unsupported,

    /// The device supports the option but not this value.
    #[error("invalid value for option")]
    Invalid,

    /// Any other backend failure, with the backend's own description.
    #[error("backend error: {0}")]
    Backend(String),
}
