//! Errors raised while loading or querying a device configuration

use thiserror::Error;

/// A user-facing, non-retryable problem with a device configuration.
///
/// Parser and I/O failures are flattened into message text so that callers
/// never depend on the underlying YAML library's error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{source_name} could not be read: {reason}")]
    Unreadable { source_name: String, reason: String },
    #[error("{source_name} could not be parsed: {reason}")]
    Unparseable { source_name: String, reason: String },
    #[error("{source_name} is not a valid device configuration: {reason}")]
    Invalid { source_name: String, reason: String },
    #[error("commands section not present in the device config.")]
    MissingCommands,
    #[error("constants section not present in the device config.")]
    MissingConstants,
    #[error("Constant {name} does not exist in the device config 'constants' section.")]
    MissingConstant { name: String },
    #[error("Constant {prefix},{name} does not exist in the device config 'constants' section.")]
    MissingPrefixedConstant { prefix: String, name: String },
    #[error("Constant {name} has an unexpected type: {reason}")]
    InvalidConstant { name: String, reason: String },
    #[error("Job is not compatible with this device: {reason}")]
    Incompatible { reason: String },
    #[error("Failed to serialize device config: {0}")]
    Serialize(String),
}

impl ConfigurationError {
    pub fn unreadable(source_name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Unreadable {
            source_name: source_name.into(),
            reason: err.to_string(),
        }
    }

    pub fn unparseable(source_name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Unparseable {
            source_name: source_name.into(),
            reason: err.to_string(),
        }
    }

    pub fn invalid(source_name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Invalid {
            source_name: source_name.into(),
            reason: err.to_string(),
        }
    }

    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self::Incompatible {
            reason: reason.into(),
        }
    }
}
