//! Building a [`DeviceConfig`] from a YAML document or a prebuilt mapping
//!
//! This is the only place the generic YAML tree is converted into the typed
//! device model. Nothing here checks whether the device suits a job; that is
//! left to [`crate::DeviceFamily::check_config`].

use serde_yaml::{Mapping, Value};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::device::{DeviceConfig, DEFAULT_POWER_STATE};
use crate::error::ConfigurationError;

const POWER_STATE_KEY: &str = "power_state";

impl DeviceConfig {
    /// Load a device configuration from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| {
            warn!(path = %source_name, error = %e, "Failed to read device configuration");
            ConfigurationError::unreadable(&source_name, e)
        })?;
        Self::from_yaml_str(&content, &source_name)
    }

    /// Load a device configuration from an open stream
    pub fn from_reader<R: Read>(
        mut reader: R,
        source_name: &str,
    ) -> Result<Self, ConfigurationError> {
        let mut content = String::new();
        reader.read_to_string(&mut content).map_err(|e| {
            warn!(source = %source_name, error = %e, "Failed to read device configuration");
            ConfigurationError::unreadable(source_name, e)
        })?;
        Self::from_yaml_str(&content, source_name)
    }

    /// Load a device configuration from YAML text
    pub fn from_yaml_str(content: &str, source_name: &str) -> Result<Self, ConfigurationError> {
        if content.trim().is_empty() {
            warn!(source = %source_name, "Device configuration is empty");
            return Err(ConfigurationError::invalid(source_name, "empty document"));
        }
        let value: Value = serde_yaml::from_str(content).map_err(|e| {
            warn!(source = %source_name, error = %e, "Device configuration could not be parsed");
            ConfigurationError::unparseable(source_name, e)
        })?;
        match value {
            Value::Mapping(mapping) => ingest(mapping, source_name),
            other => {
                warn!(source = %source_name, "Device configuration is not a mapping");
                Err(ConfigurationError::invalid(
                    source_name,
                    format!("expected a mapping at the top level, found {}", kind(&other)),
                ))
            }
        }
    }

    /// Adopt an already-built mapping without parsing, e.g. one assembled
    /// from database content by the scheduler
    pub fn from_mapping(mapping: Mapping) -> Result<Self, ConfigurationError> {
        ingest(mapping, "<mapping>")
    }
}

fn ingest(mut mapping: Mapping, source_name: &str) -> Result<DeviceConfig, ConfigurationError> {
    if !mapping.contains_key(POWER_STATE_KEY) {
        mapping.insert(POWER_STATE_KEY.into(), DEFAULT_POWER_STATE.into());
    }
    let device: DeviceConfig = serde_yaml::from_value(Value::Mapping(mapping)).map_err(|e| {
        warn!(source = %source_name, error = %e, "Device configuration has an invalid layout");
        ConfigurationError::invalid(source_name, e)
    })?;
    info!(
        source = %source_name,
        device_type = device.device_type().unwrap_or("unknown"),
        power_state = device.power_state(),
        "Loaded device configuration"
    );
    Ok(device)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
