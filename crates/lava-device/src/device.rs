//! Device configuration as consulted by the dispatch pipeline

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::commands::Commands;
use crate::constants::Constants;
use crate::error::ConfigurationError;

/// Power state assumed at the start of a job
pub const DEFAULT_POWER_STATE: &str = "off";

fn default_power_state() -> String {
    DEFAULT_POWER_STATE.to_string()
}

/// An explicit null reads as the default power state
fn deserialize_power_state<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_power_state))
}

/// A loaded device configuration.
///
/// Each job owns its own instance; clone it rather than sharing one across
/// jobs, since `power_state` changes while a job runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device type name (e.g. `beaglebone-black`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Hostname of this particular device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Commands>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<Constants>,
    #[serde(
        default = "default_power_state",
        deserialize_with = "deserialize_power_state"
    )]
    power_state: String,
    /// Remaining top-level keys, in document order
    #[serde(flatten)]
    extra: Mapping,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: None,
            hostname: None,
            commands: None,
            constants: None,
            power_state: default_power_state(),
            extra: Mapping::new(),
        }
    }
}

impl DeviceConfig {
    pub fn hard_reset_command(&self) -> &str {
        self.command(|c| c.hard_reset.as_deref()).unwrap_or("")
    }

    pub fn soft_reset_command(&self) -> &str {
        self.command(|c| c.soft_reset.as_deref()).unwrap_or("")
    }

    pub fn power_command(&self) -> &str {
        self.command(|c| c.power_on.as_deref()).unwrap_or("")
    }

    pub fn power_off_command(&self) -> &str {
        self.command(|c| c.power_off.as_deref()).unwrap_or("")
    }

    /// Command run before the OS boots; `None` when not configured
    pub fn pre_os_command(&self) -> Option<&str> {
        self.command(|c| c.pre_os_command.as_deref())
    }

    /// Command run before power-on; `None` when not configured
    pub fn pre_power_command(&self) -> Option<&str> {
        self.command(|c| c.pre_power_command.as_deref())
    }

    /// Command used to reach the device console.
    ///
    /// Unlike the other command accessors this one requires a `commands`
    /// section and fails without it.
    pub fn connect_command(&self) -> Result<&str, ConfigurationError> {
        self.commands
            .as_ref()
            .map(Commands::connect_command)
            .ok_or(ConfigurationError::MissingCommands)
    }

    /// Look up a constant, optionally scoped under `prefix`.
    ///
    /// Fails when the device has no `constants` section at all, whatever
    /// `missing_ok` says.
    pub fn get_constant(
        &self,
        name: &str,
        prefix: Option<&str>,
        missing_ok: bool,
    ) -> Result<Option<&Value>, ConfigurationError> {
        self.constants()?.lookup(name, prefix, missing_ok)
    }

    pub fn get_constant_as<T: DeserializeOwned>(
        &self,
        name: &str,
        prefix: Option<&str>,
        missing_ok: bool,
    ) -> Result<Option<T>, ConfigurationError> {
        self.constants()?.lookup_as(name, prefix, missing_ok)
    }

    pub fn power_state(&self) -> &str {
        &self.power_state
    }

    pub fn set_power_state(&mut self, state: impl Into<String>) {
        let state = state.into();
        debug!(from = %self.power_state, to = %state, "Power state change");
        self.power_state = state;
    }

    pub fn device_type(&self) -> Option<&str> {
        self.device_type.as_deref()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Any top-level key without a dedicated accessor (e.g. `actions`)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigurationError> {
        serde_yaml::to_string(self).map_err(|e| ConfigurationError::Serialize(e.to_string()))
    }

    fn command<'a>(&'a self, f: impl FnOnce(&'a Commands) -> Option<&'a str>) -> Option<&'a str> {
        self.commands.as_ref().and_then(f)
    }

    fn constants(&self) -> Result<&Constants, ConfigurationError> {
        self.constants
            .as_ref()
            .ok_or(ConfigurationError::MissingConstants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Connection, Connections, PRIMARY_TAG};

    #[test]
    fn test_no_commands_degrades() {
        let device = DeviceConfig::default();
        assert_eq!(device.hard_reset_command(), "");
        assert_eq!(device.soft_reset_command(), "");
        assert_eq!(device.power_command(), "");
        assert_eq!(device.power_off_command(), "");
        assert_eq!(device.pre_os_command(), None);
        assert_eq!(device.pre_power_command(), None);
        assert_eq!(
            device.connect_command().unwrap_err(),
            ConfigurationError::MissingCommands
        );
    }

    #[test]
    fn test_command_accessors() {
        let device = DeviceConfig {
            commands: Some(Commands {
                hard_reset: Some("pduclient --command reboot".to_string()),
                soft_reset: Some("reboot".to_string()),
                power_on: Some("pduclient --command on".to_string()),
                pre_os_command: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(device.hard_reset_command(), "pduclient --command reboot");
        assert_eq!(device.soft_reset_command(), "reboot");
        assert_eq!(device.power_command(), "pduclient --command on");
        // an empty command is still a configured command
        assert_eq!(device.pre_os_command(), Some(""));
        assert_eq!(device.pre_power_command(), None);
        assert_eq!(device.connect_command().unwrap(), "");
    }

    #[test]
    fn test_connect_command_uses_connections() {
        let mut connections = Connections::new();
        connections.insert("A", Connection::new("cmdA"));
        connections.insert("B", Connection::new("cmdB").with_tag(PRIMARY_TAG));
        let device = DeviceConfig {
            commands: Some(Commands {
                connections: Some(connections),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(device.connect_command().unwrap(), "cmdB");
    }

    #[test]
    fn test_constants_section_required() {
        let device = DeviceConfig::default();
        for missing_ok in [true, false] {
            assert_eq!(
                device.get_constant("timeout", None, missing_ok).unwrap_err(),
                ConfigurationError::MissingConstants
            );
            assert_eq!(
                device
                    .get_constant("timeout", Some("u-boot"), missing_ok)
                    .unwrap_err(),
                ConfigurationError::MissingConstants
            );
        }
        assert!(device.get_constant_as::<u32>("timeout", None, true).is_err());
    }

    #[test]
    fn test_power_state_transitions() {
        let mut device = DeviceConfig::default();
        assert_eq!(device.power_state(), "off");
        device.set_power_state("on");
        assert_eq!(device.power_state(), "on");

        // clones are independent
        let copy = device.clone();
        device.set_power_state("off");
        assert_eq!(copy.power_state(), "on");
    }
}
