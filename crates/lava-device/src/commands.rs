//! The `commands` section of a device configuration

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::connection::{Connections, Selection};

/// Power, reset and connection commands for a device.
///
/// A known command key whose value is not a string (e.g. a list of
/// commands) is kept in `other` rather than rejecting the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Mapping")]
pub struct Commands {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_reset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_reset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_off: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_os_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_power_command: Option<String>,
    /// Single connect command; takes precedence over `connections`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Connections>,
    /// Any other command keys, kept verbatim
    #[serde(flatten)]
    pub other: Mapping,
}

impl TryFrom<Mapping> for Commands {
    type Error = serde_yaml::Error;

    fn try_from(mut raw: Mapping) -> Result<Self, Self::Error> {
        let connections = match raw.remove("connections") {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_yaml::from_value(value)?),
        };
        Ok(Self {
            hard_reset: take_command(&mut raw, "hard_reset"),
            soft_reset: take_command(&mut raw, "soft_reset"),
            power_on: take_command(&mut raw, "power_on"),
            power_off: take_command(&mut raw, "power_off"),
            pre_os_command: take_command(&mut raw, "pre_os_command"),
            pre_power_command: take_command(&mut raw, "pre_power_command"),
            connect: take_command(&mut raw, "connect"),
            connections,
            other: raw,
        })
    }
}

/// Move a string command out of the raw mapping; nulls count as absent and
/// any other value stays behind
fn take_command(raw: &mut Mapping, key: &str) -> Option<String> {
    match raw.get(key) {
        Some(Value::String(_)) => match raw.remove(key) {
            Some(Value::String(command)) => Some(command),
            _ => None,
        },
        Some(Value::Null) => {
            raw.remove(key);
            None
        }
        _ => None,
    }
}

impl Commands {
    /// Resolve the command used to reach the device console.
    ///
    /// A top-level `connect` wins outright. Otherwise the `connections`
    /// block is scanned for the primary entry. Anything else resolves to
    /// an empty string.
    pub fn connect_command(&self) -> &str {
        if let Some(connect) = self.connect.as_deref() {
            return connect;
        }
        match self.connections.as_ref().map(Connections::select) {
            Some(Selection::Primary { connect, .. }) => connect,
            _ => "",
        }
    }

    /// Look up a command key that has no dedicated field
    pub fn other(&self, key: &str) -> Option<&Value> {
        self.other.get(key)
    }
}
