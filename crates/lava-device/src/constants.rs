//! Two-level constants table with a missing-value policy
//!
//! Constants are either stored directly (`name -> value`) or grouped under a
//! prefix (`prefix -> { name -> value }`), typically one prefix per boot or
//! deployment method.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::ConfigurationError;

/// The `constants` section of a device configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constants(Mapping);

impl Constants {
    pub fn new(entries: Mapping) -> Self {
        Self(entries)
    }

    /// Look up a constant, honouring `missing_ok` for absent entries.
    ///
    /// With a prefix, a stored value that is null, false, zero or empty is
    /// reported as missing. Without a prefix only key presence matters.
    pub fn lookup(
        &self,
        name: &str,
        prefix: Option<&str>,
        missing_ok: bool,
    ) -> Result<Option<&Value>, ConfigurationError> {
        match prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => {
                let found = self
                    .0
                    .get(prefix)
                    .and_then(Value::as_mapping)
                    .and_then(|scoped| scoped.get(name))
                    .filter(|value| !is_falsy(value));
                match found {
                    Some(value) => Ok(Some(value)),
                    None if missing_ok => Ok(None),
                    None => Err(ConfigurationError::MissingPrefixedConstant {
                        prefix: prefix.to_string(),
                        name: name.to_string(),
                    }),
                }
            }
            None => match self.0.get(name) {
                Some(value) => Ok(Some(value)),
                None if missing_ok => Ok(None),
                None => Err(ConfigurationError::MissingConstant {
                    name: name.to_string(),
                }),
            },
        }
    }

    /// Like [`Constants::lookup`], converting the value into `T`
    pub fn lookup_as<T: DeserializeOwned>(
        &self,
        name: &str,
        prefix: Option<&str>,
        missing_ok: bool,
    ) -> Result<Option<T>, ConfigurationError> {
        let Some(value) = self.lookup(name, prefix, missing_ok)? else {
            return Ok(None);
        };
        serde_yaml::from_value(value.clone())
            .map(Some)
            .map_err(|e| ConfigurationError::InvalidConstant {
                name: match prefix {
                    Some(p) if !p.is_empty() => format!("{},{}", p, name),
                    _ => name.to_string(),
                },
                reason: e.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Truthiness as the device dictionaries have always been read
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Tagged(tagged) => is_falsy(&tagged.value),
    }
}
