//! Named connection descriptors and primary-connection selection

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Tag marking the connection to use by default
pub const PRIMARY_TAG: &str = "primary";

/// A single entry under `commands.connections`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Command that opens the connection (e.g. `telnet localhost 7000`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<String>,
    /// Free-form tags; `primary` selects the default connection
    #[serde(
        default,
        deserialize_with = "deserialize_tags",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<BTreeSet<String>>,
}

impl Connection {
    pub fn new(connect: impl Into<String>) -> Self {
        Self {
            connect: Some(connect.into()),
            tags: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(BTreeSet::new).insert(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.contains(tag))
    }

    pub fn is_primary(&self) -> bool {
        self.has_tag(PRIMARY_TAG)
    }
}

/// Accept tags written as a sequence, a set (`!!set {primary: null}`, i.e.
/// a mapping whose keys are the tags) or a single string
fn deserialize_tags<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BTreeSet<String>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let mut tags = BTreeSet::new();
    collect_tags(value, &mut tags).map_err(serde::de::Error::custom)?;
    Ok(Some(tags))
}

fn collect_tags(value: Value, tags: &mut BTreeSet<String>) -> Result<(), String> {
    match value {
        Value::Null => {}
        Value::Sequence(items) => {
            for item in items {
                tags.insert(tag_name(item)?);
            }
        }
        Value::Mapping(set) => {
            for (key, _) in set {
                tags.insert(tag_name(key)?);
            }
        }
        Value::Tagged(tagged) => collect_tags(tagged.value, tags)?,
        scalar => {
            tags.insert(tag_name(scalar)?);
        }
    }
    Ok(())
}

fn tag_name(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("invalid connection tag: {:?}", other)),
    }
}

/// Outcome of scanning the connections block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// A primary connection with a connect command was found
    Primary { name: &'a str, connect: &'a str },
    /// Scanning stopped at an entry with no connect command
    Halted { name: &'a str },
    /// No entry is tagged primary
    NoPrimary,
}

/// Connection descriptors in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connections {
    entries: Vec<(String, Connection)>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a connection; a repeated name replaces the earlier entry in place
    pub fn insert(&mut self, name: impl Into<String>, connection: Connection) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = connection,
            None => self.entries.push((name, connection)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Connection> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Connection)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk the entries in order looking for the primary connection.
    ///
    /// The first entry without a `connect` command ends the scan, even if a
    /// later entry would have matched.
    pub fn select(&self) -> Selection<'_> {
        for (name, connection) in &self.entries {
            let Some(connect) = connection.connect.as_deref() else {
                debug!(connection = %name, "Connection has no connect command, giving up");
                return Selection::Halted { name };
            };
            if connection.is_primary() {
                return Selection::Primary { name, connect };
            }
        }
        Selection::NoPrimary
    }

    /// Name and descriptor of the primary connection, if one is selected
    pub fn primary(&self) -> Option<(&str, &Connection)> {
        match self.select() {
            Selection::Primary { name, .. } => self.get(name).map(|c| (name, c)),
            _ => None,
        }
    }
}

impl FromIterator<(String, Connection)> for Connections {
    fn from_iter<I: IntoIterator<Item = (String, Connection)>>(iter: I) -> Self {
        let mut connections = Self::new();
        for (name, connection) in iter {
            connections.insert(name, connection);
        }
        connections
    }
}

impl Serialize for Connections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, connection) in &self.entries {
            map.serialize_entry(name, connection)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Connections {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConnectionsVisitor;

        impl<'de> Visitor<'de> for ConnectionsVisitor {
            type Value = Connections;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of connection names to connection descriptors")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Connections, E> {
                Ok(Connections::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Connections, A::Error> {
                let mut connections = Connections::new();
                while let Some((name, connection)) = access.next_entry::<String, Connection>()? {
                    connections.insert(name, connection);
                }
                Ok(connections)
            }
        }

        deserializer.deserialize_any(ConnectionsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_after_untagged() {
        let connections: Connections = [
            ("uart0".to_string(), Connection::new("telnet localhost 7000")),
            (
                "uart1".to_string(),
                Connection::new("telnet localhost 7001").with_tag(PRIMARY_TAG),
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            connections.select(),
            Selection::Primary {
                name: "uart1",
                connect: "telnet localhost 7001"
            }
        );
        let (name, conn) = connections.primary().unwrap();
        assert_eq!(name, "uart1");
        assert!(conn.is_primary());
    }

    #[test]
    fn test_connect_less_entry_halts_scan() {
        let mut connections = Connections::new();
        connections.insert("broken", Connection::default());
        connections.insert("uart0", Connection::new("cmd").with_tag(PRIMARY_TAG));

        assert_eq!(connections.select(), Selection::Halted { name: "broken" });
        assert!(connections.primary().is_none());
    }

    #[test]
    fn test_null_connect_halts_scan() {
        // an explicit null counts as no connect command
        let yaml = "serial:\n  connect: ~\n  tags: [primary]\nnet:\n  connect: ssh dut\n  tags: [primary]\n";
        let connections: Connections = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(connections.select(), Selection::Halted { name: "serial" });
    }

    #[test]
    fn test_tag_forms() {
        let yaml = r#"
listed:
  connect: a
  tags: [primary, ssh]
set:
  connect: b
  tags: !!set {primary: null}
single:
  connect: c
  tags: primary
untagged:
  connect: d
  tags:
"#;
        let connections: Connections = serde_yaml::from_str(yaml).unwrap();
        for name in ["listed", "set", "single"] {
            assert!(connections.get(name).unwrap().is_primary(), "{}", name);
        }
        assert!(connections.get("listed").unwrap().has_tag("ssh"));
        assert!(!connections.get("untagged").unwrap().is_primary());
    }

    #[test]
    fn test_no_primary() {
        let mut connections = Connections::new();
        connections.insert("uart0", Connection::new("cmd").with_tag("secondary"));
        assert_eq!(connections.select(), Selection::NoPrimary);
        assert_eq!(Connections::new().select(), Selection::NoPrimary);
    }

    #[test]
    fn test_deserialize_keeps_document_order() {
        let yaml = r#"
zeta:
  connect: telnet zeta
beta:
  connect: telnet beta
  tags: [primary]
alpha:
  connect: telnet alpha
  tags: [primary]
"#;
        let connections: Connections = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = connections.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "beta", "alpha"]);
        assert_eq!(connections.primary().unwrap().0, "beta");
    }

    #[test]
    fn test_insert_replaces_duplicate_name() {
        let mut connections = Connections::new();
        connections.insert("uart0", Connection::new("old"));
        connections.insert("uart0", Connection::new("new"));
        assert_eq!(connections.len(), 1);
        assert_eq!(connections.get("uart0").unwrap().connect.as_deref(), Some("new"));
    }
}
