//! Crew definition documents: agents and tasks as stored in YAML.
//!
//! A crew directory holds `agents.yaml` (agent key → role/goal/backstory)
//! and `tasks.yaml` (task key → description/expected output). Both are
//! [`Roster`]s, which keep the document order so "the first agent" always
//! means the first entry written.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One synthetic persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

/// One unit of work for the crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub description: String,
    pub expected_output: String,
}

/// Ordered mapping from entry key to definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster<T> {
    entries: Vec<(String, T)>,
}

/// Agents of a crew, in document order.
pub type AgentRoster = Roster<AgentDefinition>;

/// Tasks of a crew, in document order.
pub type TaskRoster = Roster<TaskDefinition>;

impl<T> Default for Roster<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Roster<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, replacing the value if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Build a roster from a sequence, keying entries `{prefix}1`, `{prefix}2`, ...
    pub fn from_sequence(prefix: &str, values: impl IntoIterator<Item = T>) -> Self {
        Self {
            entries: values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("{}{}", prefix, i + 1), v))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<(&str, &T)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<T: Clone> Roster<T> {
    /// Definitions without their keys, in order.
    pub fn to_vec(&self) -> Vec<T> {
        self.values().cloned().collect()
    }
}

impl<T: Serialize> Serialize for Roster<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Roster<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RosterVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for RosterVisitor<T> {
            type Value = Roster<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of keys to definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut roster = Roster::new();
                while let Some((key, value)) = access.next_entry::<serde_yaml::Value, T>()? {
                    let key = scalar_key(key).ok_or_else(|| {
                        <A::Error as serde::de::Error>::custom(
                            "roster keys must be strings, numbers or booleans",
                        )
                    })?;
                    roster.insert(key, value);
                }
                Ok(roster)
            }

            // An empty YAML document deserializes as unit.
            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Roster::new())
            }
        }

        deserializer.deserialize_any(RosterVisitor(PhantomData))
    }
}

/// Text form of a scalar mapping key; `1:` and `"1":` name the same entry.
fn scalar_key(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
