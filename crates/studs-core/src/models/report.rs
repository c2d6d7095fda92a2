//! Stud extraction report returned to callers.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Beam label → linked count values, in link order.
///
/// Keys keep first-link order and serialize as a JSON object in that order.
/// Repeated callouts of the same label append to one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileMap {
    entries: Vec<(String, Vec<u32>)>,
}

impl ProfileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to a label's profile, creating it on first use.
    pub fn push(&mut self, label: &str, value: u32) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((label.to_string(), vec![value])),
        }
    }

    /// Values linked to a label.
    pub fn get(&self, label: &str) -> Option<&[u32]> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ProfileMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, values) in &self.entries {
            map.serialize_entry(label, values)?;
        }
        map.end()
    }
}

struct ProfileMapVisitor;

impl<'de> Visitor<'de> for ProfileMapVisitor {
    type Value = ProfileMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of beam labels to stud counts")
    }

    // Entries are taken in document order; a repeated label appends.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = ProfileMap::new();
        while let Some((label, values)) = access.next_entry::<String, Vec<u32>>()? {
            match map.entries.iter_mut().find(|(l, _)| *l == label) {
                Some((_, existing)) => existing.extend(values),
                None => map.entries.push((label, values)),
            }
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for ProfileMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ProfileMapVisitor)
    }
}

/// Aggregated stud counts for one region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudReport {
    /// Every linked count value, in link order.
    pub studs: Vec<u32>,

    /// Linked values grouped by beam label.
    pub profiles: ProfileMap,

    /// Number of linked values.
    pub studs_count: usize,

    /// Sum of linked values.
    pub studs_total: u32,
}

impl StudReport {
    /// Create an empty report.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record one linked value.
    pub fn record(&mut self, label: &str, value: u32) {
        self.studs.push(value);
        self.profiles.push(label, value);
        self.studs_count += 1;
        self.studs_total = self.studs_total.saturating_add(value);
    }
}
