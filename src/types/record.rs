use crate::types::value::Value;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Synthetic column holding time since boot regardless of message type
pub const GLOBAL_TIME_LABEL: &str = "GLOBAL_TimeMS";

/// Qualify a field name with its message type, e.g. `GPS` + `Lat` -> `GPS_Lat`
pub fn full_label(message_type: &str, field: &str) -> String {
    format!("{message_type}_{field}")
}

/// One decoded log message
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    pub message_type: String,
    /// Field values in message format order
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field append, mostly useful for constructing test data
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Iterate over `(full label, value)` pairs
    pub fn qualified_fields(&self) -> impl Iterator<Item = (String, &Value)> + '_ {
        self.fields
            .iter()
            .map(|(field, value)| (full_label(&self.message_type, field), value))
    }
}

/// Sparse mapping from full label to value, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row holding exactly the qualified fields of one record
    pub fn from_record(record: &Record) -> Self {
        let mut row = Row::new();
        for (label, value) in record.qualified_fields() {
            row.insert(label, value.clone());
        }
        row
    }

    /// Set a cell. An existing label keeps its position and takes the new value.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<Value>) {
        let label = label.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((label, value)),
        }
    }

    pub fn with(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(label, value);
        self
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(label, _)| label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(label, value)| (label.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
