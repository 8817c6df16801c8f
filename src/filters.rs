//! Message filtering
//!
//! Restricts which message types and fields contribute to the export. The
//! filter is applied while decoding, so it decides which full labels can ever
//! show up as columns.
//!
//! # Usage
//!
//! Filter specs come from the command line as `MSG` (all fields of `MSG`) or
//! `MSG.field1,field2` (only the named fields). An empty filter passes
//! everything.

use crate::error::{ExportError, Result};
use crate::types::Record;
use std::str::FromStr;

/// Field selection for one message type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    /// `*`: every field of the message
    All,
    Named(Vec<String>),
}

impl FieldSelection {
    pub fn allows(&self, field: &str) -> bool {
        match self {
            FieldSelection::All => true,
            FieldSelection::Named(names) => names.iter().any(|name| name == field),
        }
    }
}

/// One `(message type, fields)` filter entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub message_type: String,
    pub fields: FieldSelection,
}

impl FilterSpec {
    pub fn all_fields(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            fields: FieldSelection::All,
        }
    }

    pub fn named_fields<I, S>(message_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            message_type: message_type.into(),
            fields: FieldSelection::Named(fields.into_iter().map(Into::into).collect()),
        }
    }
}

impl FromStr for FilterSpec {
    type Err = ExportError;

    /// Parse `MSG` or `MSG.field1,field2`
    fn from_str(spec: &str) -> Result<Self> {
        let (message_type, fields) = match spec.split_once('.') {
            Some((message_type, fields)) => {
                let names: Vec<String> = fields
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
                let selection = if names.iter().any(|name| name == "*") {
                    FieldSelection::All
                } else {
                    FieldSelection::Named(names)
                };
                (message_type.trim(), selection)
            }
            None => (spec.trim(), FieldSelection::All),
        };

        if message_type.is_empty() {
            return Err(ExportError::Config(format!(
                "invalid message filter '{spec}': missing message name"
            )));
        }

        Ok(Self {
            message_type: message_type.to_string(),
            fields,
        })
    }
}

/// Predicate over (message type, field name)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    specs: Vec<FilterSpec>,
}

impl MessageFilter {
    /// Filter that passes every message and field
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: Vec<FilterSpec>) -> Self {
        Self { specs }
    }

    /// Parse a list of textual filter specs
    pub fn parse<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let specs = specs
            .into_iter()
            .map(|spec| spec.as_ref().parse())
            .collect::<Result<Vec<FilterSpec>>>()?;
        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Check if any field of a message type can pass
    pub fn allows_message(&self, message_type: &str) -> bool {
        self.is_empty()
            || self
                .specs
                .iter()
                .any(|spec| spec.message_type == message_type)
    }

    /// Check if a field of a message type passes. Entries for the same
    /// message type combine as a union.
    pub fn allows_field(&self, message_type: &str, field: &str) -> bool {
        self.is_empty()
            || self
                .specs
                .iter()
                .filter(|spec| spec.message_type == message_type)
                .any(|spec| spec.fields.allows(field))
    }

    /// Restrict a record to the passing fields.
    ///
    /// Returns `None` when the message type does not pass at all.
    pub fn apply(&self, record: Record) -> Option<Record> {
        if self.is_empty() {
            return Some(record);
        }
        if !self.allows_message(&record.message_type) {
            return None;
        }

        let Record {
            message_type,
            fields,
        } = record;
        let fields = fields
            .into_iter()
            .filter(|(field, _)| self.allows_field(&message_type, field))
            .collect();
        Some(Record {
            message_type,
            fields,
        })
    }
}
