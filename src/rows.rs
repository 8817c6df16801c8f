//! Row slicing
//!
//! Turns the decoded record stream into exportable rows. Logs without a time
//! message get one row per record. Logs with one (PX4 `TIME`) get one row per
//! time slice, carrying the latest value of every field seen so far.

use crate::types::{full_label, DecodedLog, Record, Row};

/// Message type that marks time slices in PX4 logs
pub const DEFAULT_TIME_MESSAGE: &str = "TIME";

/// How records are grouped into rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlicePolicy {
    /// Time slices when the log declares a `TIME` message, otherwise one row per record
    #[default]
    Auto,
    PerRecord,
    TimeMessage(String),
}

impl SlicePolicy {
    /// Resolve `Auto` against the formats declared in a log
    pub fn resolve(&self, log: &DecodedLog) -> SlicePolicy {
        match self {
            SlicePolicy::Auto if log.declares(DEFAULT_TIME_MESSAGE) => {
                SlicePolicy::TimeMessage(DEFAULT_TIME_MESSAGE.to_string())
            }
            SlicePolicy::Auto => SlicePolicy::PerRecord,
            other => other.clone(),
        }
    }
}

/// Build rows from a decoded log
pub fn build_rows(log: &DecodedLog, policy: &SlicePolicy) -> Vec<Row> {
    match policy.resolve(log) {
        SlicePolicy::TimeMessage(time_message) => slice_by_time_message(&log.records, &time_message),
        _ => log.records.iter().map(Row::from_record).collect(),
    }
}

/// Accumulate the latest field values and emit a snapshot each time the time
/// message arrives after other messages have updated the state.
pub fn slice_by_time_message(records: &[Record], time_message: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut latest = Row::new();
    let mut updated = false;

    for record in records {
        let is_time = record.message_type == time_message;
        if is_time && updated {
            rows.push(latest.clone());
            updated = false;
        }

        for (field, value) in &record.fields {
            latest.insert(full_label(&record.message_type, field), value.clone());
            if !is_time {
                updated = true;
            }
        }
    }

    if updated {
        rows.push(latest);
    }

    rows
}
