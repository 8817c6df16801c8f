//! Column derivation and global time resolution
//!
//! The column set is computed in a separate pass before any row is projected,
//! so the header and every data row share one fixed order.

use crate::types::{Row, Value, GLOBAL_TIME_LABEL};
use std::collections::HashSet;

/// Marker for fields that hold time since boot in milliseconds
const TIME_MS_MARKER: &str = "TimeMS";
/// GPS time of week, which is not time since boot
const GPS_TIME_LABEL: &str = "GPS_TimeMS";

/// Ordered, duplicate-free set of output column labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    labels: Vec<String>,
    seen: HashSet<String>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the columns of an export run.
    ///
    /// Labels appear in first-seen order from one scan over the rows in log
    /// order. `GLOBAL_TimeMS` is included, as the first column, when at least
    /// one row resolves a value for it.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut scanned = ColumnSet::new();
        for row in rows {
            for label in row.labels() {
                if label != GLOBAL_TIME_LABEL {
                    scanned.push(label);
                }
            }
        }

        // Every scanned label came from some row, so a candidate label means
        // at least one row resolves a value
        let has_global_time = scanned.has_time_candidates()
            || rows.iter().any(|row| row.contains(GLOBAL_TIME_LABEL));

        if !has_global_time {
            return scanned;
        }

        let mut columns = ColumnSet::new();
        columns.push(GLOBAL_TIME_LABEL);
        for label in scanned.labels {
            columns.push(&label);
        }
        columns
    }

    /// Append a label unless it is already present
    pub fn push(&mut self, label: &str) -> bool {
        if self.seen.contains(label) {
            return false;
        }
        self.seen.insert(label.to_string());
        self.labels.push(label.to_string());
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.seen.contains(label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn has_time_candidates(&self) -> bool {
        self.labels.iter().any(|label| is_time_candidate(label))
    }

    /// Resolve the `GLOBAL_TimeMS` value of a row.
    ///
    /// A direct `GLOBAL_TimeMS` value always wins. Otherwise the first label
    /// in column order that contains `TimeMS`, is not `GPS_TimeMS` and has a
    /// value in the row is used. Returns `None` when nothing matches.
    pub fn resolve_global_time<'r>(&self, row: &'r Row) -> Option<&'r Value> {
        if let Some(value) = row.get(GLOBAL_TIME_LABEL) {
            return Some(value);
        }

        self.labels
            .iter()
            .filter(|label| is_time_candidate(label))
            .find_map(|label| row.get(label))
    }
}

fn is_time_candidate(label: &str) -> bool {
    label != GLOBAL_TIME_LABEL && label != GPS_TIME_LABEL && label.contains(TIME_MS_MARKER)
}
