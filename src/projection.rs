//! Row projection
//!
//! Converts a sparse row into one rendered cell per column.

use crate::columns::ColumnSet;
use crate::error::Result;
use crate::types::{Row, GLOBAL_TIME_LABEL};

/// Projects rows against a fixed column set
#[derive(Debug, Clone, Copy)]
pub struct RowProjector<'a> {
    columns: &'a ColumnSet,
    null_placeholder: &'a str,
}

impl<'a> RowProjector<'a> {
    pub fn new(columns: &'a ColumnSet, null_placeholder: &'a str) -> Self {
        Self {
            columns,
            null_placeholder,
        }
    }

    /// Render one row, one string per column in column order.
    ///
    /// Missing values become the null placeholder. The `GLOBAL_TimeMS` cell
    /// takes the resolved global time rather than a plain lookup.
    pub fn project(&self, row: &Row) -> Result<Vec<String>> {
        self.columns
            .labels()
            .iter()
            .map(|label| {
                let value = if label == GLOBAL_TIME_LABEL {
                    self.columns.resolve_global_time(row)
                } else {
                    row.get(label)
                };
                match value {
                    Some(value) => value.render(label),
                    None => Ok(self.null_placeholder.to_string()),
                }
            })
            .collect()
    }
}
