//! Delimited table output
//!
//! Lines are formatted by the `csv` writer with `QuoteStyle::Necessary`: plain
//! telemetry values come out exactly as joined text, while a value holding
//! the delimiter or a quote is quoted instead of corrupting the column layout.

use crate::columns::ColumnSet;
use crate::error::Result;
use crate::projection::RowProjector;
use crate::types::Row;
use std::io::Write;
use tracing::warn;

/// Writes a header line and one line per projected row
pub struct TableExporter<W: Write> {
    sink: W,
    builder: csv::WriterBuilder,
    line: Vec<u8>,
    rows_written: usize,
}

impl<W: Write> TableExporter<W> {
    pub fn new(sink: W, delimiter: u8) -> Self {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(delimiter)
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .buffer_capacity(1024);
        Self {
            sink,
            builder,
            line: Vec::new(),
            rows_written: 0,
        }
    }

    fn write_line<T: AsRef<[u8]>>(&mut self, cells: &[T]) -> Result<()> {
        // csv writes a lone empty field as `""`, an empty cell here is a bare line
        if let [cell] = cells {
            if cell.as_ref().is_empty() {
                self.sink.write_all(b"\n")?;
                return Ok(());
            }
        }

        self.line.clear();
        let mut writer = self.builder.from_writer(&mut self.line);
        writer.write_record(cells)?;
        writer.flush()?;
        drop(writer);
        self.sink.write_all(&self.line)?;
        Ok(())
    }

    pub fn write_header(&mut self, columns: &ColumnSet) -> Result<()> {
        self.write_line(columns.labels())
    }

    /// Write one projected row, cells in column order
    pub fn write_row(&mut self, cells: &[String]) -> Result<()> {
        self.write_line(cells)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush buffered output
    pub fn finish(mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}

/// Write a full table: header from `columns`, then every row in order
pub fn write_table<W: Write>(
    sink: W,
    columns: &ColumnSet,
    rows: &[Row],
    delimiter: u8,
    null_placeholder: &str,
) -> Result<usize> {
    let mut exporter = TableExporter::new(sink, delimiter);

    if columns.is_empty() {
        warn!("No columns to export, skipping {} rows", rows.len());
        exporter.finish()?;
        return Ok(0);
    }

    exporter.write_header(columns)?;
    let projector = RowProjector::new(columns, null_placeholder);
    for row in rows {
        let cells = projector.project(row)?;
        exporter.write_row(&cells)?;
    }

    let rows_written = exporter.rows_written();
    exporter.finish()?;
    Ok(rows_written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[Row], delimiter: u8, null_placeholder: &str) -> String {
        let columns = ColumnSet::from_rows(rows);
        let mut out = Vec::new();
        write_table(&mut out, &columns, rows, delimiter, null_placeholder).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_sparse_rows() {
        let rows = vec![
            Row::new().with("A_X", 1i64).with("A_Y", 2i64),
            Row::new().with("A_X", 3i64),
        ];
        assert_eq!(table(&rows, b',', ""), "A_X,A_Y\n1,2\n3,\n");
    }

    #[test]
    fn test_custom_delimiter_and_placeholder() {
        let rows = vec![
            Row::new().with("A_X", 1i64),
            Row::new().with("A_Y", 2.5),
        ];
        assert_eq!(table(&rows, b';', "NA"), "A_X;A_Y\n1;NA\nNA;2.5\n");
    }

    #[test]
    fn test_value_with_delimiter_is_quoted() {
        let rows = vec![Row::new().with("MODE_Name", "AUTO,RTL").with("MODE_Num", 6i64)];
        assert_eq!(table(&rows, b',', ""), "MODE_Name,MODE_Num\n\"AUTO,RTL\",6\n");
    }

    #[test]
    fn test_single_column_missing_value_is_empty_line() {
        let rows = vec![Row::new().with("A_X", 1i64), Row::new(), Row::new().with("A_X", 2i64)];
        assert_eq!(table(&rows, b',', ""), "A_X\n1\n\n2\n");
        assert_eq!(table(&rows, b',', "NA"), "A_X\n1\nNA\n2\n");
    }

    #[test]
    fn test_single_column_after_emptied_record() {
        use crate::filters::MessageFilter;
        use crate::types::Record;

        let filter = MessageFilter::parse(["GPS.Lat", "ATT.Nope"]).unwrap();
        let rows: Vec<Row> = [
            Record::new("GPS").with_field("Lat", 47.6).with_field("Lng", -122.3),
            Record::new("ATT").with_field("Roll", 0.5),
        ]
        .into_iter()
        .filter_map(|record| filter.apply(record))
        .map(|record| Row::from_record(&record))
        .collect();

        assert_eq!(table(&rows, b',', ""), "GPS_Lat\n47.6\n\n");
    }

    #[test]
    fn test_no_columns_writes_nothing() {
        let rows = vec![Row::new(), Row::new()];
        assert_eq!(table(&rows, b',', ""), "");
    }
}
