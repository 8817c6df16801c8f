//! Export functionality for decoded logs
//!
//! Contains the export configuration and the drivers that take a decoded log
//! through row slicing, column resolution and projection into CSV or GPX.

pub mod table;
pub mod track;

pub use table::*;
pub use track::*;

use crate::columns::ColumnSet;
use crate::error::{ExportError, Result};
use crate::filters::MessageFilter;
use crate::parser::parse_log_file;
use crate::rows::{build_rows, SlicePolicy};
use crate::types::{DecodedLog, Record};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Output format of an export run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Gpx,
    /// Decode only
    None,
}

impl OutputFormat {
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Csv => Some("csv"),
            OutputFormat::Gpx => Some("gpx"),
            OutputFormat::None => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "gpx" => Ok(OutputFormat::Gpx),
            "none" => Ok(OutputFormat::None),
            other => Err(ExportError::Config(format!(
                "unknown output format '{other}' (expected csv, gpx or none)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Gpx => "gpx",
            OutputFormat::None => "none",
        };
        f.write_str(name)
    }
}

/// Export options for controlling decoding and output
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: OutputFormat,
    /// CSV field separator, a single ASCII character
    pub delimiter: String,
    /// Written in place of values missing from a row
    pub null_placeholder: String,
    pub message_filter: MessageFilter,
    pub slice: SlicePolicy,
    /// Resynchronize on corrupt data instead of failing
    pub recover: bool,
    /// Dump decoded records as plain text instead of exporting
    pub verbose: bool,
    /// Write to this file instead of stdout
    pub output_file: Option<PathBuf>,
    /// Write `<input stem>.<ext>` into this directory instead of stdout
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            delimiter: ",".to_string(),
            null_placeholder: String::new(),
            message_filter: MessageFilter::new(),
            slice: SlicePolicy::Auto,
            recover: false,
            verbose: false,
            output_file: None,
            output_dir: None,
        }
    }
}

impl ExportOptions {
    /// Validate the delimiter and return it as the byte the CSV writer needs
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b'"' | b'\n' | b'\r'] => Err(ExportError::Config(format!(
                "delimiter {:?} would break the table layout",
                self.delimiter
            ))),
            [byte] => Ok(*byte),
            _ => Err(ExportError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.output_file.is_some() && self.output_dir.is_some() {
            return Err(ExportError::Config(
                "output file and output directory are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }

    /// Extension of the produced output, `None` when nothing is written
    fn output_extension(&self) -> Option<&'static str> {
        if self.verbose {
            Some("txt")
        } else {
            self.format.extension()
        }
    }
}

/// Results of an export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub format: OutputFormat,
    pub records: usize,
    pub rows: usize,
    pub columns: usize,
    pub track_points: usize,
    /// Path written, `None` for stdout or when nothing was written
    pub output: Option<PathBuf>,
}

/// Compute where the output for an input file goes. `None` means stdout.
pub fn compute_output_path(input_path: &Path, options: &ExportOptions) -> Option<PathBuf> {
    if let Some(path) = &options.output_file {
        return Some(path.clone());
    }
    let dir = options.output_dir.as_ref()?;
    let extension = options.output_extension()?;
    let base_name = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("log");
    Some(dir.join(format!("{base_name}.{extension}")))
}

/// Name used for the GPX track
fn track_name(input_path: &Path) -> String {
    input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Flight log")
        .to_string()
}

/// Export a decoded log into a sink. The report's `output` is left empty.
pub fn export_log<W: Write>(
    log: &DecodedLog,
    options: &ExportOptions,
    sink: W,
    track_name: &str,
) -> Result<ExportReport> {
    let mut report = ExportReport {
        format: options.format,
        records: log.records.len(),
        ..Default::default()
    };

    if options.verbose {
        report.rows = write_record_dump(sink, &log.records)?;
        return Ok(report);
    }

    let rows = build_rows(log, &options.slice);
    report.rows = rows.len();

    match options.format {
        OutputFormat::Csv => {
            let delimiter = options.delimiter_byte()?;
            let columns = ColumnSet::from_rows(&rows);
            report.columns = columns.len();
            write_table(sink, &columns, &rows, delimiter, &options.null_placeholder)?;
        }
        OutputFormat::Gpx => {
            let points = build_track(&rows)?;
            report.track_points = write_gpx(sink, &points, track_name)?;
        }
        OutputFormat::None => {
            debug!("Output format 'none', nothing written");
        }
    }

    Ok(report)
}

/// Write decoded records as plain text, one `MSG <type>: label=value, ...` line each
pub fn write_record_dump<W: Write>(mut sink: W, records: &[Record]) -> Result<usize> {
    for record in records {
        let fields: Vec<String> = record
            .fields
            .iter()
            .map(|(label, value)| format!("{label}={value}"))
            .collect();
        writeln!(sink, "MSG {}: {}", record.message_type, fields.join(", "))?;
    }
    sink.flush()?;
    Ok(records.len())
}

fn sink_error(err: ExportError, path: &Path) -> ExportError {
    match err {
        ExportError::Io(source) => ExportError::SinkUnavailable {
            path: path.to_path_buf(),
            source,
        },
        ExportError::Csv(err) if err.is_io_error() => {
            let source = match err.into_kind() {
                csv::ErrorKind::Io(source) => source,
                kind => std::io::Error::new(std::io::ErrorKind::Other, format!("{kind:?}")),
            };
            ExportError::SinkUnavailable {
                path: path.to_path_buf(),
                source,
            }
        }
        other => other,
    }
}

/// Open a file sink, creating its directory when missing
fn open_file_sink(path: &Path) -> Result<BufWriter<File>> {
    let unavailable = |source| ExportError::SinkUnavailable {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(unavailable)?;
            debug!("Created output directory: {}", parent.display());
        }
    }

    let file = File::create(path).map_err(unavailable)?;
    Ok(BufWriter::new(file))
}

/// Decode one log file and export it according to the options
pub fn export_file(input_path: &Path, options: &ExportOptions) -> Result<ExportReport> {
    options.validate()?;

    let log = parse_log_file(input_path, &options.message_filter, options.recover)?;
    info!(
        "Decoded {} records ({} message formats) from {}",
        log.records.len(),
        log.formats.len(),
        input_path.display()
    );

    let writes_output = options.verbose || options.format != OutputFormat::None;
    if !writes_output {
        return export_log(&log, options, std::io::sink(), "");
    }

    let name = track_name(input_path);
    match compute_output_path(input_path, options) {
        Some(path) => {
            // The file is closed when the writer drops, on success and on error
            let sink = open_file_sink(&path)?;
            let mut report =
                export_log(&log, options, sink, &name).map_err(|err| sink_error(err, &path))?;
            info!("Exported {} to: {}", options.format, path.display());
            report.output = Some(path);
            Ok(report)
        }
        None => {
            let stdout = std::io::stdout();
            let sink = BufWriter::new(stdout.lock());
            export_log(&log, options, sink, &name)
                .map_err(|err| sink_error(err, Path::new("<stdout>")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn sample_log() -> DecodedLog {
        DecodedLog {
            records: vec![
                Record::new("ATT")
                    .with_field("TimeMS", 1000i64)
                    .with_field("Roll", 0.5),
                Record::new("GPS")
                    .with_field("TimeMS", 3_600_000i64)
                    .with_field("Week", 2000i64)
                    .with_field("Lat", 47.6)
                    .with_field("Lng", -122.3)
                    .with_field("Alt", 10.0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("GPX".parse::<OutputFormat>().unwrap(), OutputFormat::Gpx);
        assert_eq!("none".parse::<OutputFormat>().unwrap(), OutputFormat::None);
        assert!("kml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert_eq!(options.format, OutputFormat::Csv);
        assert_eq!(options.delimiter_byte().unwrap(), b',');
        assert_eq!(options.null_placeholder, "");
        assert!(options.message_filter.is_empty());
    }

    #[test]
    fn test_delimiter_validation() {
        let mut options = ExportOptions {
            delimiter: ";".to_string(),
            ..Default::default()
        };
        assert_eq!(options.delimiter_byte().unwrap(), b';');

        options.delimiter = "::".to_string();
        assert!(options.delimiter_byte().is_err());

        options.delimiter = String::new();
        assert!(options.delimiter_byte().is_err());

        options.delimiter = "\"".to_string();
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("/logs/flight1.bin");
        let options = ExportOptions::default();
        assert_eq!(compute_output_path(input, &options), None);

        let options = ExportOptions {
            output_dir: Some(PathBuf::from("/out")),
            format: OutputFormat::Gpx,
            ..Default::default()
        };
        assert_eq!(
            compute_output_path(input, &options),
            Some(PathBuf::from("/out/flight1.gpx"))
        );

        let options = ExportOptions {
            output_file: Some(PathBuf::from("/tmp/track.csv")),
            ..Default::default()
        };
        assert_eq!(
            compute_output_path(input, &options),
            Some(PathBuf::from("/tmp/track.csv"))
        );
    }

    #[test]
    fn test_export_log_csv() {
        let mut out = Vec::new();
        let report = export_log(&sample_log(), &ExportOptions::default(), &mut out, "t").unwrap();
        let csv = String::from_utf8(out).unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.columns, 8);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "GLOBAL_TimeMS,ATT_TimeMS,ATT_Roll,GPS_TimeMS,GPS_Week,GPS_Lat,GPS_Lng,GPS_Alt"
        );
        assert_eq!(lines[1], "1000,1000,0.5,,,,,");
        assert_eq!(lines[2], ",,,3600000,2000,47.6,-122.3,10.0");
    }

    #[test]
    fn test_export_log_gpx() {
        let options = ExportOptions {
            format: OutputFormat::Gpx,
            ..Default::default()
        };
        let mut out = Vec::new();
        let report = export_log(&sample_log(), &options, &mut out, "t").unwrap();

        assert_eq!(report.track_points, 1);
        assert_eq!(String::from_utf8(out).unwrap().matches("<trkpt").count(), 1);
    }

    #[test]
    fn test_verbose_dump() {
        let options = ExportOptions {
            verbose: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        export_log(&sample_log(), &options, &mut out, "t").unwrap();
        let dump = String::from_utf8(out).unwrap();

        assert_eq!(dump.lines().next(), Some("MSG ATT: TimeMS=1000, Roll=0.5"));
    }

    #[test]
    fn test_sink_error_mapping() {
        let err = sink_error(
            ExportError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")),
            Path::new("out.csv"),
        );
        assert!(matches!(err, ExportError::SinkUnavailable { .. }));

        let err = sink_error(
            ExportError::MalformedTimestamp {
                label: "GPS_Week".to_string(),
                value: Value::Float(1.5).to_string(),
            },
            Path::new("out.gpx"),
        );
        assert!(matches!(err, ExportError::MalformedTimestamp { .. }));
    }
}
