//! sdlog dump library
//!
//! A Rust library for decoding PX4 sdlog2 / APM DataFlash binary flight logs
//! and exporting their messages as delimited tables or GPS tracks.
//!
//! # Features
//!
//! - **`cli`** (default): Build the command-line interface binary
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! Decode a log file and inspect its records:
//! ```rust,no_run
//! use sdlog_dump::{parse_log_file, MessageFilter};
//! use std::path::Path;
//!
//! let log = parse_log_file(Path::new("flight.bin"), &MessageFilter::new(), false).unwrap();
//! println!("Decoded {} records", log.records.len());
//! ```
//!
//! Export only attitude and GPS position to CSV:
//! ```rust,no_run
//! use sdlog_dump::{export_file, ExportOptions, MessageFilter};
//! use std::path::{Path, PathBuf};
//!
//! let options = ExportOptions {
//!     message_filter: MessageFilter::parse(["ATT", "GPS.TimeMS,Lat,Lng"]).unwrap(),
//!     output_file: Some(PathBuf::from("flight.csv")),
//!     ..Default::default()
//! };
//! let report = export_file(Path::new("flight.bin"), &options).unwrap();
//! println!("Wrote {} rows in {} columns", report.rows, report.columns);
//! ```
//!
//! # Public API
//!
//! ## Decoding
//! - [`parse_log_file`] / [`parse_log_bytes`] - Decode a log into [`DecodedLog`]
//! - [`LogDecoder`] - Decoder with message filter and recover mode
//!
//! ## Export pipeline
//! - [`MessageFilter`] - Restrict message types and fields
//! - [`build_rows`] - Group records into [`Row`]s
//! - [`ColumnSet`] - Column order and `GLOBAL_TimeMS` resolution
//! - [`RowProjector`] - Render a row against the column set
//! - [`TableExporter`] / [`write_table`] - Delimited output
//! - [`TrackExporter`] / [`write_gpx`] - GPX output
//! - [`export_log`] / [`export_file`] - Run a whole export

pub mod columns;
pub mod error;
pub mod export;
pub mod filters;
pub mod parser;
pub mod projection;
pub mod rows;
pub mod types;

// Re-export everything from modules for convenience
pub use columns::*;
pub use error::{ExportError, Result};
#[allow(ambiguous_glob_reexports)]
pub use export::*;
pub use filters::*;
#[allow(ambiguous_glob_reexports)]
pub use parser::*;
pub use projection::*;
pub use rows::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;
