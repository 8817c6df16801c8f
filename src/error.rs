use std::fmt;
use std::path::PathBuf;

/// Error types for decoding and exporting flight logs
#[derive(Debug)]
pub enum ExportError {
    /// I/O errors while reading input
    Io(std::io::Error),
    /// End of data reached in the middle of a field
    UnexpectedEof,
    /// Binary log content that cannot be decoded
    Decode { offset: usize, reason: String },
    /// `GPS_Week` or `GPS_TimeMS` is not an integer on a track-bearing row
    MalformedTimestamp { label: String, value: String },
    /// A GPS coordinate, HDOP or speed value is not numeric
    MalformedField { label: String, value: String },
    /// A value has no single-line string rendering
    UnrenderableValue { label: String, value: String },
    /// The output destination cannot be opened or written
    SinkUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid export configuration
    Config(String),
    /// CSV writer errors
    Csv(csv::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "I/O error: {}", err),
            ExportError::UnexpectedEof => write!(f, "Unexpected end of log data"),
            ExportError::Decode { offset, reason } => {
                write!(f, "Decode error at {} (0x{:X}): {}", offset, offset, reason)
            }
            ExportError::MalformedTimestamp { label, value } => {
                write!(f, "Malformed timestamp: {} = '{}' is not an integer", label, value)
            }
            ExportError::MalformedField { label, value } => {
                write!(f, "Malformed field: {} = '{}' is not numeric", label, value)
            }
            ExportError::UnrenderableValue { label, value } => {
                write!(f, "Unrenderable value in {}: {:?}", label, value)
            }
            ExportError::SinkUnavailable { path, source } => {
                write!(f, "Cannot write output {}: {}", path.display(), source)
            }
            ExportError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ExportError::Csv(err) => write!(f, "CSV error: {}", err),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::SinkUnavailable { source, .. } => Some(source),
            ExportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err)
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
