use crate::error::Result;
use crate::filters::MessageFilter;
use crate::parser::decoder::LogDecoder;
use crate::types::DecodedLog;
use std::path::Path;
use tracing::debug;

/// Parse a binary log file
pub fn parse_log_file(file_path: &Path, filter: &MessageFilter, recover: bool) -> Result<DecodedLog> {
    let file_data = std::fs::read(file_path)?;
    debug!(
        "Parsing {} ({} bytes, {:.2} MB)",
        file_path.display(),
        file_data.len(),
        file_data.len() as f64 / 1024.0 / 1024.0
    );

    parse_log_bytes(&file_data, filter, recover)
}

/// Parse binary log data from memory
pub fn parse_log_bytes(data: &[u8], filter: &MessageFilter, recover: bool) -> Result<DecodedLog> {
    LogDecoder::new(filter.clone(), recover).decode(data)
}
