use crate::types::{MessageFormat, Record};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decode statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodeStats {
    pub format_messages: u32,
    pub data_messages: u32,
    /// Data messages dropped by the message filter
    pub filtered_messages: u32,
    /// Bytes skipped while resynchronizing in recover mode
    pub skipped_bytes: u64,
    /// Bytes of an incomplete message at the end of the log
    pub truncated_tail_bytes: u64,
    pub total_bytes: u64,
}

/// Complete decoded log
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedLog {
    /// Message formats in declaration order
    pub formats: Vec<MessageFormat>,
    /// Records in log order
    pub records: Vec<Record>,
    pub stats: DecodeStats,
}

impl DecodedLog {
    /// Check if the log declares a message type
    pub fn declares(&self, message_type: &str) -> bool {
        self.formats.iter().any(|format| format.name == message_type)
    }

    pub fn format(&self, message_type: &str) -> Option<&MessageFormat> {
        self.formats.iter().find(|format| format.name == message_type)
    }

    /// Check if this log contains GPS records
    pub fn has_gps_data(&self) -> bool {
        self.records.iter().any(|record| record.message_type == "GPS")
    }
}
