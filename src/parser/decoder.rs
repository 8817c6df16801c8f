use crate::error::{ExportError, Result};
use crate::filters::MessageFilter;
use crate::parser::format::{
    decode_field_value, parse_format_message, MSG_FORMAT_PACKET_LEN, MSG_HEAD1, MSG_HEAD2,
    MSG_HEADER_LEN, MSG_TYPE_FORMAT,
};
use crate::parser::stream::LogDataStream;
use crate::types::{DecodedLog, MessageFormat, Record};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Decoder for sdlog2 / DataFlash binary logs
#[derive(Debug, Clone, Default)]
pub struct LogDecoder {
    filter: MessageFilter,
    recover: bool,
}

impl LogDecoder {
    pub fn new(filter: MessageFilter, recover: bool) -> Self {
        Self { filter, recover }
    }

    /// Decode a complete log held in memory
    pub fn decode(&self, data: &[u8]) -> Result<DecodedLog> {
        let mut stream = LogDataStream::new(data);
        let mut formats: HashMap<u8, MessageFormat> = HashMap::new();
        let mut log = DecodedLog::default();
        log.stats.total_bytes = data.len() as u64;

        while stream.remaining() >= MSG_HEADER_LEN {
            let offset = stream.pos;
            let (head1, head2, msg_type) = match (stream.peek(0), stream.peek(1), stream.peek(2)) {
                (Some(a), Some(b), Some(c)) => (a, b, c),
                _ => break,
            };

            if head1 != MSG_HEAD1 || head2 != MSG_HEAD2 {
                self.resync(&mut stream, &mut log, || ExportError::Decode {
                    offset,
                    reason: format!(
                        "invalid header {:02X} {:02X}, must be {:02X} {:02X}",
                        head1, head2, MSG_HEAD1, MSG_HEAD2
                    ),
                })?;
                continue;
            }

            if msg_type == MSG_TYPE_FORMAT {
                if stream.remaining() < MSG_FORMAT_PACKET_LEN {
                    break;
                }
                stream.skip(MSG_HEADER_LEN)?;
                match parse_format_message(&mut stream, offset) {
                    Ok(format) => {
                        debug!(
                            "FORMAT: type={}, length={}, name={}, format={}, labels={}",
                            format.type_id,
                            format.length,
                            format.name,
                            format.format,
                            format.labels.join(",")
                        );
                        log.stats.format_messages += 1;
                        stream.set_position(offset + MSG_FORMAT_PACKET_LEN);
                        self.register_format(&mut formats, &mut log, format);
                    }
                    Err(err) if self.recover => {
                        warn!("Skipping bad format message: {}", err);
                        stream.set_position(offset);
                        self.resync(&mut stream, &mut log, || err)?;
                    }
                    Err(err) => return Err(err),
                }
                continue;
            }

            let Some(format) = formats.get(&msg_type) else {
                self.resync(&mut stream, &mut log, || ExportError::Decode {
                    offset,
                    reason: format!("unknown message type {}", msg_type),
                })?;
                continue;
            };

            if stream.remaining() < format.length {
                break;
            }

            stream.skip(MSG_HEADER_LEN)?;
            log.stats.data_messages += 1;

            if !self.filter.allows_message(&format.name) {
                log.stats.filtered_messages += 1;
                stream.set_position(offset + format.length);
                continue;
            }

            let record = decode_message(&mut stream, format)?;
            if let Some(record) = self.filter.apply(record) {
                log.records.push(record);
            }
        }

        if !stream.eof() {
            let tail = stream.remaining();
            warn!("Ignoring {} trailing bytes of an incomplete message", tail);
            log.stats.truncated_tail_bytes = tail as u64;
        }

        debug!(
            "Decoded {} records from {} data messages ({} formats, {} bytes skipped)",
            log.records.len(),
            log.stats.data_messages,
            log.stats.format_messages,
            log.stats.skipped_bytes
        );

        Ok(log)
    }

    /// Fail, or in recover mode step over one byte
    fn resync<F>(&self, stream: &mut LogDataStream, log: &mut DecodedLog, err: F) -> Result<()>
    where
        F: FnOnce() -> ExportError,
    {
        if !self.recover {
            return Err(err());
        }
        stream.skip(1)?;
        log.stats.skipped_bytes += 1;
        Ok(())
    }

    fn register_format(
        &self,
        formats: &mut HashMap<u8, MessageFormat>,
        log: &mut DecodedLog,
        format: MessageFormat,
    ) {
        match log.formats.iter_mut().find(|f| f.type_id == format.type_id) {
            Some(existing) => *existing = format.clone(),
            None => log.formats.push(format.clone()),
        }
        formats.insert(format.type_id, format);
    }
}

/// Decode one data message. The stream must be positioned after the header.
fn decode_message(stream: &mut LogDataStream, format: &MessageFormat) -> Result<Record> {
    let mut record = Record::new(format.name.clone());
    for (label, field_type) in format.labels.iter().zip(&format.fields) {
        let value = decode_field_value(stream, *field_type)?;
        record.fields.push((label.clone(), value));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn padded(text: &str, len: usize) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(len, 0);
        bytes
    }

    fn fmt_message(type_id: u8, length: u8, name: &str, format: &str, labels: &str) -> Vec<u8> {
        let mut msg = vec![MSG_HEAD1, MSG_HEAD2, MSG_TYPE_FORMAT, type_id, length];
        msg.extend(padded(name, 4));
        msg.extend(padded(format, 16));
        msg.extend(padded(labels, 64));
        msg
    }

    fn att_message(time_ms: u32, roll: f32) -> Vec<u8> {
        let mut msg = vec![MSG_HEAD1, MSG_HEAD2, 131];
        msg.extend(time_ms.to_le_bytes());
        msg.extend(roll.to_le_bytes());
        msg
    }

    fn att_log() -> Vec<u8> {
        let mut data = fmt_message(131, 11, "ATT", "If", "TimeMS,Roll");
        data.extend(att_message(1000, 0.5));
        data.extend(att_message(1020, -0.25));
        data
    }

    #[test]
    fn test_decode_records_in_order() {
        let log = LogDecoder::default().decode(&att_log()).unwrap();

        assert_eq!(log.formats.len(), 1);
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.records[0].message_type, "ATT");
        assert_eq!(log.records[0].get("TimeMS"), Some(&Value::Int(1000)));
        assert_eq!(log.records[1].get("Roll"), Some(&Value::Float(-0.25)));
        assert_eq!(log.stats.format_messages, 1);
        assert_eq!(log.stats.data_messages, 2);
    }

    #[test]
    fn test_invalid_header_fails_without_recover() {
        let mut data = vec![0x00, 0x11];
        data.extend(att_log());

        let err = LogDecoder::default().decode(&data).unwrap_err();
        assert!(matches!(err, ExportError::Decode { offset: 0, .. }));
    }

    #[test]
    fn test_recover_skips_garbage() {
        let mut data = att_log();
        data.extend([0xde, 0xad]);
        data.extend(att_message(1040, 1.0));
        // Unknown message type 200
        data.extend([MSG_HEAD1, MSG_HEAD2, 200]);
        data.extend(att_message(1060, 1.5));

        let log = LogDecoder::new(MessageFilter::new(), true).decode(&data).unwrap();
        assert_eq!(log.records.len(), 4);
        assert_eq!(log.stats.skipped_bytes, 5);
    }

    #[test]
    fn test_unknown_type_fails_without_recover() {
        let mut data = att_log();
        data.extend([MSG_HEAD1, MSG_HEAD2, 200, 0, 0, 0]);

        let err = LogDecoder::default().decode(&data).unwrap_err();
        assert!(err.to_string().contains("unknown message type 200"));
    }

    #[test]
    fn test_truncated_tail_is_ignored() {
        let mut data = att_log();
        data.extend(&att_message(1040, 1.0)[..5]);

        let log = LogDecoder::default().decode(&data).unwrap();
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.stats.truncated_tail_bytes, 5);
    }

    #[test]
    fn test_filter_applied_while_decoding() {
        let mut data = att_log();
        data.extend(fmt_message(140, 7, "BARO", "f", "Alt"));
        data.extend([MSG_HEAD1, MSG_HEAD2, 140]);
        data.extend(12.5f32.to_le_bytes());

        let filter = MessageFilter::parse(["ATT.Roll"]).unwrap();
        let log = LogDecoder::new(filter, false).decode(&data).unwrap();

        assert_eq!(log.records.len(), 2);
        assert_eq!(log.stats.filtered_messages, 1);
        assert_eq!(log.records[0].fields.len(), 1);
        assert_eq!(log.records[0].get("Roll"), Some(&Value::Float(0.5)));
        // Declared formats are kept regardless of the filter
        assert!(log.declares("BARO"));
    }
}
