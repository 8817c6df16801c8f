//! FMT message parsing and field decoding
//!
//! Every message layout in the log is declared by an FMT message before it is
//! used. FMT payload: `type:u8, length:u8, name:char[4], format:char[16],
//! labels:char[64]`.

use crate::error::{ExportError, Result};
use crate::parser::stream::LogDataStream;
use crate::types::{FieldType, MessageFormat, ScaledBase, Value};

pub const MSG_HEAD1: u8 = 0xA3;
pub const MSG_HEAD2: u8 = 0x95;
pub const MSG_HEADER_LEN: usize = 3;
pub const MSG_TYPE_FORMAT: u8 = 0x80;
/// Total FMT message length including the header
pub const MSG_FORMAT_PACKET_LEN: usize = 89;

/// Parse an FMT payload. The stream must be positioned right after the header.
pub fn parse_format_message(stream: &mut LogDataStream, offset: usize) -> Result<MessageFormat> {
    let type_id = stream.read_u8()?;
    let length = stream.read_u8()? as usize;
    let name = stream.read_c_string(4)?;
    let format = stream.read_c_string(16)?;
    let labels_text = stream.read_c_string(64)?;

    let labels: Vec<String> = if labels_text.is_empty() {
        Vec::new()
    } else {
        labels_text.split(',').map(|s| s.trim().to_string()).collect()
    };

    let fields = format
        .chars()
        .map(|c| {
            FieldType::from_format_char(c).ok_or_else(|| ExportError::Decode {
                offset,
                reason: format!(
                    "unsupported format char '{}' in message {} ({})",
                    c, name, type_id
                ),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let message_format = MessageFormat {
        type_id,
        length,
        name,
        format,
        labels,
        fields,
    };
    validate_format(&message_format, offset)?;
    Ok(message_format)
}

fn validate_format(format: &MessageFormat, offset: usize) -> Result<()> {
    if format.labels.len() != format.fields.len() {
        return Err(ExportError::Decode {
            offset,
            reason: format!(
                "message {} declares {} labels for {} format chars",
                format.name,
                format.labels.len(),
                format.fields.len()
            ),
        });
    }

    let expected = MSG_HEADER_LEN + format.payload_size();
    if format.length != expected {
        return Err(ExportError::Decode {
            offset,
            reason: format!(
                "message {} has length {} but format '{}' needs {}",
                format.name, format.length, format.format, expected
            ),
        });
    }

    Ok(())
}

/// Decode one field value
pub fn decode_field_value(stream: &mut LogDataStream, field_type: FieldType) -> Result<Value> {
    let value = match field_type {
        FieldType::Int8 => Value::Int(stream.read_i8()?.into()),
        FieldType::UInt8 | FieldType::FlightMode => Value::Int(stream.read_u8()?.into()),
        FieldType::Int16 => Value::Int(stream.read_i16()?.into()),
        FieldType::UInt16 => Value::Int(stream.read_u16()?.into()),
        FieldType::Int32 => Value::Int(stream.read_i32()?.into()),
        FieldType::UInt32 => Value::Int(stream.read_u32()?.into()),
        FieldType::Int64 => Value::Int(stream.read_i64()?),
        FieldType::UInt64 => Value::UInt(stream.read_u64()?),
        FieldType::Float32 => Value::Float(stream.read_f32()?.into()),
        FieldType::Float64 => Value::Float(stream.read_f64()?),
        FieldType::Chars(len) => Value::Text(stream.read_c_string(len)?),
        FieldType::Scaled(base, multiplier) => {
            let raw: f64 = match base {
                ScaledBase::Int16 => stream.read_i16()?.into(),
                ScaledBase::UInt16 => stream.read_u16()?.into(),
                ScaledBase::Int32 => stream.read_i32()?.into(),
                ScaledBase::UInt32 => stream.read_u32()?.into(),
            };
            Value::Float(raw * multiplier)
        }
    };
    Ok(value)
}
