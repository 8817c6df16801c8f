#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Storage type of one field, selected by a format character in the FMT message
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    /// `char[N]`, NUL padded
    Chars(usize),
    /// Integer scaled by a constant factor into a float
    Scaled(ScaledBase, f64),
    FlightMode,
}

/// Raw integer layout behind a scaled field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScaledBase {
    Int16,
    UInt16,
    Int32,
    UInt32,
}

impl FieldType {
    /// Map a format character to its field type
    pub fn from_format_char(c: char) -> Option<Self> {
        let field_type = match c {
            'b' => FieldType::Int8,
            'B' => FieldType::UInt8,
            'h' => FieldType::Int16,
            'H' => FieldType::UInt16,
            'i' => FieldType::Int32,
            'I' => FieldType::UInt32,
            'q' => FieldType::Int64,
            'Q' => FieldType::UInt64,
            'f' => FieldType::Float32,
            'd' => FieldType::Float64,
            'n' => FieldType::Chars(4),
            'N' => FieldType::Chars(16),
            'Z' => FieldType::Chars(64),
            'c' => FieldType::Scaled(ScaledBase::Int16, 0.01),
            'C' => FieldType::Scaled(ScaledBase::UInt16, 0.01),
            'e' => FieldType::Scaled(ScaledBase::Int32, 0.01),
            'E' => FieldType::Scaled(ScaledBase::UInt32, 0.01),
            // Latitude/longitude in degrees * 1e7
            'L' => FieldType::Scaled(ScaledBase::Int32, 0.000_000_1),
            'M' => FieldType::FlightMode,
            _ => return None,
        };
        Some(field_type)
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        match self {
            FieldType::Int8 | FieldType::UInt8 | FieldType::FlightMode => 1,
            FieldType::Int16 | FieldType::UInt16 => 2,
            FieldType::Int32 | FieldType::UInt32 | FieldType::Float32 => 4,
            FieldType::Int64 | FieldType::UInt64 | FieldType::Float64 => 8,
            FieldType::Chars(len) => *len,
            FieldType::Scaled(ScaledBase::Int16 | ScaledBase::UInt16, _) => 2,
            FieldType::Scaled(ScaledBase::Int32 | ScaledBase::UInt32, _) => 4,
        }
    }
}

/// Layout of one message type as declared by an FMT message
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageFormat {
    pub type_id: u8,
    /// Full message length including the 3-byte header, stored as a `u8` in FMT
    pub length: usize,
    pub name: String,
    pub format: String,
    pub labels: Vec<String>,
    pub fields: Vec<FieldType>,
}

impl MessageFormat {
    /// Payload size implied by the field types
    pub fn payload_size(&self) -> usize {
        self.fields.iter().map(FieldType::size).sum()
    }
}
