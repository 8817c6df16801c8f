use crate::error::{ExportError, Result};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar value of one decoded log field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Render the value as a single output cell.
    ///
    /// Integers use plain decimal text. Floats use the shortest decimal that
    /// round-trips and always keep a fractional part (`10.0`, `47.6`). Text is
    /// emitted verbatim, but must not contain control characters since every
    /// row is written on one line.
    pub fn render(&self, label: &str) -> Result<String> {
        match self {
            Value::Text(text) if text.chars().any(char::is_control) => {
                Err(ExportError::UnrenderableValue {
                    label: label.to_string(),
                    value: text.clone(),
                })
            }
            _ => Ok(self.to_string()),
        }
    }

    /// Read the value as an integer without losing information.
    ///
    /// Integral floats are accepted, fractional ones are not. Text is parsed
    /// as a decimal integer.
    pub fn as_exact_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            Value::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                    Some(*v as i64)
                } else {
                    None
                }
            }
            Value::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Read the value as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            // Debug formatting keeps the trailing ".0" on integral floats
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_numbers() {
        assert_eq!(Value::Int(-42).render("X").unwrap(), "-42");
        assert_eq!(Value::UInt(u64::MAX).render("X").unwrap(), "18446744073709551615");
        assert_eq!(Value::Float(10.0).render("X").unwrap(), "10.0");
        assert_eq!(Value::Float(47.6).render("X").unwrap(), "47.6");
        assert_eq!(Value::Float(-122.3).render("X").unwrap(), "-122.3");
    }

    #[test]
    fn test_render_text() {
        assert_eq!(Value::from("STABILIZE").render("MODE_Mode").unwrap(), "STABILIZE");

        let err = Value::from("two\nlines").render("MSG_Message").unwrap_err();
        match err {
            ExportError::UnrenderableValue { label, .. } => assert_eq!(label, "MSG_Message"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exact_integer_conversion() {
        assert_eq!(Value::Int(2000).as_exact_i64(), Some(2000));
        assert_eq!(Value::UInt(3_600_000).as_exact_i64(), Some(3_600_000));
        assert_eq!(Value::Float(3_600_000.0).as_exact_i64(), Some(3_600_000));
        assert_eq!(Value::Float(12.5).as_exact_i64(), None);
        assert_eq!(Value::Float(f64::NAN).as_exact_i64(), None);
        assert_eq!(Value::from(" 1234 ").as_exact_i64(), Some(1234));
        assert_eq!(Value::from("12.5").as_exact_i64(), None);
        assert_eq!(Value::UInt(u64::MAX).as_exact_i64(), None);
    }

    #[test]
    fn test_float_conversion() {
        assert_eq!(Value::Int(10).as_f64(), Some(10.0));
        assert_eq!(Value::from("1.5").as_f64(), Some(1.5));
        assert_eq!(Value::from("north").as_f64(), None);
    }
}
