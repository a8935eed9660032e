//! Decoded EXIF values.

use std::fmt;

use serde::Serialize;

/// A signed rational as stored in RATIONAL and SRATIONAL entries.
///
/// Numerator and denominator are widened to `i64` so both the unsigned and
/// signed TIFF flavors fit without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub fn new(num: i64, den: i64) -> Rational {
        Rational { num, den }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// A decoded metadata value, independent of the exact TIFF field type it
/// came from.
///
/// Integer widths collapse into one variant; the encoder picks the narrowest
/// TIFF type that fits when writing back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// ASCII text, trailing NUL stripped.
    Text(String),
    /// One or more integers (BYTE, SHORT, LONG and their signed forms).
    Integer(Vec<i64>),
    /// One or more rationals.
    Rational(Vec<Rational>),
    /// Raw UNDEFINED payloads such as MakerNote.
    Bytes(Vec<u8>),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Value {
        Value::Text(text.into())
    }

    pub fn int(value: i64) -> Value {
        Value::Integer(vec![value])
    }

    pub fn rational(num: i64, den: i64) -> Value {
        Value::Rational(vec![Rational::new(num, den)])
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Integer(values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                f.write_str(&rendered.join(", "))
            }
            Value::Rational(values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                f.write_str(&rendered.join(", "))
            }
            Value::Bytes(bytes) => f.write_str(&lossy_text(bytes)),
        }
    }
}

/// Best-effort UTF-8 rendering that drops invalid bytes instead of
/// substituting replacement characters.
pub(crate) fn lossy_text(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let valid_up_to = err.valid_up_to();
                if let Ok(valid) = std::str::from_utf8(&rest[..valid_up_to]) {
                    out.push_str(valid);
                }
                match err.error_len() {
                    Some(skip) => rest = &rest[valid_up_to + skip..],
                    // Truncated sequence at the end of the buffer.
                    None => return out,
                }
            }
        }
    }
}
