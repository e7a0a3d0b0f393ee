//! Property value types and coercion of raw configuration values.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
}

impl FieldType {
    pub fn type_name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A scalar property value.
///
/// Deserializes untagged so configuration files can write plain scalars
/// (`output_format: hdf5`, `nprocx: 2`, `coor: true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl PropertyValue {
    /// The field type this value naturally belongs to.
    pub fn natural_type(&self) -> FieldType {
        match self {
            PropertyValue::Bool(_) => FieldType::Boolean,
            PropertyValue::Int(_) => FieldType::Integer,
            PropertyValue::Float(_) => FieldType::Float,
            PropertyValue::Str(_) => FieldType::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(n) => Some(*n as f64),
            PropertyValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerce this raw value into `target`.
    ///
    /// Returns `None` when the value has no sensible reading as `target`.
    pub fn coerce(&self, target: FieldType) -> Option<PropertyValue> {
        match (target, self) {
            (FieldType::String, PropertyValue::Str(s)) => Some(PropertyValue::Str(s.clone())),
            (FieldType::String, other) => Some(PropertyValue::Str(other.to_string())),

            (FieldType::Integer, PropertyValue::Int(n)) => Some(PropertyValue::Int(*n)),
            (FieldType::Integer, PropertyValue::Float(x)) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
                    Some(PropertyValue::Int(*x as i64))
                } else {
                    None
                }
            }
            (FieldType::Integer, PropertyValue::Str(s)) => {
                s.trim().parse::<i64>().ok().map(PropertyValue::Int)
            }
            (FieldType::Integer, PropertyValue::Bool(_)) => None,

            (FieldType::Float, PropertyValue::Float(x)) => {
                x.is_finite().then_some(PropertyValue::Float(*x))
            }
            (FieldType::Float, PropertyValue::Int(n)) => Some(PropertyValue::Float(*n as f64)),
            (FieldType::Float, PropertyValue::Str(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(PropertyValue::Float),
            (FieldType::Float, PropertyValue::Bool(_)) => None,

            (FieldType::Boolean, PropertyValue::Bool(b)) => Some(PropertyValue::Bool(*b)),
            (FieldType::Boolean, PropertyValue::Int(0)) => Some(PropertyValue::Bool(false)),
            (FieldType::Boolean, PropertyValue::Int(1)) => Some(PropertyValue::Bool(true)),
            (FieldType::Boolean, PropertyValue::Int(_)) => None,
            (FieldType::Boolean, PropertyValue::Str(s)) => parse_bool(s).map(PropertyValue::Bool),
            (FieldType::Boolean, PropertyValue::Float(_)) => None,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(n) => write!(f, "{n}"),
            PropertyValue::Float(x) => write!(f, "{x}"),
            PropertyValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Str(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Str(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Int(n)
    }
}

impl From<f64> for PropertyValue {
    fn from(x: f64) -> Self {
        PropertyValue::Float(x)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_from_string_is_trimmed() {
        let raw = PropertyValue::from(" 1048576 ");
        assert_eq!(
            raw.coerce(FieldType::Integer),
            Some(PropertyValue::Int(1_048_576))
        );
    }

    #[test]
    fn integer_rejects_fractional_float() {
        assert_eq!(PropertyValue::Float(2.5).coerce(FieldType::Integer), None);
        assert_eq!(
            PropertyValue::Float(4.0).coerce(FieldType::Integer),
            Some(PropertyValue::Int(4))
        );
    }

    #[test]
    fn integer_rejects_bool() {
        assert_eq!(PropertyValue::Bool(true).coerce(FieldType::Integer), None);
    }

    #[test]
    fn float_widens_integer() {
        assert_eq!(
            PropertyValue::Int(3).coerce(FieldType::Float),
            Some(PropertyValue::Float(3.0))
        );
    }

    #[test]
    fn float_rejects_nan_string() {
        assert_eq!(PropertyValue::from("NaN").coerce(FieldType::Float), None);
    }

    #[test]
    fn float_rejects_non_finite() {
        assert_eq!(PropertyValue::Float(f64::NAN).coerce(FieldType::Float), None);
        assert_eq!(PropertyValue::Float(f64::INFINITY).coerce(FieldType::Float), None);
    }

    #[test]
    fn boolean_words() {
        for (raw, expected) in [("yes", true), ("On", true), ("0", false), ("FALSE", false)] {
            assert_eq!(
                PropertyValue::from(raw).coerce(FieldType::Boolean),
                Some(PropertyValue::Bool(expected)),
                "raw = {raw}"
            );
        }
        assert_eq!(PropertyValue::from("maybe").coerce(FieldType::Boolean), None);
        assert_eq!(PropertyValue::Int(2).coerce(FieldType::Boolean), None);
    }

    #[test]
    fn string_accepts_any_scalar() {
        assert_eq!(
            PropertyValue::Int(12).coerce(FieldType::String),
            Some(PropertyValue::from("12"))
        );
        assert_eq!(
            PropertyValue::Bool(false).coerce(FieldType::String),
            Some(PropertyValue::from("false"))
        );
    }

    #[test]
    fn untagged_deserialization_picks_natural_type() {
        let values: Vec<PropertyValue> =
            serde_json::from_str(r#"[true, 7, 0.55, "hdf5"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                PropertyValue::Bool(true),
                PropertyValue::Int(7),
                PropertyValue::Float(0.55),
                PropertyValue::from("hdf5"),
            ]
        );
    }
}
