//! Value validators attached to schema fields.

use crate::value::{FieldType, PropertyValue};
use core::fmt;
use serde::Serialize;

/// Constraint a field value must satisfy after coercion.
#[derive(Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Membership in an enumerated set of strings.
    Choice { values: Vec<String> },
    /// Strictly greater than zero.
    Positive,
    /// Greater than or equal to zero.
    NonNegative,
    /// Inclusive bounds; either side may be open.
    Range { min: Option<f64>, max: Option<f64> },
    /// Bespoke check described for humans by `description`.
    Predicate {
        description: &'static str,
        #[serde(skip)]
        check: fn(&PropertyValue) -> bool,
    },
}

impl Validator {
    pub fn choice<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::Choice {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Validator::Range { min, max }
    }

    /// Whether this validator is meaningful for values of `field_type`.
    pub fn applies_to(&self, field_type: FieldType) -> bool {
        match self {
            Validator::Choice { .. } => field_type == FieldType::String,
            Validator::Positive | Validator::NonNegative | Validator::Range { .. } => {
                matches!(field_type, FieldType::Integer | FieldType::Float)
            }
            Validator::Predicate { .. } => true,
        }
    }

    /// Check an already-coerced value, returning the reason on rejection.
    pub fn check(&self, value: &PropertyValue) -> Result<(), String> {
        match self {
            Validator::Choice { values } => match value.as_str() {
                Some(s) if values.iter().any(|v| v == s) => Ok(()),
                _ => Err(format!("must be one of [{}]", values.join(", "))),
            },
            Validator::Positive => match value.as_f64() {
                Some(x) if x > 0.0 => Ok(()),
                _ => Err("must be positive".to_string()),
            },
            Validator::NonNegative => match value.as_f64() {
                Some(x) if x >= 0.0 => Ok(()),
                _ => Err("must be non-negative".to_string()),
            },
            Validator::Range { min, max } => {
                let Some(x) = value.as_f64() else {
                    return Err("must be numeric".to_string());
                };
                let below = min.is_some_and(|m| x < m);
                let above = max.is_some_and(|m| x > m);
                if below || above {
                    Err(format!("must be in {}", describe_range(*min, *max)))
                } else {
                    Ok(())
                }
            }
            Validator::Predicate { description, check } => {
                if check(value) {
                    Ok(())
                } else {
                    Err(format!("must satisfy: {description}"))
                }
            }
        }
    }

    /// Short human-readable description.
    pub fn describe(&self) -> String {
        match self {
            Validator::Choice { values } => format!("one of [{}]", values.join(", ")),
            Validator::Positive => "positive".to_string(),
            Validator::NonNegative => "non-negative".to_string(),
            Validator::Range { min, max } => describe_range(*min, *max),
            Validator::Predicate { description, .. } => (*description).to_string(),
        }
    }
}

fn describe_range(min: Option<f64>, max: Option<f64>) -> String {
    let lo = min.map_or("-inf".to_string(), |m| m.to_string());
    let hi = max.map_or("+inf".to_string(), |m| m.to_string());
    format!("[{lo}, {hi}]")
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.describe())
    }
}
