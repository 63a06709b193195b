use std::fmt;

use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::domain::element::{Irdi, ValueSet, ValueType};
use crate::errors::DomainError;

impl ValueType {
    /// Whether `value` satisfies this declared type. Total and infallible:
    /// permissive tags accept everything.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String | Self::LangString | Self::AnyUri => value.is_string(),
            Self::Decimal | Self::Double | Self::Float => value.is_number(),
            Self::Int
            | Self::Integer
            | Self::Long
            | Self::Short
            | Self::Byte
            | Self::UnsignedLong
            | Self::UnsignedShort
            | Self::UnsignedByte => integral(value).is_some(),
            Self::NonNegativeInteger => integral(value).is_some_and(|number| number >= 0.0),
            Self::PositiveInteger | Self::Time => integral(value).is_some_and(|number| number > 0.0),
            Self::NonPositiveInteger => integral(value).is_some_and(|number| number <= 0.0),
            Self::NegativeInteger => integral(value).is_some_and(|number| number < 0.0),
            Self::Date | Self::DateTime | Self::DateTimeStamp => is_calendar_timestamp(value),
            Self::Boolean => value.is_boolean(),
            Self::ComplexType => value.is_object() || value.is_array(),
            Self::AnyType | Self::AnySimpleType | Self::AnyAtomicType | Self::Unspecified => true,
        }
    }
}

/// Numeric value with zero fractional remainder, tolerant of floating
/// representation (`42.0` counts as integral).
fn integral(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => number.as_f64(),
        Value::Number(number) => {
            number.as_f64().filter(|float| float.is_finite() && float.fract() == 0.0)
        }
        _ => None,
    }
}

fn is_calendar_timestamp(value: &Value) -> bool {
    let millis = match value.as_i64() {
        Some(millis) => Some(millis),
        None => value
            .as_f64()
            .filter(|float| float.is_finite() && float.abs() <= i64::MAX as f64)
            .map(|float| float as i64),
    };
    millis.is_some_and(|millis| Utc.timestamp_millis_opt(millis).single().is_some())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Missing,
    InvalidType,
}

/// First failing element of an evaluation, in schema declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueFailure {
    pub kind: FailureKind,
    pub id_short: String,
    pub semantic_id: String,
}

impl fmt::Display for ValueFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Missing => {
                write!(f, "value for {} ({}) is missing", self.id_short, self.semantic_id)
            }
            FailureKind::InvalidType => {
                write!(f, "type for {} ({}) is invalid", self.id_short, self.semantic_id)
            }
        }
    }
}

/// Outcome of checking a value set against a capability schema. This is
/// data, not an error: the caller chooses whether to proceed, retry, or
/// abort the conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    Valid,
    Invalid(ValueFailure),
}

impl Evaluation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Walks the capability's negotiable schema in declaration order and
/// reports the first missing or mistyped value. Absent booleans are not an
/// error; a falsy value (null, `false`, `0`, `""`) counts as missing for
/// every other type.
pub fn evaluate(catalog: &Catalog, irdi: &Irdi, values: &ValueSet) -> Result<Evaluation, DomainError> {
    for element in catalog.schema_for(irdi)? {
        let value = values.get(&element.semantic_id);

        if element.value_type != ValueType::Boolean && value.map_or(true, is_falsy) {
            return Ok(Evaluation::Invalid(ValueFailure {
                kind: FailureKind::Missing,
                id_short: element.id_short,
                semantic_id: element.semantic_id,
            }));
        }

        if let Some(value) = value {
            if !element.value_type.accepts(value) {
                return Ok(Evaluation::Invalid(ValueFailure {
                    kind: FailureKind::InvalidType,
                    id_short: element.id_short,
                    semantic_id: element.semantic_id,
                }));
            }
        }
    }

    Ok(Evaluation::Valid)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|float| float == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
