use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

///
/// Value
/// Dynamic scalar currency of rows, defaults, and where clauses.
///
/// `Null` → the attribute's value is SQL NULL.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for values that carry a numeric payload.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Forced integer parsing, as applied to aggregate scalars.
    ///
    /// Accepts integers, integral floats, and all-digit text. Anything
    /// else (including fractional floats) yields `None`.
    #[must_use]
    pub fn parse_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            #[expect(clippy::cast_possible_truncation)]
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(raw) => raw.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

// Values serialize as bare scalars, not tagged variants, so a record's
// value map renders as plain `{"name": "ada"}` JSON.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Timestamp(ts) => ts.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_accepts_integers_and_digit_text() {
        assert_eq!(Value::Int(7).parse_int(), Some(7));
        assert_eq!(Value::Float(3.0).parse_int(), Some(3));
        assert_eq!(Value::Text("42".to_string()).parse_int(), Some(42));
        assert_eq!(Value::Text(" 42 ".to_string()).parse_int(), Some(42));
    }

    #[test]
    fn parse_int_rejects_non_numeric_payloads() {
        assert_eq!(Value::Null.parse_int(), None);
        assert_eq!(Value::Bool(true).parse_int(), None);
        assert_eq!(Value::Float(3.5).parse_int(), None);
        assert_eq!(Value::Text("4x".to_string()).parse_int(), None);
    }

    #[test]
    fn option_lifts_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Int(5));
    }

    #[test]
    fn values_serialize_as_bare_scalars() {
        assert_eq!(
            serde_json::to_value(Value::from("ada")).expect("text serializes"),
            serde_json::json!("ada")
        );
        assert_eq!(
            serde_json::to_value(Value::Int(42)).expect("int serializes"),
            serde_json::json!(42)
        );
        assert_eq!(
            serde_json::to_value(Value::Bool(true)).expect("bool serializes"),
            serde_json::json!(true)
        );
        assert_eq!(
            serde_json::to_value(Value::Null).expect("null serializes"),
            serde_json::Value::Null
        );
        assert!(
            serde_json::to_value(Value::from(Utc::now()))
                .expect("timestamp serializes")
                .is_string()
        );
    }
}
