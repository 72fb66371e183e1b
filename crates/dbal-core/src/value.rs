//! Bound parameter values.

use serde::{Deserialize, Serialize};

/// A dynamically-typed SQL value.
///
/// Every literal that ends up behind a `?`/`$N` placeholder is a `Value`;
/// drivers hand result columns back in the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    /// Exact numerics travel as their decimal text.
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    /// Bound as its serialized text on every dialect.
    Json(serde_json::Value),
    /// Renders the `DEFAULT` keyword in place of a placeholder.
    Default,
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// SQL-ish name of the variant, used in conversion errors.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Int(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Float(_) => "REAL",
            Value::Double(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BLOB",
            Value::Json(_) => "JSON",
            Value::Default => "DEFAULT",
        }
    }

    /// Catalog views report flags as `'true'`, `'YES'` or `1` depending on
    /// the backend; all of them read as booleans here.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(flag) = self {
            return Some(*flag);
        }
        if let Value::Text(s) = self {
            return match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "t" => Some(true),
                "false" | "no" | "n" | "0" | "f" | "" => Some(false),
                _ => None,
            };
        }
        self.integer().map(|n| n != 0)
    }

    /// Integer view. Numeric text is parsed after trimming.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(flag) => Some(i64::from(*flag)),
            Value::Text(s) | Value::Decimal(s) => s.trim().parse().ok(),
            other => other.integer(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            Value::Decimal(s) | Value::Text(s) => s.trim().parse().ok(),
            #[allow(clippy::cast_precision_loss)]
            other => other.integer().map(|n| n as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Plain-text rendering, the way catalog columns are read back.
    ///
    /// Bytes decode as lossy UTF-8; NULL and DEFAULT have no text.
    pub fn to_text(&self) -> Option<String> {
        let text = match self {
            Value::Null | Value::Default => return None,
            Value::Decimal(s) | Value::Text(s) => s.clone(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Json(j) => j.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Double(n) => n.to_string(),
            other => other.integer()?.to_string(),
        };
        Some(text)
    }

    fn integer(&self) -> Option<i64> {
        match self {
            Value::TinyInt(n) => Some(i64::from(*n)),
            Value::SmallInt(n) => Some(i64::from(*n)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::BigInt(n) => Some(*n),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    u32 => BigInt,
    f32 => Float,
    f64 => Double,
    String => Text,
    &str => Text,
    &String => Text,
    Vec<u8> => Bytes,
    serde_json::Value => Json,
}

/// Values past `i64::MAX` clamp to it, with a warning.
impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or_else(
            |_| {
                tracing::warn!(value = v, "Unsigned value exceeds BIGINT; clamping");
                Value::BigInt(i64::MAX)
            },
            Value::BigInt,
        )
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(5), Value::Int(5));
        assert_eq!(Value::from(5_i64), Value::BigInt(5));
        assert_eq!(Value::from("ken"), Value::Text("ken".to_string()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(2.5)), Value::Double(2.5));
    }

    #[test]
    fn test_catalog_flags_as_bool() {
        assert_eq!(Value::Text("YES".to_string()).as_bool(), Some(true));
        assert_eq!(Value::Text("false".to_string()).as_bool(), Some(false));
        assert_eq!(Value::Int(1).as_bool(), Some(true));
        assert_eq!(Value::Text("maybe".to_string()).as_bool(), None);
    }

    #[test]
    fn test_numeric_text_parses() {
        assert_eq!(Value::Text(" 255 ".to_string()).as_i64(), Some(255));
        assert_eq!(Value::Decimal("10.50".to_string()).as_f64(), Some(10.5));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Bytes(b"now()".to_vec()).to_text().as_deref(), Some("now()"));
        assert_eq!(Value::BigInt(7).to_text().as_deref(), Some("7"));
        assert_eq!(Value::Null.to_text(), None);
    }

    #[test]
    fn test_u64_clamped() {
        assert_eq!(Value::from(42_u64), Value::BigInt(42));
        assert_eq!(Value::from(u64::MAX), Value::BigInt(i64::MAX));
    }
}
