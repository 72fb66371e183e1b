//! Column definitions.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use dbal_core::Value;
use serde::{Deserialize, Serialize};

/// Dialect-neutral column type.
///
/// Grammars map each variant to a native type; anything they cannot map
/// falls back to `VARCHAR`. Reflection maps native types back, keeping
/// unknown names in [`ColumnType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Char,
    Text,
    MediumText,
    LongText,
    TinyInteger,
    SmallInteger,
    Integer,
    BigInteger,
    Decimal,
    Float,
    Double,
    Boolean,
    Date,
    DateTime,
    DateTimeTz,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    Year,
    Binary,
    Json,
    Jsonb,
    Uuid,
    IpAddress,
    MacAddress,
    Enum,
    /// pgvector `vector(n)`; the length holds the dimension count
    Vector,
    /// pgvecto.rs half-precision `vecf16(n)`
    VectorF16,
    /// pgvector half-precision `halfvec(n)`
    HalfVector,
    Other(String),
}

impl ColumnType {
    /// Every named variant, in declaration order.
    pub const ALL: [ColumnType; 31] = [
        ColumnType::String,
        ColumnType::Char,
        ColumnType::Text,
        ColumnType::MediumText,
        ColumnType::LongText,
        ColumnType::TinyInteger,
        ColumnType::SmallInteger,
        ColumnType::Integer,
        ColumnType::BigInteger,
        ColumnType::Decimal,
        ColumnType::Float,
        ColumnType::Double,
        ColumnType::Boolean,
        ColumnType::Date,
        ColumnType::DateTime,
        ColumnType::DateTimeTz,
        ColumnType::Time,
        ColumnType::TimeTz,
        ColumnType::Timestamp,
        ColumnType::TimestampTz,
        ColumnType::Year,
        ColumnType::Binary,
        ColumnType::Json,
        ColumnType::Jsonb,
        ColumnType::Uuid,
        ColumnType::IpAddress,
        ColumnType::MacAddress,
        ColumnType::Enum,
        ColumnType::Vector,
        ColumnType::VectorF16,
        ColumnType::HalfVector,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::String => "string",
            ColumnType::Char => "char",
            ColumnType::Text => "text",
            ColumnType::MediumText => "mediumText",
            ColumnType::LongText => "longText",
            ColumnType::TinyInteger => "tinyInteger",
            ColumnType::SmallInteger => "smallInteger",
            ColumnType::Integer => "integer",
            ColumnType::BigInteger => "bigInteger",
            ColumnType::Decimal => "decimal",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "dateTime",
            ColumnType::DateTimeTz => "dateTimeTz",
            ColumnType::Time => "time",
            ColumnType::TimeTz => "timeTz",
            ColumnType::Timestamp => "timestamp",
            ColumnType::TimestampTz => "timestampTz",
            ColumnType::Year => "year",
            ColumnType::Binary => "binary",
            ColumnType::Json => "json",
            ColumnType::Jsonb => "jsonb",
            ColumnType::Uuid => "uuid",
            ColumnType::IpAddress => "ipAddress",
            ColumnType::MacAddress => "macAddress",
            ColumnType::Enum => "enum",
            ColumnType::Vector => "vector",
            ColumnType::VectorF16 => "vecf16",
            ColumnType::HalfVector => "halfvec",
            ColumnType::Other(name) => name,
        }
    }

    /// Types that take `(precision,scale)`.
    pub fn is_decimal(&self) -> bool {
        matches!(self, ColumnType::Decimal | ColumnType::Float | ColumnType::Double)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::TinyInteger
                | ColumnType::SmallInteger
                | ColumnType::Integer
                | ColumnType::BigInteger
        )
    }

    /// Types that carry a fractional-seconds precision.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::DateTime
                | ColumnType::DateTimeTz
                | ColumnType::Time
                | ColumnType::TimeTz
                | ColumnType::Timestamp
                | ColumnType::TimestampTz
        )
    }

    pub fn is_json(&self) -> bool {
        matches!(self, ColumnType::Json | ColumnType::Jsonb)
    }

    /// Embedding types indexed for nearest-neighbour search.
    pub fn is_vector(&self) -> bool {
        matches!(
            self,
            ColumnType::Vector | ColumnType::VectorF16 | ColumnType::HalfVector
        )
    }
}

impl FromStr for ColumnType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ColumnType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .cloned()
            .unwrap_or_else(|| ColumnType::Other(s.to_string())))
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column default: a literal rendered per dialect, or a verbatim
/// expression such as `CURRENT_TIMESTAMP`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Value(Value),
    Raw(String),
}

/// One column of a [`Table`](crate::Table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Owning table (unprefixed)
    pub table_name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Native type reported by the catalog, if reflected
    pub type_name: Option<String>,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub datetime_precision: Option<u32>,
    pub unsigned: bool,
    pub auto_increment: bool,
    pub primary: bool,
    pub comment: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    /// Allowed values of an enum column
    pub options: Vec<String>,
    /// 1-based ordinal position
    pub position: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            table_name: String::new(),
            column_type,
            type_name: None,
            nullable: false,
            default: None,
            length: None,
            precision: None,
            scale: None,
            datetime_precision: None,
            unsigned: false,
            auto_increment: false,
            primary: false,
            comment: None,
            charset: None,
            collation: None,
            options: Vec::new(),
            position: 0,
        }
    }

    /// Split a `T:<type>|<comment>` marker written for types the dialect
    /// stores under a different native type.
    pub fn type_from_comment(comment: &str) -> Option<(ColumnType, Option<String>)> {
        let marked = comment.strip_prefix("T:")?;
        let (name, rest) = marked.split_once('|').unwrap_or((marked, ""));
        if name.is_empty() {
            return None;
        }
        let rest = (!rest.is_empty()).then(|| rest.to_string());
        Some((ColumnType::from(name.to_string()), rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_round_trip() {
        for t in ColumnType::ALL {
            assert_eq!(t.as_str().parse::<ColumnType>().unwrap(), t);
        }
        assert_eq!("halfvec".parse::<ColumnType>().unwrap(), ColumnType::HalfVector);
        assert_eq!(
            "geometry".parse::<ColumnType>().unwrap(),
            ColumnType::Other("geometry".to_string())
        );
    }

    #[test]
    fn test_type_from_comment() {
        assert_eq!(
            Column::type_from_comment("T:ipAddress|client address"),
            Some((ColumnType::IpAddress, Some("client address".to_string())))
        );
        assert_eq!(
            Column::type_from_comment("T:year|"),
            Some((ColumnType::Year, None))
        );
        assert_eq!(
            Column::type_from_comment("T:vector|embedding"),
            Some((ColumnType::Vector, Some("embedding".to_string())))
        );
        assert_eq!(Column::type_from_comment("plain comment"), None);
    }

    #[test]
    fn test_serialize_uses_camel_case_type() {
        let mut column = Column::new("created_at", ColumnType::DateTimeTz);
        column.default = Some(DefaultValue::Raw("CURRENT_TIMESTAMP".into()));
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "dateTimeTz");
        assert_eq!(json["default"]["raw"], "CURRENT_TIMESTAMP");
    }
}
