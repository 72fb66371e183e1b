use dbal_query::Sql;

use super::SchemaGrammar;
use crate::column::ColumnType;

const FLIP: &[(&str, ColumnType)] = &[
    ("CHARACTER VARYING", ColumnType::String),
    ("CHARACTER", ColumnType::Char),
    ("INT", ColumnType::Integer),
    ("SMALLINT", ColumnType::SmallInteger),
    ("TIMESTAMP", ColumnType::Timestamp),
    ("TIMESTAMP WITH TIME ZONE", ColumnType::TimestampTz),
];

impl SchemaGrammar for Sql {
    fn type_name(&self, column_type: &ColumnType) -> Option<&'static str> {
        Some(match column_type {
            ColumnType::String => "VARCHAR",
            ColumnType::Char => "CHAR",
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => "TEXT",
            ColumnType::TinyInteger | ColumnType::SmallInteger | ColumnType::Year => "SMALLINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInteger => "BIGINT",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::DateTimeTz | ColumnType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            ColumnType::Time => "TIME",
            ColumnType::TimeTz => "TIME WITH TIME ZONE",
            ColumnType::Binary => "BLOB",
            ColumnType::Json | ColumnType::Jsonb => "JSON",
            ColumnType::Uuid => "CHAR(36)",
            ColumnType::IpAddress => "VARCHAR(45)",
            ColumnType::MacAddress => "VARCHAR(17)",
            ColumnType::Enum
            | ColumnType::Vector
            | ColumnType::VectorF16
            | ColumnType::HalfVector
            | ColumnType::Other(_) => return None,
        })
    }

    fn flip_overrides(&self) -> &[(&'static str, ColumnType)] {
        FLIP
    }
}
