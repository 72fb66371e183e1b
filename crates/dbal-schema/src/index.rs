//! Index and primary key definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Index,
    Unique,
    Primary,
}

impl IndexType {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::Index => "index",
            IndexType::Unique => "unique",
            IndexType::Primary => "primary",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secondary index.
///
/// `name` is the logical name; grammars that keep index names
/// schema-global store it as `<table>_<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    /// Owning table (unprefixed)
    pub table_name: String,
    #[serde(rename = "type")]
    pub index_type: IndexType,
    /// Column names in key order
    pub columns: Vec<String>,
    pub comment: Option<String>,
}

impl Index {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        index_type: IndexType,
        columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            index_type,
            columns,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primary {
    /// Constraint name as the catalog reports it (`PRIMARY` when unnamed)
    pub name: String,
    pub table_name: String,
    pub columns: Vec<String>,
}

impl Primary {
    pub fn new(table_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: "PRIMARY".to_string(),
            table_name: table_name.into(),
            columns,
        }
    }
}
