//! Reading catalog rows back into blueprint types.
//!
//! Every dialect's listing query aliases its catalog columns to one shared
//! vocabulary (`column_name`, `data_type`, `is_nullable`, `index_name`,
//! ...), so a single reader rebuilds [`Column`]s and [`Index`]es.

use std::sync::OnceLock;

use dbal_core::{Row, Value};
use regex::Regex;

use crate::index::{Index, IndexType};

/// A native type string split into its parts.
///
/// - `VARCHAR(255)` -> base `VARCHAR`, args `["255"]`
/// - `decimal(10,2)` -> base `DECIMAL`, args `["10", "2"]`
/// - `int(10) unsigned` -> base `INT`, unsigned
/// - `enum('a','b')` -> base `ENUM`, args `["a", "b"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeType {
    pub base: String,
    pub args: Vec<String>,
    pub unsigned: bool,
}

fn type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^\s*([a-z_][a-z0-9_ ]*?)\s*(?:\((.*)\))?\s*(unsigned)?\s*(?:zerofill)?\s*$")
            .expect("native type regex")
    })
}

fn quoted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'((?:[^']|'')*)'").expect("quoted option regex"))
}

impl NativeType {
    pub fn parse(raw: &str) -> Self {
        let Some(caps) = type_regex().captures(raw) else {
            return Self {
                base: raw.trim().to_ascii_uppercase(),
                ..Self::default()
            };
        };
        let base = caps.get(1).map_or("", |m| m.as_str()).to_ascii_uppercase();
        let args = caps.get(2).map_or_else(Vec::new, |m| {
            let inner = m.as_str();
            if inner.contains('\'') {
                quoted_regex()
                    .captures_iter(inner)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().replace("''", "'"))
                    .collect()
            } else {
                inner
                    .split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect()
            }
        });
        Self {
            base,
            args,
            unsigned: caps.get(3).is_some(),
        }
    }

    pub fn arg(&self, i: usize) -> Option<u32> {
        self.args.get(i).and_then(|a| a.parse().ok())
    }
}

/// Non-empty text of a named field.
pub(crate) fn text(row: &Row, name: &str) -> Option<String> {
    row.get_by_name(name)
        .and_then(Value::to_text)
        .filter(|s| !s.is_empty())
}

pub(crate) fn number(row: &Row, name: &str) -> Option<u32> {
    row.get_by_name(name)
        .and_then(Value::as_i64)
        .and_then(|n| u32::try_from(n).ok())
}

pub(crate) fn flag(row: &Row, name: &str) -> bool {
    row.get_by_name(name)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Group index listing rows (one per indexed column, in key order) into
/// indexes. Names lose `strip` (the `<table>_` qualifier most grammars
/// add); the primary index keeps its catalog name.
pub(crate) fn group_indexes(rows: &[Row], table: &str, strip: &str) -> Vec<Index> {
    let mut indexes: Vec<Index> = Vec::new();
    for row in rows {
        let (Some(raw_name), Some(column)) = (text(row, "index_name"), text(row, "column_name")) else {
            continue;
        };
        let primary = flag(row, "is_primary") || raw_name == "PRIMARY";
        let name = if primary {
            raw_name
        } else {
            raw_name
                .strip_prefix(strip)
                .map_or_else(|| raw_name.clone(), str::to_string)
        };
        if let Some(index) = indexes.iter_mut().find(|i| i.name == name) {
            index.columns.push(column);
            continue;
        }
        let index_type = if primary {
            IndexType::Primary
        } else if flag(row, "is_unique") {
            IndexType::Unique
        } else {
            IndexType::Index
        };
        let mut index = Index::new(name, table, index_type, vec![column]);
        index.comment = text(row, "index_comment");
        indexes.push(index);
    }
    indexes
}
