//! Generic ANSI SQL grammar, used for drivers without a dedicated one.

use dbal_core::{Config, Dialect};

use super::Grammar;
use crate::clause::DatePart;
use crate::query::Query;

#[derive(Debug, Clone, Default)]
pub struct Sql {
    prefix: String,
}

impl Sql {
    pub fn new(config: &Config) -> Self {
        Self {
            prefix: config.prefix.clone(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Grammar for Sql {
    fn dialect(&self) -> Dialect {
        Dialect::Sql
    }

    fn driver(&self) -> &str {
        "sql"
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn where_date_part(&self, part: DatePart, column: &str, operator: &str, value: &str) -> String {
        match part {
            DatePart::Date | DatePart::Time => {
                format!("cast({} as {}) {} {}", column, part.as_str(), operator, value)
            }
            DatePart::Year | DatePart::Month | DatePart::Day => {
                format!("extract({} from {}) {} {}", part.as_str(), column, operator, value)
            }
        }
    }

    /// `offset N rows fetch next M rows only`; the offset half is emitted
    /// here so it precedes the fetch.
    fn compile_limit(&self, query: &Query) -> String {
        let offset = query.offset.map(|o| format!("offset {o} rows"));
        let fetch = query.limit.map(|l| format!("fetch next {l} rows only"));
        [offset, fetch].into_iter().flatten().collect::<Vec<_>>().join(" ")
    }

    fn compile_offset(&self, _query: &Query) -> String {
        String::new()
    }
}
