//! Dialect tag plus identifier quoting and placeholder helpers.

use std::fmt;

/// The SQL dialect a grammar emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Generic ANSI SQL (double quotes, `?` placeholders)
    #[default]
    Sql,
    /// MySQL / MariaDB (backticks, `?` placeholders)
    MySql,
    /// PostgreSQL (double quotes, `$1`, `$2` placeholders)
    Postgres,
    /// SQLite (backticks, `?` placeholders)
    Sqlite,
    /// SAP HANA (double quotes, `?` placeholders)
    Hana,
}

impl Dialect {
    /// Short name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Dialect::Sql => "sql",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite3",
            Dialect::Hana => "hdb",
        }
    }

    /// The identifier quote character.
    pub const fn quote_char(self) -> char {
        match self {
            Dialect::MySql | Dialect::Sqlite => '`',
            Dialect::Sql | Dialect::Postgres | Dialect::Hana => '"',
        }
    }

    /// Whether placeholders carry their 1-based position (`$N`).
    pub const fn numbered_placeholders(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Generate a placeholder for the given parameter index (1-based).
    pub fn placeholder(self, index: usize) -> String {
        if self.numbered_placeholders() {
            format!("${index}")
        } else {
            "?".to_string()
        }
    }

    /// Quote a single identifier segment for this dialect.
    ///
    /// Embedded quote characters are escaped by doubling them.
    pub fn quote_identifier(self, name: &str) -> String {
        let q = self.quote_char();
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(q);
        for c in name.chars() {
            if c == q {
                quoted.push(q);
            }
            quoted.push(c);
        }
        quoted.push(q);
        quoted
    }

    /// Quote a string literal (`'` doubled).
    pub fn quote_string(self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sanitize an identifier by removing everything but alphanumerics and `_`.
///
/// Used where quoting is not possible (SQLite `PRAGMA` arguments).
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
