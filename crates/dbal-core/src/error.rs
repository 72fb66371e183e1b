//! Error types shared by every dbal crate.

use std::fmt;

/// The primary error type for dbal operations.
#[derive(Debug)]
pub enum Error {
    /// Driver connect/transport errors
    Connection(ConnectionError),
    /// Statement execution errors reported by the driver
    Query(QueryError),
    /// Value conversion errors
    Type(TypeError),
    /// Schema (DDL, reflection) errors
    Schema(SchemaError),
    /// Configuration errors (unregistered driver, missing connection)
    Config(ConfigError),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Builder input rejected in strict mode
    InvalidInput,
    /// Reported by the driver while running the statement
    Database,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
    /// Individual failures when `kind` is [`SchemaErrorKind::Composite`].
    pub failures: Vec<CommandFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Table not found
    TableNotFound,
    /// Column not found
    ColumnNotFound,
    /// The dialect cannot express the operation
    Unsupported,
    /// Catalog rows could not be interpreted
    Invalid,
    /// One or more ALTER commands failed
    Composite,
}

/// A single failed ALTER command.
#[derive(Debug)]
pub struct CommandFailure {
    /// Command name, e.g. `AddColumn`
    pub command: String,
    pub error: Error,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl Error {
    /// Build a connect/transport error; drivers wrap their own cause.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection(ConnectionError {
            message: message.into(),
            source,
        })
    }

    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            message: message.into(),
        })
    }

    /// Build a schema error of the given kind.
    pub fn schema(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Error::Schema(SchemaError {
            kind,
            message: message.into(),
            failures: Vec::new(),
        })
    }

    /// Build a database error carrying the offending SQL.
    pub fn query(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind: QueryErrorKind::Database,
            sql: Some(sql.into()),
            message: message.into(),
            source: None,
        })
    }

    /// Build an error for builder input rejected before reaching the driver.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind: QueryErrorKind::InvalidInput,
            sql: None,
            message: message.into(),
            source: None,
        })
    }

    /// Fold per-command failures into one error.
    ///
    /// The message is every failure's message joined with `"\n"`.
    pub fn composite(failures: Vec<CommandFailure>) -> Self {
        let message = failures
            .iter()
            .map(|f| f.error.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Error::Schema(SchemaError {
            kind: SchemaErrorKind::Composite,
            message,
            failures,
        })
    }

    /// Is this a configuration error?
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// The schema error kind, if this is a schema error.
    pub fn schema_kind(&self) -> Option<SchemaErrorKind> {
        match self {
            Error::Schema(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            Error::Query(e) => write!(f, "Query error: {}", e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            // Composite messages are the raw joined messages so callers can split them.
            Error::Schema(e) if e.kind == SchemaErrorKind::Composite => f.write_str(&e.message),
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

/// Result type alias for dbal operations.
pub type Result<T> = std::result::Result<T, Error>;
