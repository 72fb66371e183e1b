//! Connection and grammar configuration.

/// Configuration for one database handle.
///
/// DSN parsing belongs to the driver; the grammar only reads `driver`,
/// `prefix`, `database` and `schema`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Logical name of the handle ("primary", "secondary", ...)
    pub name: String,
    /// Registry key of the grammar/driver ("mysql", "postgres", "sqlite3", "hdb", "sql")
    pub driver: String,
    /// Connection string passed through to the driver
    pub dsn: String,
    /// Database name used by catalog queries
    pub database: Option<String>,
    /// Schema name used by catalog queries
    pub schema: Option<String>,
    /// Table name prefix applied when wrapping table names
    pub prefix: String,
    /// Whether the handle is read-only
    pub read_only: bool,
}

impl Config {
    /// Create a new config for the given driver and DSN.
    pub fn new(driver: impl Into<String>, dsn: impl Into<String>) -> Self {
        Self {
            name: "primary".to_string(),
            driver: driver.into(),
            dsn: dsn.into(),
            ..Default::default()
        }
    }

    /// Set the logical name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the schema name.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the table prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Mark the handle read-only.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
