//! A database handle: config, grammar and connection in one place.

use std::fmt;
use std::sync::Arc;

use dbal_core::{Config, Connection, Driver, Result};
use dbal_query::{Builder, Grammar};
use dbal_schema::{Schema, SchemaGrammar};

use crate::registry::Registry;

/// Entry point for queries and schema changes against one database.
///
/// The grammar is resolved from the registry by `config.driver` when the
/// handle is built, so a misconfigured driver fails before any SQL runs.
///
/// ```ignore
/// let registry = Registry::with_defaults();
/// let db = Db::connect(&registry, Config::new("mysql", dsn), &driver)?;
///
/// db.schema().create_table("users", |t| {
///     t.id("id");
///     t.string("email", 120).unique();
/// })?;
///
/// let rows = db.table("users").where_("vote", ">", 10).get()?;
/// ```
#[derive(Clone)]
pub struct Db {
    config: Config,
    grammar: Arc<dyn Grammar>,
    schema_grammar: Arc<dyn SchemaGrammar>,
    connection: Arc<dyn Connection>,
}

impl Db {
    /// Bind an already open connection.
    pub fn new(registry: &Registry, config: Config, connection: Arc<dyn Connection>) -> Result<Self> {
        let grammars = registry.resolve(&config)?;
        if connection.dialect() != grammars.query.dialect() {
            tracing::warn!(
                driver = %config.driver,
                grammar = ?grammars.query.dialect(),
                connection = ?connection.dialect(),
                "Connection dialect differs from the grammar"
            );
        }
        tracing::debug!(name = %config.name, driver = %config.driver, "Database handle ready");
        Ok(Self {
            config,
            grammar: grammars.query,
            schema_grammar: grammars.schema,
            connection,
        })
    }

    /// Resolve the grammar, then open a connection through `driver`.
    #[tracing::instrument(level = "debug", skip(registry, config, driver), fields(name = %config.name, driver = %config.driver))]
    pub fn connect(registry: &Registry, config: Config, driver: &dyn Driver) -> Result<Self> {
        registry.resolve(&config)?;
        let connection = driver.connect(&config)?;
        tracing::info!("Connected");
        Self::new(registry, config, connection)
    }

    /// A fresh builder on `name`.
    pub fn table(&self, name: &str) -> Builder {
        let mut builder = self.query();
        builder.table(name);
        builder
    }

    /// A fresh builder with no table.
    pub fn query(&self) -> Builder {
        Builder::with_connection(Arc::clone(&self.grammar), Arc::clone(&self.connection))
    }

    pub fn schema(&self) -> Schema {
        Schema::new(
            Arc::clone(&self.schema_grammar),
            Arc::clone(&self.connection),
            &self.config,
        )
    }

    pub fn grammar(&self) -> &dyn Grammar {
        self.grammar.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("name", &self.config.name)
            .field("driver", &self.config.driver)
            .field("grammar", &self.grammar)
            .finish_non_exhaustive()
    }
}
