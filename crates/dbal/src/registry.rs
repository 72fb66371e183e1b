//! Driver name to grammar lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dbal_core::{Config, Error, Result};
use dbal_query::{Grammar, Hana, MySql, Postgres, Sql, Sqlite};
use dbal_schema::SchemaGrammar;

type Factory = Arc<dyn Fn(&Config) -> Grammars + Send + Sync>;

/// The two views of one grammar instance.
#[derive(Clone)]
pub(crate) struct Grammars {
    pub(crate) query: Arc<dyn Grammar>,
    pub(crate) schema: Arc<dyn SchemaGrammar>,
}

/// Maps driver names (`mysql`, `postgres`, ...) to grammar constructors.
///
/// Registration happens at startup; lookups afterwards are read-only, so a
/// populated registry can be shared freely between threads.
///
/// ```ignore
/// let registry = Registry::with_defaults();
/// let grammar = registry.grammar(&Config::new("pgsql", dsn))?;
/// assert_eq!(grammar.driver(), "postgres");
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    factories: BTreeMap<String, Factory>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in grammar plus the common aliases.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("mysql", MySql::new);
        registry.register("postgres", Postgres::new);
        registry.register("pgsql", Postgres::new);
        registry.register("sqlite3", Sqlite::new);
        registry.register("sqlite", Sqlite::new);
        registry.register("hdb", Hana::new);
        registry.register("hana", Hana::new);
        registry.register("sql", Sql::new);
        registry
    }

    /// Register `factory` under `driver`, replacing any earlier entry.
    pub fn register<G>(&mut self, driver: &str, factory: fn(&Config) -> G) -> &mut Self
    where
        G: SchemaGrammar + 'static,
    {
        tracing::trace!(driver, "Registering grammar");
        let factory: Factory = Arc::new(move |config: &Config| {
            let grammar = Arc::new(factory(config));
            Grammars {
                query: grammar.clone(),
                schema: grammar,
            }
        });
        if self.factories.insert(driver.to_string(), factory).is_some() {
            tracing::debug!(driver, "Replaced registered grammar");
        }
        self
    }

    pub fn contains(&self, driver: &str) -> bool {
        self.factories.contains_key(driver)
    }

    /// Registered driver names, sorted.
    pub fn drivers(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Query grammar for `config.driver`.
    pub fn grammar(&self, config: &Config) -> Result<Arc<dyn Grammar>> {
        Ok(self.resolve(config)?.query)
    }

    /// Schema grammar for `config.driver`.
    pub fn schema_grammar(&self, config: &Config) -> Result<Arc<dyn SchemaGrammar>> {
        Ok(self.resolve(config)?.schema)
    }

    pub(crate) fn resolve(&self, config: &Config) -> Result<Grammars> {
        let factory = self.factories.get(&config.driver).ok_or_else(|| {
            tracing::error!(driver = %config.driver, "Grammar not registered");
            Error::config(format!("grammar driver {} is not registered", config.driver))
        })?;
        Ok(factory(config))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("drivers", &self.drivers())
            .finish()
    }
}
