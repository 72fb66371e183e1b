//! Schema front-end bound to one connection.

use std::fmt;
use std::sync::Arc;

use dbal_core::{Config, Connection, Result, Version};

use crate::grammar::SchemaGrammar;
use crate::table::{CreateTableOptions, Table};

/// Schema operations for one connection and grammar.
///
/// ```ignore
/// let schema = db.schema();
/// schema.create_table("users", |t| {
///     t.id("id");
///     t.string("email", 120).unique();
///     t.timestamps();
/// })?;
/// schema.alter_table("users", |t| {
///     t.string("nickname", 40).nullable();
/// })?;
/// ```
#[derive(Clone)]
pub struct Schema {
    grammar: Arc<dyn SchemaGrammar>,
    connection: Arc<dyn Connection>,
    schema: String,
}

impl Schema {
    /// The schema searched for unqualified names comes from the grammar's
    /// default for `config`.
    pub fn new(grammar: Arc<dyn SchemaGrammar>, connection: Arc<dyn Connection>, config: &Config) -> Self {
        let schema = grammar.default_schema(config);
        Self {
            grammar,
            connection,
            schema,
        }
    }

    pub fn grammar(&self) -> &dyn SchemaGrammar {
        self.grammar.as_ref()
    }

    /// Schema used for unqualified table names.
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn create_table(&self, name: &str, build: impl FnOnce(&mut Table)) -> Result<()> {
        self.create_table_with(name, &CreateTableOptions::default(), build)
    }

    #[tracing::instrument(level = "trace", skip(self, options, build))]
    pub fn create_table_with(
        &self,
        name: &str,
        options: &CreateTableOptions,
        build: impl FnOnce(&mut Table),
    ) -> Result<()> {
        let mut table = Table::new(name);
        build(&mut table);
        tracing::debug!(driver = self.grammar.driver(), table = name, "Creating table");
        self.grammar
            .create_table(self.connection.as_ref(), &mut table, options)
    }

    /// Reflect `name`, let `build` record changes against the current
    /// structure, then replay them.
    #[tracing::instrument(level = "trace", skip(self, build))]
    pub fn alter_table(&self, name: &str, build: impl FnOnce(&mut Table)) -> Result<()> {
        let mut table = self.get_table(name)?;
        build(&mut table);
        tracing::debug!(
            driver = self.grammar.driver(),
            table = name,
            commands = table.commands().len(),
            "Altering table"
        );
        self.grammar.alter_table(self.connection.as_ref(), &mut table)
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.grammar.drop_table(self.connection.as_ref(), name)
    }

    pub fn drop_table_if_exists(&self, name: &str) -> Result<()> {
        self.grammar
            .drop_table_if_exists(self.connection.as_ref(), &self.schema, name)
    }

    pub fn rename_table(&self, from: &str, to: &str) -> Result<()> {
        self.grammar.rename_table(self.connection.as_ref(), from, to)
    }

    pub fn has_table(&self, name: &str) -> Result<bool> {
        self.grammar
            .table_exists(self.connection.as_ref(), &self.schema, name)
    }

    pub fn get_table(&self, name: &str) -> Result<Table> {
        self.grammar
            .get_table(self.connection.as_ref(), &self.schema, name)
    }

    pub fn get_tables(&self) -> Result<Vec<String>> {
        self.grammar.get_tables(self.connection.as_ref(), &self.schema)
    }

    pub fn get_version(&self) -> Result<Version> {
        self.grammar.get_version(self.connection.as_ref())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("grammar", &self.grammar)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::testing::{Recorder, row};
    use dbal_core::{Dialect, SchemaErrorKind, Value};
    use dbal_query::{MySql, Sqlite};

    fn mysql(conn: Recorder) -> (Schema, Arc<Recorder>) {
        let conn = Arc::new(conn);
        let config = Config::new("mysql", "root@tcp(localhost)/blog").database("blog");
        let schema = Schema::new(Arc::new(MySql::new(&config)), conn.clone(), &config);
        (schema, conn)
    }

    #[test]
    fn test_create_table() {
        let (schema, conn) = mysql(Recorder::new(Dialect::MySql));
        assert_eq!(schema.schema_name(), "blog");
        schema
            .create_table("tags", |t| {
                t.increments("id").primary();
                t.string("label", 32);
            })
            .unwrap();
        assert_eq!(
            conn.statements(),
            vec!["CREATE TABLE `tags` (\n  `id` INT UNSIGNED NOT NULL AUTO_INCREMENT,\n  `label` VARCHAR(32) NOT NULL,\n  PRIMARY KEY (`id`)\n)"]
        );
    }

    #[test]
    fn test_alter_table_reflects_first() {
        let conn = Recorder::new(Dialect::MySql)
            .answer("information_schema.TABLES", vec![row(&[("name", Value::from("tags"))])])
            .answer(
                "information_schema.COLUMNS",
                vec![row(&[
                    ("column_name", Value::from("label")),
                    ("data_type", Value::from("VARCHAR")),
                    ("type_name", Value::from("varchar(32)")),
                    ("max_length", Value::Int(32)),
                ])],
            );
        let (schema, conn) = mysql(conn);
        schema
            .alter_table("tags", |t| {
                assert!(t.has_column(&["label"]));
                t.string("label", 64);
                t.string("slug", 64).nullable();
            })
            .unwrap();
        assert_eq!(
            conn.statements(),
            vec![
                "ALTER TABLE `tags` MODIFY COLUMN `label` VARCHAR(64) NOT NULL",
                "ALTER TABLE `tags` ADD COLUMN `slug` VARCHAR(64) NULL",
            ]
        );
    }

    #[test]
    fn test_alter_missing_table() {
        let (schema, conn) = mysql(Recorder::new(Dialect::MySql));
        let err = schema.alter_table("ghost", |t| {
            t.text("body");
        });
        assert_eq!(err.unwrap_err().schema_kind(), Some(SchemaErrorKind::TableNotFound));
        assert!(conn.statements().is_empty());
    }

    #[test]
    fn test_table_listing_and_drops() {
        let conn = Arc::new(
            Recorder::new(Dialect::Sqlite).answer(
                "sqlite_master",
                vec![row(&[("name", Value::from("posts"))]), row(&[("name", Value::from("tags"))])],
            ),
        );
        let config = Config::new("sqlite3", "file::memory:");
        let schema = Schema::new(Arc::new(Sqlite::new(&config)), conn.clone(), &config);
        assert_eq!(schema.get_tables().unwrap(), vec!["posts", "tags"]);
        assert!(schema.has_table("tags").unwrap());
        assert!(!schema.has_table("users").unwrap());

        schema.drop_table_if_exists("tags").unwrap();
        schema.rename_table("posts", "articles").unwrap();
        assert_eq!(
            conn.statements(),
            vec![
                "DROP TABLE IF EXISTS `tags`",
                "ALTER TABLE `posts` RENAME TO `articles`",
            ]
        );
    }
}
