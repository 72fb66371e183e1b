//! Running compiled statements through the bound connection.

use std::sync::Arc;

use dbal_core::{Connection, Error, Result, Row, Value};

use crate::builder::Builder;
use crate::record::{Record, UpsertUpdate};

impl Builder {
    fn conn(&self) -> Result<&Arc<dyn Connection>> {
        self.connection()
            .ok_or_else(|| Error::config("query builder has no connection"))
    }

    /// Writes need a plain table source.
    fn target(&self) -> Result<&str> {
        self.query()
            .table_name()
            .ok_or_else(|| Error::invalid_input("no table selected for write statement"))
    }

    fn run_query(&self, sql: &str, bindings: &[Value]) -> Result<Vec<Row>> {
        tracing::debug!(
            driver = self.grammar().driver(),
            table = self.query().table_name().unwrap_or_default(),
            sql = %sql,
            bindings = bindings.len(),
            "Executing query"
        );
        self.conn()?.query(sql, bindings)
    }

    fn run_statement(&self, sql: &str, bindings: &[Value]) -> Result<u64> {
        tracing::debug!(
            driver = self.grammar().driver(),
            table = self.query().table_name().unwrap_or_default(),
            sql = %sql,
            bindings = bindings.len(),
            "Executing statement"
        );
        self.conn()?.execute(sql, bindings)
    }

    /// Fetch every matching row.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn get(&self) -> Result<Vec<Row>> {
        let (sql, bindings) = self.try_compile()?;
        self.run_query(&sql, &bindings)
    }

    /// Fetch the first matching row.
    pub fn first(&self) -> Result<Option<Row>> {
        let mut one = self.clone();
        one.limit(1);
        Ok(one.get()?.into_iter().next())
    }

    pub fn exists(&self) -> Result<bool> {
        self.check()?;
        let sql = self.compile_exists();
        let rows = self.run_query(&sql, &self.bindings())?;
        Ok(rows
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    /// Run `function(column)` over the matching rows.
    pub fn aggregate(&self, function: &str, column: &str) -> Result<Value> {
        self.check()?;
        let (sql, bindings) = self.compile_aggregate(function, column);
        let rows = self.run_query(&sql, &bindings)?;
        Ok(rows
            .first()
            .and_then(|row| row.get(0))
            .cloned()
            .unwrap_or(Value::Null))
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self.aggregate("count", "*")?.as_i64().unwrap_or(0))
    }

    pub fn max(&self, column: &str) -> Result<Value> {
        self.aggregate("max", column)
    }

    pub fn min(&self, column: &str) -> Result<Value> {
        self.aggregate("min", column)
    }

    pub fn sum(&self, column: &str) -> Result<Value> {
        self.aggregate("sum", column)
    }

    pub fn avg(&self, column: &str) -> Result<Value> {
        self.aggregate("avg", column)
    }

    /// Insert one statement covering every record; returns affected rows.
    #[tracing::instrument(level = "trace", skip_all, fields(rows = records.len()))]
    pub fn insert(&self, records: &[Record]) -> Result<u64> {
        self.target()?;
        let (sql, bindings) = self.compile_insert(records);
        self.run_statement(&sql, &bindings)
    }

    pub fn insert_or_ignore(&self, records: &[Record]) -> Result<u64> {
        self.target()?;
        let (sql, bindings) = self.compile_insert_or_ignore(records);
        self.run_statement(&sql, &bindings)
    }

    /// Insert one record and return its generated id. `sequence` names the
    /// id column where the dialect returns it explicitly (default `id`).
    pub fn insert_get_id(&self, record: &Record, sequence: Option<&str>) -> Result<i64> {
        self.target()?;
        let (sql, bindings) = self.compile_insert_get_id(record, sequence);
        tracing::debug!(driver = self.grammar().driver(), sql = %sql, "Executing insert");
        self.grammar()
            .process_insert_get_id(self.conn()?.as_ref(), &sql, &bindings, sequence)
    }

    /// `insert into t (columns) select ...`.
    pub fn insert_using(&self, columns: &[&str], build: impl FnOnce(&mut Builder)) -> Result<u64> {
        self.target()?;
        let (sql, bindings) = self.compile_insert_using(columns, build);
        self.run_statement(&sql, &bindings)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn update(&self, values: &Record) -> Result<u64> {
        self.check_write()?;
        self.target()?;
        let (sql, bindings) = self.compile_update(values);
        self.run_statement(&sql, &bindings)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn delete(&self) -> Result<u64> {
        self.check_write()?;
        self.target()?;
        let (sql, bindings) = self.compile_delete();
        self.run_statement(&sql, &bindings)
    }

    /// Insert records or update the ones that collide on `unique_by`.
    pub fn upsert(&self, records: &[Record], unique_by: &[&str], update: UpsertUpdate) -> Result<u64> {
        self.target()?;
        let (sql, bindings) = self.compile_upsert(records, unique_by, update);
        self.run_statement(&sql, &bindings)
    }

    pub fn truncate(&self) -> Result<()> {
        let table = self.target()?;
        tracing::debug!(driver = self.grammar().driver(), table, "Truncating");
        self.grammar().process_truncate(self.conn()?.as_ref(), self.query())
    }
}
