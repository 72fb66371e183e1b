//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dbal::{Config, Connection, Db, Dialect, Error, PreparedStatement, Registry, Result, Row, Value};

/// Records statements and queries with their bindings, answering queries
/// with canned rows keyed by a substring of the SQL.
pub struct Recorder {
    dialect: Dialect,
    executed: Mutex<Vec<(String, Vec<Value>)>>,
    queried: Mutex<Vec<(String, Vec<Value>)>>,
    answers: Vec<(&'static str, Vec<Row>)>,
    reject: Option<&'static str>,
}

impl Recorder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            executed: Mutex::new(Vec::new()),
            queried: Mutex::new(Vec::new()),
            answers: Vec::new(),
            reject: None,
        }
    }

    pub fn answer(mut self, needle: &'static str, rows: Vec<Row>) -> Self {
        self.answers.push((needle, rows));
        self
    }

    /// Fail every statement containing `needle`.
    pub fn reject(mut self, needle: &'static str) -> Self {
        self.reject = Some(needle);
        self
    }

    /// Executed statements, in order.
    pub fn statements(&self) -> Vec<String> {
        self.executed.lock().unwrap().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn statement_bindings(&self, index: usize) -> Vec<Value> {
        self.executed.lock().unwrap()[index].1.clone()
    }

    /// Row-returning queries, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queried.lock().unwrap().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn query_bindings(&self, index: usize) -> Vec<Value> {
        self.queried.lock().unwrap()[index].1.clone()
    }
}

impl Connection for Recorder {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.queried.lock().unwrap().push((sql.to_string(), params.to_vec()));
        Ok(self
            .answers
            .iter()
            .find(|(needle, _)| sql.contains(needle))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        if self.reject.is_some_and(|needle| sql.contains(needle)) {
            return Err(Error::query("statement rejected", sql));
        }
        self.executed.lock().unwrap().push((sql.to_string(), params.to_vec()));
        Ok(1)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        self.execute(sql, params).map(|_| 1)
    }

    fn prepare(&self, sql: &str) -> Result<PreparedStatement> {
        Ok(PreparedStatement::new(1, sql, sql.matches('?').count()))
    }
}

pub fn row(cells: &[(&str, Value)]) -> Row {
    Row::new(
        cells.iter().map(|(name, _)| (*name).to_string()).collect(),
        cells.iter().map(|(_, value)| value.clone()).collect(),
    )
}

/// A handle for `driver` over `conn`.
pub fn db(driver: &str, conn: Recorder) -> (Db, Arc<Recorder>) {
    db_with(Config::new(driver, "test"), conn)
}

pub fn db_with(config: Config, conn: Recorder) -> (Db, Arc<Recorder>) {
    let conn = Arc::new(conn);
    let db = Db::new(&Registry::with_defaults(), config, conn.clone()).unwrap();
    (db, conn)
}
