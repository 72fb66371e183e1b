//! The driver collaborator contract.
//!
//! dbal never talks to a database itself. Grammars compile SQL and the
//! [`Connection`] supplied by a driver executes it. Everything here is
//! blocking from the caller's point of view; pooling, retries and timeouts
//! belong to the driver.

use std::sync::Arc;

use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;

/// A prepared statement handle returned by [`Connection::prepare`].
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    /// Driver-specific identifier
    id: u64,
    sql: String,
    param_count: usize,
}

impl PreparedStatement {
    /// Create a new prepared statement. Called by drivers.
    #[must_use]
    pub fn new(id: u64, sql: impl Into<String>, param_count: usize) -> Self {
        Self {
            id,
            sql: sql.into(),
            param_count,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub const fn param_count(&self) -> usize {
        self.param_count
    }

    /// Check if the provided parameters match the expected count.
    #[must_use]
    pub fn validate_params(&self, params: &[Value]) -> bool {
        params.len() == self.param_count
    }
}

/// A live database handle.
///
/// Errors returned by a driver are propagated to the caller unchanged.
pub trait Connection: Send + Sync {
    /// The dialect spoken by the server on the other end.
    fn dialect(&self) -> Dialect;

    /// Run a statement that returns rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Run a statement and return the first row, if any.
    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Run an INSERT and return the driver's last insert id.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64>;

    /// Prepare a statement for repeated execution.
    fn prepare(&self, sql: &str) -> Result<PreparedStatement>;

    /// Execute a previously prepared statement.
    fn execute_prepared(&self, stmt: &PreparedStatement, params: &[Value]) -> Result<u64> {
        if !stmt.validate_params(params) {
            return Err(Error::query(
                format!(
                    "expected {} parameters, got {}",
                    stmt.param_count(),
                    params.len()
                ),
                stmt.sql(),
            ));
        }
        self.execute(stmt.sql(), params)
    }
}

/// Opens connections from a [`Config`].
pub trait Driver: Send + Sync {
    /// Connect using the config's DSN.
    fn connect(&self, config: &Config) -> Result<Arc<dyn Connection>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        executed: Mutex<Vec<String>>,
    }

    impl Connection for Recorder {
        fn dialect(&self) -> Dialect {
            Dialect::MySql
        }

        fn query(&self, _sql: &str, _params: &[Value]) -> Result<Vec<Row>> {
            Ok(vec![Row::new(vec!["n".into()], vec![Value::Int(1)])])
        }

        fn execute(&self, sql: &str, _params: &[Value]) -> Result<u64> {
            self.executed.lock().unwrap().push(sql.to_string());
            Ok(1)
        }

        fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
            self.execute(sql, params).map(|_| 7)
        }

        fn prepare(&self, sql: &str) -> Result<PreparedStatement> {
            Ok(PreparedStatement::new(1, sql, sql.matches('?').count()))
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            executed: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_prepared_statement_validate_params() {
        let stmt = PreparedStatement::new(1, "select ?, ?", 2);
        assert_eq!(stmt.id(), 1);
        assert_eq!(stmt.sql(), "select ?, ?");
        assert!(!stmt.validate_params(&[Value::Int(1)]));
        assert!(stmt.validate_params(&[Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_execute_prepared_checks_arity() {
        let conn = recorder();
        let stmt = conn.prepare("delete from `t` where `id` = ?").unwrap();
        assert!(conn.execute_prepared(&stmt, &[]).is_err());
        assert_eq!(conn.execute_prepared(&stmt, &[Value::Int(3)]).unwrap(), 1);
        assert_eq!(conn.executed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_query_one_default() {
        let conn = recorder();
        let row = conn.query_one("select 1 as n", &[]).unwrap().unwrap();
        assert_eq!(row.get_named::<i64>("n").unwrap(), 1);
    }
}
