//! SQLite grammar.

use dbal_core::{Config, Connection, Dialect, Result, Value};

use super::{Grammar, needs_row_id, on_conflict_update, plain_delete, plain_update};
use crate::clause::{DatePart, Lock};
use crate::expr::Operand;
use crate::query::Query;
use crate::record::UpsertUpdate;

const ROW_ID: &str = "rowid";

/// SQLite creates `sqlite_sequence` with the first AUTOINCREMENT table.
const SEQUENCE_TABLE: &str =
    "select 1 from sqlite_master where type = 'table' and name = 'sqlite_sequence'";

#[derive(Debug, Clone, Default)]
pub struct Sqlite {
    prefix: String,
}

impl Sqlite {
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

impl Grammar for Sqlite {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn driver(&self) -> &str {
        "sqlite3"
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn where_date_part(&self, part: DatePart, column: &str, operator: &str, value: &str) -> String {
        let format = match part {
            DatePart::Date => "%Y-%m-%d",
            DatePart::Time => "%H:%M:%S",
            DatePart::Year => "%Y",
            DatePart::Month => "%m",
            DatePart::Day => "%d",
        };
        format!("strftime('{format}',{column}) {operator} cast({value} as text)")
    }

    fn compile_limit(&self, query: &Query) -> String {
        match (query.limit, query.offset) {
            (Some(limit), _) => format!("limit {limit}"),
            (None, Some(_)) => "limit -1".to_string(),
            (None, None) => String::new(),
        }
    }

    /// SQLite locks whole databases; row lock clauses are dropped.
    fn compile_lock(&self, _lock: Option<Lock>) -> String {
        String::new()
    }

    fn compile_insert_or_ignore(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
    ) -> (String, Vec<Value>) {
        let (sql, bindings) = self.compile_insert(query, columns, rows);
        (sql.replacen("insert into", "insert or ignore into", 1), bindings)
    }

    /// Joins and paging go through the row-id rewrite.
    fn unsupported_write(&self, _query: &Query) -> Option<String> {
        None
    }

    fn compile_update(&self, query: &Query, values: &[(String, Operand)]) -> (String, Vec<Value>) {
        if needs_row_id(query) {
            return self.compile_update_by_row_id(query, values, ROW_ID);
        }
        plain_update(self, query, values)
    }

    fn compile_delete(&self, query: &Query) -> (String, Vec<Value>) {
        if needs_row_id(query) {
            return self.compile_delete_by_row_id(query, ROW_ID);
        }
        plain_delete(self, query, false)
    }

    /// Empty the table, then reset its autoincrement counter.
    fn compile_truncate(&self, query: &Query) -> Vec<(String, Vec<Value>)> {
        let table = format!("{}{}", self.prefix, query.table_name().unwrap_or_default());
        vec![
            (format!("delete from {}", self.write_table(query)), Vec::new()),
            (
                "delete from sqlite_sequence where name = ?".to_string(),
                vec![Value::Text(table)],
            ),
        ]
    }

    /// The counter reset only runs when `sqlite_sequence` exists.
    fn process_truncate(&self, conn: &dyn Connection, query: &Query) -> Result<()> {
        let mut statements = self.compile_truncate(query).into_iter();
        if let Some((sql, bindings)) = statements.next() {
            conn.execute(&sql, &bindings)?;
        }
        if conn.query_one(SEQUENCE_TABLE, &[])?.is_none() {
            tracing::debug!(driver = "sqlite3", "No autoincrement counters to reset");
            return Ok(());
        }
        for (sql, bindings) in statements {
            conn.execute(&sql, &bindings)?;
        }
        Ok(())
    }

    fn compile_upsert(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
        unique_by: &[String],
        update: &UpsertUpdate,
    ) -> (String, Vec<Value>) {
        let insert = self.compile_insert(query, columns, rows);
        on_conflict_update(self, insert, unique_by, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::record::Record;
    use std::sync::Arc;

    fn qb() -> Builder {
        Builder::new(Arc::new(Sqlite::default()))
    }

    #[test]
    fn test_where_date_uses_strftime() {
        let mut q = qb();
        q.table("t").where_date("created_at", ">", "2021-03-25");
        assert_eq!(
            q.to_sql(),
            "select * from `t` where strftime('%Y-%m-%d',`created_at`) > cast(? as text)"
        );
        q.reset();
        q.table("t").or_where_month("created_at", "=", 3);
        assert_eq!(
            q.to_sql(),
            "select * from `t` where strftime('%m',`created_at`) = cast(? as text)"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        let mut q = qb();
        q.table("t").skip(10);
        assert_eq!(q.to_sql(), "select * from `t` limit -1 offset 10");
    }

    #[test]
    fn test_lock_is_dropped() {
        let mut q = qb();
        q.table("t").lock_for_update();
        assert_eq!(q.to_sql(), "select * from `t`");
    }

    #[test]
    fn test_insert_or_ignore() {
        let mut q = qb();
        q.table("t");
        let (sql, _) = q.compile_insert_or_ignore(&[Record::new().set("a", 1)]);
        assert_eq!(sql, "insert or ignore into `t` (`a`) values (?)");
    }

    #[test]
    fn test_truncate_resets_sequence() {
        let mut q = Builder::new(Arc::new(Sqlite::with_prefix("xun_")));
        q.table("users");
        let statements = q.compile_truncate();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].0, "delete from `xun_users`");
        assert_eq!(statements[1].0, "delete from sqlite_sequence where name = ?");
        assert_eq!(statements[1].1, vec![Value::Text("xun_users".into())]);
    }

    #[test]
    fn test_delete_with_alias_uses_rowid() {
        let mut q = qb();
        q.table("users as u").where_eq("u.vote", 0).limit(5);
        let (sql, bindings) = q.compile_delete();
        assert_eq!(
            sql,
            "delete from `users` as `u` where `rowid` in (select `u`.`rowid` from `users` as `u` where `u`.`vote` = ? limit 5)"
        );
        assert_eq!(bindings, vec![Value::Int(0)]);
    }

    #[test]
    fn test_aliased_writes_keep_alias() {
        let mut q = qb();
        q.table("users as u").where_eq("u.vote", 0);
        assert_eq!(q.compile_delete().0, "delete from `users` as `u` where `u`.`vote` = ?");
        let (sql, bindings) = q.compile_update(&Record::new().set("vote", 1));
        assert_eq!(sql, "update `users` as `u` set `vote` = ? where `u`.`vote` = ?");
        assert_eq!(bindings, vec![Value::Int(1), Value::Int(0)]);
    }

    #[test]
    fn test_offset_only_write_uses_rowid() {
        let mut q = qb();
        q.table("logs").order_by("id", "asc").skip(100);
        let (sql, _) = q.compile_delete();
        assert_eq!(
            sql,
            "delete from `logs` where `rowid` in (select `rowid` from `logs` order by `id` asc limit -1 offset 100)"
        );
    }

    #[test]
    fn test_upsert_excluded() {
        let mut q = qb();
        q.table("users");
        let (sql, _) = q.compile_upsert(
            &[Record::new().set("email", "a@x").set("vote", 1)],
            &["email"],
            UpsertUpdate::columns(["vote"]),
        );
        assert_eq!(
            sql,
            "insert into `users` (`email`, `vote`) values (?,?) on conflict (`email`) do update set `vote` = `excluded`.`vote`"
        );
    }
}
