//! SAP HANA grammar.

use dbal_core::{Config, Connection, Dialect, Error, Result, Value};

use super::{Grammar, needs_row_id, plain_delete, plain_update};
use crate::clause::{DatePart, FromClause, Lock};
use crate::expr::Operand;
use crate::query::Query;
use crate::record::UpsertUpdate;

const ROW_ID: &str = "$rowid$";

const HANA_OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "like", "not like", "between", "ilike", "not ilike",
    "~", "&", "|", "#", "<<", ">>", "<<=", ">>=", "&&", "@>", "<@", "?", "?|", "?&", "||", "-",
    "@?", "@@", "#-", "is distinct from", "is not distinct from",
];

#[derive(Debug, Clone, Default)]
pub struct Hana {
    prefix: String,
}

impl Hana {
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

    /// `(?,?)` for one row, `select ?,? from dummy union all ...` for many.
    fn compile_rows(&self, rows: &[Vec<Operand>]) -> (String, Vec<Value>) {
        let mut offset = 0;
        let bindings = rows.iter().flatten().flat_map(Operand::bindings).collect();
        let sql = match rows {
            [row] => format!("values ({})", self.parameterize(row, &mut offset)),
            _ => rows
                .iter()
                .map(|row| format!("select {} from dummy", self.parameterize(row, &mut offset)))
                .collect::<Vec<_>>()
                .join(" union all "),
        };
        (sql, bindings)
    }

    fn compile_write(
        &self,
        verb: &str,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
    ) -> (String, Vec<Value>) {
        let table = self.write_table(query);
        if columns.is_empty() || rows.is_empty() {
            return (format!("{verb} {table} default values"), Vec::new());
        }
        let (values, bindings) = self.compile_rows(rows);
        let sql = format!("{} {} ({}) {}", verb, table, self.columnize(columns), values);
        tracing::trace!(driver = "hdb", sql = %sql, "Compiled {verb}");
        (sql, bindings)
    }
}

impl Grammar for Hana {
    fn dialect(&self) -> Dialect {
        Dialect::Hana
    }

    fn driver(&self) -> &str {
        "hdb"
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn operators(&self) -> &[&'static str] {
        HANA_OPERATORS
    }

    fn where_date_part(&self, part: DatePart, column: &str, operator: &str, value: &str) -> String {
        let function = match part {
            DatePart::Date => "to_date",
            DatePart::Time => "to_time",
            DatePart::Year => "year",
            DatePart::Month => "month",
            DatePart::Day => "dayofmonth",
        };
        format!("{function}({column}) {operator} {value}")
    }

    /// HANA requires a source; selects without one read from `dummy`.
    fn compile_from(&self, from: Option<&FromClause>, offset: &mut usize) -> String {
        match from {
            Some(f) => format!("from {}", self.compile_source(f, offset)),
            None => "from dummy".to_string(),
        }
    }

    fn compile_lock(&self, lock: Option<Lock>) -> String {
        match lock {
            Some(Lock::Update) => "for update".to_string(),
            Some(Lock::Shared) => "for share lock".to_string(),
            None => String::new(),
        }
    }

    fn compile_exists(&self, query: &Query) -> String {
        format!(
            "select case when exists({}) then 1 else 0 end as {} from dummy",
            self.compile_select(query),
            self.wrap_value("exists")
        )
    }

    fn compile_insert(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
    ) -> (String, Vec<Value>) {
        self.compile_write("insert into", query, columns, rows)
    }

    fn process_insert_get_id(
        &self,
        conn: &dyn Connection,
        sql: &str,
        bindings: &[Value],
        _sequence: Option<&str>,
    ) -> Result<i64> {
        const IDENTITY: &str = "select current_identity_value() FROM DUMMY";
        conn.execute(sql, bindings)?;
        let row = conn
            .query_one(IDENTITY, &[])?
            .ok_or_else(|| Error::query("no identity value", IDENTITY))?;
        row.get(0)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::query("identity value is not an integer", IDENTITY))
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

    /// Native `upsert`, matched on the primary key.
    fn compile_upsert(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
        _unique_by: &[String],
        _update: &UpsertUpdate,
    ) -> (String, Vec<Value>) {
        self.compile_write("upsert", query, columns, rows)
    }
}
