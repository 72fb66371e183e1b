//! MySQL / MariaDB grammar.

use dbal_core::{Config, Dialect, Value};

use super::{Grammar, join_parts, plain_delete};
use crate::clause::Lock;
use crate::expr::Operand;
use crate::query::Query;
use crate::record::UpsertUpdate;

/// Largest row count MySQL accepts, used when only an offset is given.
const MAX_ROWS: u64 = 18_446_744_073_709_551_615;

#[derive(Debug, Clone, Default)]
pub struct MySql {
    prefix: String,
}

impl MySql {
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

impl Grammar for MySql {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn driver(&self) -> &str {
        "mysql"
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn compile_limit(&self, query: &Query) -> String {
        match (query.limit, query.offset) {
            (Some(limit), _) => format!("limit {limit}"),
            (None, Some(_)) => format!("limit {MAX_ROWS}"),
            (None, None) => String::new(),
        }
    }

    fn compile_lock(&self, lock: Option<Lock>) -> String {
        match lock {
            Some(Lock::Update) => "for update".to_string(),
            Some(Lock::Shared) => "lock in share mode".to_string(),
            None => String::new(),
        }
    }

    fn compile_insert(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
    ) -> (String, Vec<Value>) {
        if columns.is_empty() || rows.is_empty() {
            return (
                format!("insert into {} () values ()", self.write_table(query)),
                Vec::new(),
            );
        }
        let mut offset = 0;
        let values = rows
            .iter()
            .map(|row| format!("({})", self.parameterize(row, &mut offset)))
            .collect::<Vec<_>>()
            .join(", ");
        let bindings = rows.iter().flatten().flat_map(Operand::bindings).collect();
        let sql = format!(
            "insert into {} ({}) values {}",
            self.write_table(query),
            self.columnize(columns),
            values
        );
        tracing::trace!(driver = "mysql", sql = %sql, "Compiled insert");
        (sql, bindings)
    }

    fn compile_insert_or_ignore(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
    ) -> (String, Vec<Value>) {
        let (sql, bindings) = self.compile_insert(query, columns, rows);
        (sql.replacen("insert into", "insert ignore into", 1), bindings)
    }

    /// Joined writes drop ordering and limit, which MySQL only accepts on
    /// single-table UPDATE/DELETE.
    fn unsupported_write(&self, query: &Query) -> Option<String> {
        let paged = query.limit.is_some() || query.offset.is_some() || !query.orders.is_empty();
        (!query.joins.is_empty() && paged)
            .then(|| "mysql cannot order or limit a joined UPDATE/DELETE; ordering and limit were dropped".to_string())
    }

    /// `update t [joins] set ... [where] [order] [limit]`, ordering and
    /// limit only without joins.
    fn compile_update(&self, query: &Query, values: &[(String, Operand)]) -> (String, Vec<Value>) {
        let mut offset = 0;
        let table = query
            .from
            .as_ref()
            .map(|f| self.compile_source(f, &mut offset))
            .unwrap_or_default();
        let joins = self.compile_joins(&query.joins);
        let set = self.compile_update_columns(values, &mut offset);
        let wheres = self.compile_wheres(&query.wheres, &mut offset);
        let mut bindings = query.bindings.from.clone();
        bindings.extend(query.bindings.join.iter().cloned());
        bindings.extend(values.iter().flat_map(|(_, v)| v.bindings()));
        bindings.extend(query.bindings.where_.iter().cloned());

        let mut parts = vec![format!("update {table}"), joins, format!("set {set}"), wheres];
        if query.joins.is_empty() {
            parts.push(self.compile_orders(&query.orders, &mut offset));
            parts.push(self.compile_limit(query));
            bindings.extend(query.bindings.order.iter().cloned());
        }
        let sql = join_parts(parts);
        tracing::trace!(driver = "mysql", sql = %sql, "Compiled update");
        (sql, bindings)
    }

    /// `delete t from t join ...` when joins are present.
    fn compile_delete(&self, query: &Query) -> (String, Vec<Value>) {
        let Some(from) = query.from.as_ref().filter(|_| !query.joins.is_empty()) else {
            return plain_delete(self, query, true);
        };
        let mut offset = 0;
        let target = match from.alias() {
            Some(alias) => self.wrap_value(&format!("{}{}", self.prefix, alias)),
            None => self.write_table(query),
        };
        let source = self.compile_source(from, &mut offset);
        let sql = join_parts([
            format!("delete {target} from {source}"),
            self.compile_joins(&query.joins),
            self.compile_wheres(&query.wheres, &mut offset),
        ]);
        let mut bindings = query.bindings.from.clone();
        bindings.extend(query.bindings.join.iter().cloned());
        bindings.extend(query.bindings.where_.iter().cloned());
        tracing::trace!(driver = "mysql", sql = %sql, "Compiled delete");
        (sql, bindings)
    }

    fn compile_upsert(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
        _unique_by: &[String],
        update: &UpsertUpdate,
    ) -> (String, Vec<Value>) {
        let (mut sql, mut bindings) = self.compile_insert(query, columns, rows);
        let set = match update {
            UpsertUpdate::Columns(columns) => columns
                .iter()
                .map(|c| {
                    let column = self.wrap(c);
                    format!("{column} = values({column})")
                })
                .collect::<Vec<_>>()
                .join(", "),
            UpsertUpdate::Values(record) => {
                let mut offset = bindings.len();
                bindings.extend(record.fields().iter().flat_map(|(_, v)| v.bindings()));
                self.compile_update_columns(record.fields(), &mut offset)
            }
        };
        if !set.is_empty() {
            sql.push_str(&format!(" on duplicate key update {set}"));
        }
        (sql, bindings)
    }
}
