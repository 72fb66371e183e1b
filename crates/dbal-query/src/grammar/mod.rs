//! Query grammars.
//!
//! [`Grammar`] carries the base SQL compilation as provided methods; each
//! dialect struct overrides only the pieces where its SQL diverges. Every
//! compile method walks clauses in textual order and threads a running
//! placeholder counter, so `$N` numbering stays correct across nested
//! sub-queries and the binding list always lines up with the placeholders.

mod hana;
mod mysql;
mod postgres;
mod sql;
mod sqlite;

use std::fmt;
use std::sync::OnceLock;

use dbal_core::{Connection, Dialect, Result, Value};
use regex::Regex;

use crate::clause::{DatePart, FromClause, Having, Join, JoinType, Lock, OrderBy, Where};
use crate::expr::{Operand, Selectable};
use crate::query::Query;
use crate::record::UpsertUpdate;

pub use hana::Hana;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sql::Sql;
pub use sqlite::Sqlite;

/// Operators accepted by the MySQL, PostgreSQL, SQLite and generic grammars.
pub const DEFAULT_OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "<=>", "like", "like binary", "not like", "ilike",
    "&", "|", "^", "<<", ">>", "rlike", "not rlike", "regexp", "not regexp", "~", "~*", "!~",
    "!~*", "similar to", "not similar to", "not ilike", "~~*", "!~~*",
];

fn alias_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^\s*(.+?)\s+as\s+(\S+)\s*$").expect("alias regex"))
}

fn comma_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*,\s*").expect("comma regex"))
}

/// Split `"name as alias"` (case-insensitive `as`).
pub fn split_alias(value: &str) -> Option<(&str, &str)> {
    let caps = alias_regex().captures(value)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Split a comma separated column list, dropping empty entries.
pub fn split_columns(list: &str) -> Vec<String> {
    comma_regex()
        .split(list.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn join_parts(parts: impl IntoIterator<Item = String>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compiles [`Query`] state into SQL text plus an ordered binding list.
pub trait Grammar: Send + Sync + fmt::Debug {
    fn dialect(&self) -> Dialect;

    /// Registry key of this grammar.
    fn driver(&self) -> &str;

    /// Table name prefix.
    fn prefix(&self) -> &str;

    fn operators(&self) -> &[&'static str] {
        DEFAULT_OPERATORS
    }

    fn is_operator(&self, operator: &str) -> bool {
        let operator = operator.trim().to_ascii_lowercase();
        self.operators().iter().any(|o| *o == operator)
    }

    // ---- quoting -------------------------------------------------------

    /// Quote one identifier segment; `*` passes through.
    fn wrap_value(&self, segment: &str) -> String {
        if segment == "*" {
            "*".to_string()
        } else {
            self.dialect().quote_identifier(segment)
        }
    }

    /// Quote a column reference: `col`, `table.col`, `schema.table.col`,
    /// each optionally followed by `as alias`. The table segment gets the
    /// prefix.
    fn wrap(&self, value: &str) -> String {
        if let Some((name, alias)) = split_alias(value) {
            return format!("{} as {}", self.wrap(name), self.wrap_value(alias));
        }
        let segments: Vec<&str> = value.trim().split('.').collect();
        let table_at = segments.len().checked_sub(2);
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if Some(i) == table_at {
                    self.wrap_value(&format!("{}{}", self.prefix(), segment))
                } else {
                    self.wrap_value(segment)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote a table reference (`table`, `schema.table`, `table as alias`)
    /// applying the prefix to the table and alias.
    fn wrap_table(&self, table: &str) -> String {
        if let Some((name, alias)) = split_alias(table) {
            return format!(
                "{} as {}",
                self.wrap_table(name),
                self.wrap_value(&format!("{}{}", self.prefix(), alias))
            );
        }
        let segments: Vec<&str> = table.trim().split('.').collect();
        let last = segments.len() - 1;
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if i == last {
                    self.wrap_value(&format!("{}{}", self.prefix(), segment))
                } else {
                    self.wrap_value(segment)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render one operand, advancing `offset` for every placeholder emitted.
    fn parameter(&self, value: &Operand, offset: &mut usize) -> String {
        match value {
            Operand::Value(_) => {
                *offset += 1;
                self.dialect().placeholder(*offset)
            }
            Operand::Raw(r) => r.as_str().to_string(),
            Operand::Column(c) => self.wrap(c),
            Operand::Sub(q) => format!("({})", self.compile_select_offset(q, offset)),
        }
    }

    fn parameterize(&self, values: &[Operand], offset: &mut usize) -> String {
        values
            .iter()
            .map(|v| self.parameter(v, offset))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn columnize(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.wrap(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Emit a raw fragment carrying `bindings` positional `?` markers,
    /// renumbering them for dialects with numbered placeholders.
    fn raw_fragment(&self, sql: &str, bindings: usize, offset: &mut usize) -> String {
        if !self.dialect().numbered_placeholders() {
            *offset += bindings;
            return sql.to_string();
        }
        let mut out = String::with_capacity(sql.len() + bindings * 2);
        let mut remaining = bindings;
        for c in sql.chars() {
            if c == '?' && remaining > 0 {
                remaining -= 1;
                *offset += 1;
                out.push_str(&self.dialect().placeholder(*offset));
            } else {
                out.push(c);
            }
        }
        *offset += remaining;
        out
    }

    // ---- select --------------------------------------------------------

    fn compile_select(&self, query: &Query) -> String {
        let mut offset = 0;
        let sql = self.compile_select_offset(query, &mut offset);
        tracing::trace!(driver = self.driver(), sql = %sql, "Compiled select");
        sql
    }

    /// Compile a select whose first placeholder is `offset + 1`.
    fn compile_select_offset(&self, query: &Query, offset: &mut usize) -> String {
        join_parts([
            self.compile_columns(query, offset),
            self.compile_from(query.from.as_ref(), offset),
            self.compile_joins(&query.joins),
            self.compile_wheres(&query.wheres, offset),
            self.compile_groups(&query.groups),
            self.compile_havings(&query.havings, offset),
            self.compile_orders(&query.orders, offset),
            self.compile_limit(query),
            self.compile_offset(query),
            self.compile_lock(query.lock),
        ])
    }

    fn compile_columns(&self, query: &Query, offset: &mut usize) -> String {
        let select = if query.distinct {
            "select distinct"
        } else {
            "select"
        };
        if query.columns.is_empty() {
            return format!("{select} *");
        }
        let columns = query
            .columns
            .iter()
            .map(|c| self.compile_selectable(c, offset))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{select} {columns}")
    }

    fn compile_selectable(&self, column: &Selectable, offset: &mut usize) -> String {
        match column {
            Selectable::Column(name) => self.wrap(name),
            Selectable::Raw { sql, bindings } => self.raw_fragment(sql, *bindings, offset),
            Selectable::Sub { query, alias } => format!(
                "({}) as {}",
                self.compile_select_offset(query, offset),
                self.wrap_value(alias)
            ),
        }
    }

    /// The table expression of a source, without the `from` keyword.
    fn compile_source(&self, from: &FromClause, offset: &mut usize) -> String {
        match from {
            FromClause::Table { name, alias: None } => self.wrap_table(name),
            FromClause::Table {
                name,
                alias: Some(alias),
            } => format!(
                "{} as {}",
                self.wrap_table(name),
                self.wrap_value(&format!("{}{}", self.prefix(), alias))
            ),
            FromClause::Sub { query, alias } => format!(
                "({}) as {}",
                self.compile_select_offset(query, offset),
                self.wrap_value(alias)
            ),
        }
    }

    fn compile_from(&self, from: Option<&FromClause>, offset: &mut usize) -> String {
        from.map_or_else(String::new, |f| {
            format!("from {}", self.compile_source(f, offset))
        })
    }

    fn compile_joins(&self, joins: &[Join]) -> String {
        joins
            .iter()
            .map(|join| {
                let table = self.wrap_table(&join.table);
                if join.join_type == JoinType::Cross || join.conditions.is_empty() {
                    return format!("{} {}", join.join_type.as_str(), table);
                }
                let on = join
                    .conditions
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let condition = format!(
                            "{} {} {}",
                            self.wrap(&c.first),
                            c.operator,
                            self.wrap(&c.second)
                        );
                        if i == 0 {
                            condition
                        } else {
                            format!("{} {}", c.boolean.as_str(), condition)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{} {} on {}", join.join_type.as_str(), table, on)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn compile_wheres(&self, wheres: &[Where], offset: &mut usize) -> String {
        if wheres.is_empty() {
            return String::new();
        }
        format!("where {}", self.compile_where_list(wheres, offset))
    }

    /// Conditions joined by their booleans, without the `where` keyword.
    fn compile_where_list(&self, wheres: &[Where], offset: &mut usize) -> String {
        wheres
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let sql = self.compile_where(w, offset);
                if i == 0 {
                    sql
                } else {
                    format!("{} {}", w.boolean().as_str(), sql)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn compile_where(&self, condition: &Where, offset: &mut usize) -> String {
        match condition {
            Where::Basic {
                column,
                operator,
                value,
                ..
            } => format!(
                "{} {} {}",
                self.wrap(column),
                operator,
                self.parameter(value, offset)
            ),
            Where::SubColumn {
                query,
                operator,
                value,
                ..
            } => {
                let sub = self.compile_select_offset(query, offset);
                format!("({}) {} {}", sub, operator, self.parameter(value, offset))
            }
            Where::Column {
                first,
                operator,
                second,
                ..
            } => format!("{} {} {}", self.wrap(first), operator, self.wrap(second)),
            Where::Null { column, not, .. } => {
                let null = if *not { "is not null" } else { "is null" };
                format!("{} {}", self.wrap(column), null)
            }
            Where::Between {
                column,
                low,
                high,
                not,
                ..
            } => {
                let between = if *not { "not between" } else { "between" };
                let low = self.parameter(low, offset);
                let high = self.parameter(high, offset);
                format!("{} {} {} and {}", self.wrap(column), between, low, high)
            }
            Where::In {
                column,
                values,
                not,
                ..
            } => {
                if values.is_empty() {
                    return if *not { "1 = 1" } else { "0 = 1" }.to_string();
                }
                let keyword = if *not { "not in" } else { "in" };
                format!(
                    "{} {} ({})",
                    self.wrap(column),
                    keyword,
                    self.parameterize(values, offset)
                )
            }
            Where::InSub {
                column, query, not, ..
            } => {
                let keyword = if *not { "not in" } else { "in" };
                format!(
                    "{} {} ({})",
                    self.wrap(column),
                    keyword,
                    self.compile_select_offset(query, offset)
                )
            }
            Where::Exists { query, not, .. } => {
                let keyword = if *not { "not exists" } else { "exists" };
                format!("{} ({})", keyword, self.compile_select_offset(query, offset))
            }
            Where::Raw { sql, bindings, .. } => self.raw_fragment(sql, *bindings, offset),
            Where::Nested { query, .. } => {
                format!("({})", self.compile_where_list(&query.wheres, offset))
            }
            Where::Date {
                part,
                column,
                operator,
                value,
                ..
            } => {
                let value = self.parameter(value, offset);
                self.where_date_part(*part, &self.wrap(column), operator, &value)
            }
        }
    }

    /// `date(col)>?` and friends; `column` is already wrapped and `value`
    /// already rendered.
    fn where_date_part(&self, part: DatePart, column: &str, operator: &str, value: &str) -> String {
        format!("{}({}){}{}", part.as_str(), column, operator, value)
    }

    fn compile_groups(&self, groups: &[String]) -> String {
        if groups.is_empty() {
            return String::new();
        }
        format!("group by {}", self.columnize(groups))
    }

    fn compile_havings(&self, havings: &[Having], offset: &mut usize) -> String {
        if havings.is_empty() {
            return String::new();
        }
        let list = havings
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let sql = match h {
                    Having::Basic {
                        column,
                        operator,
                        value,
                        ..
                    } => format!(
                        "{} {} {}",
                        self.wrap(column),
                        operator,
                        self.parameter(value, offset)
                    ),
                    Having::Raw { sql, bindings, .. } => self.raw_fragment(sql, *bindings, offset),
                };
                if i == 0 {
                    sql
                } else {
                    format!("{} {}", h.boolean().as_str(), sql)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("having {list}")
    }

    fn compile_orders(&self, orders: &[OrderBy], offset: &mut usize) -> String {
        if orders.is_empty() {
            return String::new();
        }
        let list = orders
            .iter()
            .map(|o| match o {
                OrderBy::Column { column, direction } => {
                    format!("{} {}", self.wrap(column), direction.as_str())
                }
                OrderBy::Raw { sql, bindings } => self.raw_fragment(sql, *bindings, offset),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("order by {list}")
    }

    fn compile_limit(&self, query: &Query) -> String {
        query
            .limit
            .map_or_else(String::new, |limit| format!("limit {limit}"))
    }

    fn compile_offset(&self, query: &Query) -> String {
        query
            .offset
            .map_or_else(String::new, |offset| format!("offset {offset}"))
    }

    fn compile_lock(&self, lock: Option<Lock>) -> String {
        match lock {
            Some(Lock::Update) => "for update".to_string(),
            Some(Lock::Shared) => "for share".to_string(),
            None => String::new(),
        }
    }

    fn compile_exists(&self, query: &Query) -> String {
        let sql = format!(
            "select exists({}) as {}",
            self.compile_select(query),
            self.wrap_value("exists")
        );
        tracing::trace!(driver = self.driver(), sql = %sql, "Compiled exists");
        sql
    }

    /// `select count(*) as aggregate from ...`; ordering and paging are
    /// dropped along with their bindings.
    fn compile_aggregate(&self, query: &Query, function: &str, column: &str) -> (String, Vec<Value>) {
        let mut q = query.clone();
        let column = if column == "*" {
            "*".to_string()
        } else {
            self.wrap(column)
        };
        let distinct = if q.distinct && column != "*" {
            "distinct "
        } else {
            ""
        };
        q.columns = vec![Selectable::Raw {
            sql: format!("{function}({distinct}{column}) as aggregate"),
            bindings: 0,
        }];
        q.distinct = false;
        q.orders.clear();
        q.limit = None;
        q.offset = None;
        q.bindings.select.clear();
        q.bindings.order.clear();
        (self.compile_select(&q), q.bindings())
    }

    // ---- insert --------------------------------------------------------

    /// The quoted target table of a write statement.
    fn write_table(&self, query: &Query) -> String {
        self.wrap_table(query.table_name().unwrap_or_default())
    }

    fn compile_insert(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
    ) -> (String, Vec<Value>) {
        let table = self.write_table(query);
        if columns.is_empty() || rows.is_empty() {
            return (format!("insert into {table} default values"), Vec::new());
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
            table,
            self.columnize(columns),
            values
        );
        tracing::trace!(driver = self.driver(), sql = %sql, "Compiled insert");
        (sql, bindings)
    }

    /// Dialects without a native form fall back to a plain insert.
    fn compile_insert_or_ignore(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
    ) -> (String, Vec<Value>) {
        tracing::debug!(driver = self.driver(), "Insert or ignore compiled as plain insert");
        self.compile_insert(query, columns, rows)
    }

    fn compile_insert_get_id(
        &self,
        query: &Query,
        columns: &[String],
        row: &[Operand],
        _sequence: Option<&str>,
    ) -> (String, Vec<Value>) {
        self.compile_insert(query, columns, &[row.to_vec()])
    }

    /// Run a compiled insert-get-id statement and return the new id.
    fn process_insert_get_id(
        &self,
        conn: &dyn Connection,
        sql: &str,
        bindings: &[Value],
        _sequence: Option<&str>,
    ) -> Result<i64> {
        conn.insert(sql, bindings)
    }

    fn compile_insert_using(
        &self,
        query: &Query,
        columns: &[String],
        source: &Query,
    ) -> (String, Vec<Value>) {
        let sql = format!(
            "insert into {} ({}) {}",
            self.write_table(query),
            self.columnize(columns),
            self.compile_select(source)
        );
        (sql, source.bindings())
    }

    // ---- update / delete -----------------------------------------------

    fn compile_update_columns(&self, values: &[(String, Operand)], offset: &mut usize) -> String {
        values
            .iter()
            .map(|(column, value)| {
                format!("{} = {}", self.wrap(column), self.parameter(value, offset))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Why this grammar cannot honor the joins, ordering or limit of an
    /// UPDATE/DELETE over `query`; those clauses are then dropped.
    fn unsupported_write(&self, query: &Query) -> Option<String> {
        let joined = !query.joins.is_empty();
        let limited = query.limit.is_some() || query.offset.is_some();
        (joined || limited).then(|| {
            format!(
                "{} cannot join or limit UPDATE/DELETE; joins, ordering and paging were dropped",
                self.driver()
            )
        })
    }

    /// `update <source> set ... [where]`.
    fn compile_update(&self, query: &Query, values: &[(String, Operand)]) -> (String, Vec<Value>) {
        plain_update(self, query, values)
    }

    /// The query rewritten to select only the row-id column of its source.
    /// The column is qualified when an alias or a join makes it ambiguous.
    fn row_id_query(&self, query: &Query, row_id: &str) -> Query {
        let mut q = query.clone();
        let qualifier = q
            .from
            .as_ref()
            .filter(|f| f.alias().is_some() || !q.joins.is_empty())
            .map(|f| f.reference().to_string());
        q.columns = vec![Selectable::Column(match qualifier {
            Some(r) => format!("{r}.{row_id}"),
            None => row_id.to_string(),
        })];
        q.distinct = false;
        q.bindings.select.clear();
        q
    }

    /// The write target with its alias, `"users" as "u"`.
    fn write_target(&self, query: &Query) -> String {
        match &query.from {
            Some(from @ FromClause::Table { .. }) => self.compile_source(from, &mut 0),
            _ => self.write_table(query),
        }
    }

    /// `update t set ... where <row_id> in (select <row_id> ...)`, for
    /// dialects without native UPDATE ... JOIN / LIMIT.
    fn compile_update_by_row_id(
        &self,
        query: &Query,
        values: &[(String, Operand)],
        row_id: &str,
    ) -> (String, Vec<Value>) {
        let mut offset = 0;
        let set = self.compile_update_columns(values, &mut offset);
        let selection = self.row_id_query(query, row_id);
        let select = self.compile_select_offset(&selection, &mut offset);
        let mut bindings: Vec<Value> = values.iter().flat_map(|(_, v)| v.bindings()).collect();
        bindings.extend(selection.bindings());
        let sql = format!(
            "update {} set {} where {} in ({})",
            self.write_target(query),
            set,
            self.wrap_value(row_id),
            select
        );
        tracing::trace!(driver = self.driver(), sql = %sql, "Compiled update");
        (sql, bindings)
    }

    /// `delete from <source> [where]`.
    fn compile_delete(&self, query: &Query) -> (String, Vec<Value>) {
        plain_delete(self, query, false)
    }

    fn compile_delete_by_row_id(&self, query: &Query, row_id: &str) -> (String, Vec<Value>) {
        let selection = self.row_id_query(query, row_id);
        let sql = format!(
            "delete from {} where {} in ({})",
            self.write_target(query),
            self.wrap_value(row_id),
            self.compile_select(&selection)
        );
        tracing::trace!(driver = self.driver(), sql = %sql, "Compiled delete");
        (sql, selection.bindings())
    }

    /// Statements emptying the table, executed in order.
    fn compile_truncate(&self, query: &Query) -> Vec<(String, Vec<Value>)> {
        vec![(format!("truncate table {}", self.write_table(query)), Vec::new())]
    }

    /// Run the truncate statements.
    fn process_truncate(&self, conn: &dyn Connection, query: &Query) -> Result<()> {
        for (sql, bindings) in self.compile_truncate(query) {
            conn.execute(&sql, &bindings)?;
        }
        Ok(())
    }

    // ---- upsert --------------------------------------------------------

    /// Dialects without a native form fall back to a plain insert.
    fn compile_upsert(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
        _unique_by: &[String],
        _update: &UpsertUpdate,
    ) -> (String, Vec<Value>) {
        tracing::debug!(driver = self.driver(), "Upsert compiled as plain insert");
        self.compile_insert(query, columns, rows)
    }
}

/// Joins or paging on a write, which row-id dialects rewrite into a
/// sub-select.
pub(crate) fn needs_row_id(query: &Query) -> bool {
    !query.joins.is_empty() || query.limit.is_some() || query.offset.is_some()
}

/// `update <source> set ... [where]` with no joins, ordering or paging.
/// A sub-query source binds first, then the new values, then the filter.
pub(crate) fn plain_update<G: Grammar + ?Sized>(
    grammar: &G,
    query: &Query,
    values: &[(String, Operand)],
) -> (String, Vec<Value>) {
    let mut offset = 0;
    let table = query
        .from
        .as_ref()
        .map(|f| grammar.compile_source(f, &mut offset))
        .unwrap_or_default();
    let set = grammar.compile_update_columns(values, &mut offset);
    let sql = join_parts([
        format!("update {table} set {set}"),
        grammar.compile_wheres(&query.wheres, &mut offset),
    ]);
    let mut bindings = query.bindings.from.clone();
    bindings.extend(values.iter().flat_map(|(_, v)| v.bindings()));
    bindings.extend(query.bindings.where_.iter().cloned());
    tracing::trace!(driver = grammar.driver(), sql = %sql, "Compiled update");
    (sql, bindings)
}

/// `delete from <source> [where]`, plus `order by` and `limit` when
/// `ordered`. Joins, grouping and having never reach a DELETE.
pub(crate) fn plain_delete<G: Grammar + ?Sized>(
    grammar: &G,
    query: &Query,
    ordered: bool,
) -> (String, Vec<Value>) {
    let mut offset = 0;
    let table = query
        .from
        .as_ref()
        .map(|f| grammar.compile_source(f, &mut offset))
        .unwrap_or_default();
    let mut parts = vec![
        format!("delete from {table}"),
        grammar.compile_wheres(&query.wheres, &mut offset),
    ];
    let mut bindings = query.bindings.from.clone();
    bindings.extend(query.bindings.where_.iter().cloned());
    if ordered {
        parts.push(grammar.compile_orders(&query.orders, &mut offset));
        parts.push(grammar.compile_limit(query));
        bindings.extend(query.bindings.order.iter().cloned());
    }
    let sql = join_parts(parts);
    tracing::trace!(driver = grammar.driver(), sql = %sql, "Compiled delete");
    (sql, bindings)
}

/// `on conflict (k) do update set c = excluded.c, d = ?`, shared by the
/// PostgreSQL and SQLite grammars.
pub(crate) fn on_conflict_update<G: Grammar + ?Sized>(
    grammar: &G,
    insert: (String, Vec<Value>),
    unique_by: &[String],
    update: &UpsertUpdate,
) -> (String, Vec<Value>) {
    let (mut sql, mut bindings) = insert;
    sql.push_str(&format!(" on conflict ({}) do ", grammar.columnize(unique_by)));
    if update.is_empty() {
        sql.push_str("nothing");
        return (sql, bindings);
    }
    let mut offset = bindings.len();
    let set = match update {
        UpsertUpdate::Columns(columns) => columns
            .iter()
            .map(|c| {
                format!(
                    "{} = {}.{}",
                    grammar.wrap(c),
                    grammar.wrap_value("excluded"),
                    grammar.wrap_value(c)
                )
            })
            .collect::<Vec<_>>()
            .join(", "),
        UpsertUpdate::Values(record) => {
            bindings.extend(record.fields().iter().flat_map(|(_, v)| v.bindings()));
            grammar.compile_update_columns(record.fields(), &mut offset)
        }
    };
    sql.push_str(&format!("update set {set}"));
    (sql, bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_alias() {
        assert_eq!(split_alias("t.email as wid"), Some(("t.email", "wid")));
        assert_eq!(split_alias("users AS u"), Some(("users", "u")));
        assert_eq!(split_alias("last_name"), None);
        assert_eq!(split_alias("alias_name"), None);
    }

    #[test]
    fn test_split_columns() {
        assert_eq!(
            split_columns("id, t.email as wid,t.cate as category"),
            vec!["id", "t.email as wid", "t.cate as category"]
        );
        assert!(split_columns("  ").is_empty());
    }
}
