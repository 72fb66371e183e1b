//! Fluent query builder.
//!
//! Every method takes `&mut self` and returns `&mut Self`, so closures
//! passed to grouping, sub-query and conditional methods receive a child
//! builder they can mutate in place:
//!
//! ```ignore
//! let mut qb = db.table("table_test_where");
//! qb.where_("email", "like", "%@yao.run")
//!     .where_group(|q| {
//!         q.where_("score", ">", 64.56).where_eq("vote", 10);
//!     })
//!     .order_by("id", "desc");
//! let rows = qb.get()?;
//! ```
//!
//! Malformed input (unknown operators, short `between` lists, malformed
//! array rows) is repaired or skipped and recorded on the query. With
//! [`Builder::strict`] enabled those records turn into errors on compile.

use std::fmt;
use std::sync::Arc;

use dbal_core::{Connection, Error, Result, Value};

use crate::clause::{
    Boolean, DatePart, FromClause, Having, Join, JoinType, Lock, OrderBy, OrderDirection, Where,
};
use crate::expr::{Operand, Selectable};
use crate::grammar::{Grammar, split_columns};
use crate::query::{BindingSection, Query};
use crate::record::{Record, UpsertUpdate, rows_of};

/// Builds a [`Query`] and compiles it through a [`Grammar`].
#[derive(Clone)]
pub struct Builder {
    grammar: Arc<dyn Grammar>,
    connection: Option<Arc<dyn Connection>>,
    query: Query,
    strict: bool,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("driver", &self.grammar.driver())
            .field("connected", &self.connection.is_some())
            .field("query", &self.query)
            .field("strict", &self.strict)
            .finish()
    }
}

impl Builder {
    /// A builder that can compile but not execute.
    pub fn new(grammar: Arc<dyn Grammar>) -> Self {
        Self {
            grammar,
            connection: None,
            query: Query::new(),
            strict: false,
        }
    }

    /// A builder bound to a connection.
    pub fn with_connection(grammar: Arc<dyn Grammar>, connection: Arc<dyn Connection>) -> Self {
        Self {
            connection: Some(connection),
            ..Self::new(grammar)
        }
    }

    pub fn grammar(&self) -> &Arc<dyn Grammar> {
        &self.grammar
    }

    pub fn connection(&self) -> Option<&Arc<dyn Connection>> {
        self.connection.as_ref()
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    /// Reject malformed input on compile instead of repairing it.
    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    /// A fresh builder sharing this one's grammar and connection.
    pub fn new_query(&self) -> Builder {
        Builder {
            grammar: Arc::clone(&self.grammar),
            connection: self.connection.clone(),
            query: Query::new(),
            strict: self.strict,
        }
    }

    /// Discard all clauses and bindings.
    pub fn reset(&mut self) -> &mut Self {
        self.query = Query::new();
        self
    }

    fn issue(&mut self, message: String) {
        tracing::debug!(driver = self.grammar.driver(), issue = %message, "Repaired builder input");
        self.query.issues.push(message);
    }

    fn sub_query(&self, build: impl FnOnce(&mut Builder)) -> Query {
        let mut sub = self.new_query();
        build(&mut sub);
        sub.query
    }

    // ==================== Source ====================

    /// Set the table; `"table as alias"` declares an alias.
    pub fn table(&mut self, name: &str) -> &mut Self {
        self.query.from = Some(FromClause::table(name));
        self
    }

    pub fn from(&mut self, name: &str) -> &mut Self {
        self.table(name)
    }

    /// Select from a sub-query.
    pub fn from_sub(&mut self, build: impl FnOnce(&mut Builder), alias: &str) -> &mut Self {
        let query = self.sub_query(build);
        self.query.bindings.from = query.bindings();
        self.query.from = Some(FromClause::Sub {
            query: Box::new(query),
            alias: alias.to_string(),
        });
        self
    }

    // ==================== Select ====================

    /// Replace the select list. String entries may hold several
    /// comma-separated columns.
    pub fn select<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Selectable>,
    {
        self.query.columns.clear();
        self.query.bindings.select.clear();
        self.add_select(columns)
    }

    /// Append to the select list.
    pub fn add_select<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Selectable>,
    {
        for column in columns {
            match column.into() {
                Selectable::Column(list) => self
                    .query
                    .columns
                    .extend(split_columns(&list).into_iter().map(Selectable::Column)),
                Selectable::Sub { query, alias } => {
                    self.query
                        .add_bindings(BindingSection::Select, query.bindings());
                    self.query.columns.push(Selectable::Sub { query, alias });
                }
                other => self.query.columns.push(other),
            }
        }
        self
    }

    /// Append a raw select expression with `?` bindings.
    pub fn select_raw(&mut self, sql: &str, bindings: Vec<Value>) -> &mut Self {
        self.query.columns.push(Selectable::Raw {
            sql: sql.to_string(),
            bindings: bindings.len(),
        });
        self.query.add_bindings(BindingSection::Select, bindings);
        self
    }

    /// Append `(sub-query) as alias`.
    pub fn select_sub(&mut self, build: impl FnOnce(&mut Builder), alias: &str) -> &mut Self {
        let query = self.sub_query(build);
        self.query
            .add_bindings(BindingSection::Select, query.bindings());
        self.query.columns.push(Selectable::Sub {
            query: Box::new(query),
            alias: alias.to_string(),
        });
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.query.distinct = true;
        self
    }

    // ==================== Where ====================

    fn push_where(&mut self, condition: Where, bindings: Vec<Value>) -> &mut Self {
        self.query.wheres.push(condition);
        self.query.add_bindings(BindingSection::Where, bindings);
        self
    }

    fn operator(&mut self, operator: &str) -> String {
        let operator = operator.trim();
        if self.grammar.is_operator(operator) {
            operator.to_string()
        } else {
            self.issue(format!("unknown operator `{operator}` replaced by `=`"));
            "=".to_string()
        }
    }

    fn add_basic(&mut self, column: &str, operator: &str, value: Operand, boolean: Boolean) -> &mut Self {
        let operator = self.operator(operator);
        if value.is_null() && matches!(operator.as_str(), "=" | "!=" | "<>") {
            return self.add_null(column, operator != "=", boolean);
        }
        let bindings = value.bindings();
        self.push_where(
            Where::Basic {
                column: column.to_string(),
                operator,
                value,
                boolean,
            },
            bindings,
        )
    }

    /// `column operator value`. The value may be a literal, [`raw`](crate::raw),
    /// [`Operand::column`] or a [`Query`].
    pub fn where_(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_basic(column, operator, value.into(), Boolean::And)
    }

    pub fn where_eq(&mut self, column: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_basic(column, "=", value.into(), Boolean::And)
    }

    pub fn or_where(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_basic(column, operator, value.into(), Boolean::Or)
    }

    pub fn or_where_eq(&mut self, column: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_basic(column, "=", value.into(), Boolean::Or)
    }

    fn add_nested(&mut self, build: impl FnOnce(&mut Builder), boolean: Boolean) -> &mut Self {
        let mut nested = self.new_query();
        nested.query.from = self.query.from.clone();
        build(&mut nested);
        let mut query = nested.query;
        self.query.issues.append(&mut query.issues);
        if query.wheres.is_empty() {
            return self;
        }
        let bindings = query.bindings.where_.clone();
        self.push_where(
            Where::Nested {
                query: Box::new(query),
                boolean,
            },
            bindings,
        )
    }

    /// A parenthesised group of conditions.
    pub fn where_group(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        self.add_nested(build, Boolean::And)
    }

    pub fn or_where_group(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        self.add_nested(build, Boolean::Or)
    }

    fn add_array(&mut self, conditions: Vec<Vec<Operand>>, boolean: Boolean) -> &mut Self {
        self.add_nested(
            |q| {
                for row in conditions {
                    match row.as_slice() {
                        [column, value] if column.as_text().is_some() => {
                            let column = column.as_text().unwrap_or_default().to_string();
                            q.where_eq(&column, value.clone());
                        }
                        [column, operator, value]
                            if column.as_text().is_some() && operator.as_text().is_some() =>
                        {
                            let column = column.as_text().unwrap_or_default().to_string();
                            let operator = operator.as_text().unwrap_or_default().to_string();
                            q.where_(&column, &operator, value.clone());
                        }
                        _ => q.issue(format!("malformed condition row skipped: {row:?}")),
                    }
                }
            },
            boolean,
        )
    }

    /// A group built from `[column, value]` / `[column, operator, value]`
    /// rows. Rows of any other shape are skipped.
    pub fn where_array(&mut self, conditions: Vec<Vec<Operand>>) -> &mut Self {
        self.add_array(conditions, Boolean::And)
    }

    pub fn or_where_array(&mut self, conditions: Vec<Vec<Operand>>) -> &mut Self {
        self.add_array(conditions, Boolean::Or)
    }

    /// `column operator (select ...)`.
    pub fn where_sub(
        &mut self,
        column: &str,
        operator: &str,
        build: impl FnOnce(&mut Builder),
    ) -> &mut Self {
        let query = self.sub_query(build);
        self.add_basic(column, operator, Operand::from(query), Boolean::And)
    }

    /// `(select ...) operator value`.
    pub fn where_sub_column(
        &mut self,
        build: impl FnOnce(&mut Builder),
        operator: &str,
        value: impl Into<Operand>,
    ) -> &mut Self {
        let query = self.sub_query(build);
        let operator = self.operator(operator);
        let value = value.into();
        let mut bindings = query.bindings();
        bindings.extend(value.bindings());
        self.push_where(
            Where::SubColumn {
                query: Box::new(query),
                operator,
                value,
                boolean: Boolean::And,
            },
            bindings,
        )
    }

    fn add_column(&mut self, first: &str, operator: &str, second: &str, boolean: Boolean) -> &mut Self {
        let operator = self.operator(operator);
        self.push_where(
            Where::Column {
                first: first.to_string(),
                operator,
                second: second.to_string(),
                boolean,
            },
            Vec::new(),
        )
    }

    /// Compare two columns.
    pub fn where_column(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
        self.add_column(first, operator, second, Boolean::And)
    }

    pub fn where_column_eq(&mut self, first: &str, second: &str) -> &mut Self {
        self.add_column(first, "=", second, Boolean::And)
    }

    pub fn or_where_column(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
        self.add_column(first, operator, second, Boolean::Or)
    }

    /// A group of column comparisons from `[first, second]` or
    /// `[first, operator, second]` rows.
    pub fn where_column_array(&mut self, conditions: &[&[&str]]) -> &mut Self {
        let conditions: Vec<Vec<String>> = conditions
            .iter()
            .map(|row| row.iter().map(|s| (*s).to_string()).collect())
            .collect();
        self.add_nested(
            |q| {
                for row in &conditions {
                    match row.as_slice() {
                        [first, second] => {
                            q.where_column_eq(first, second);
                        }
                        [first, operator, second] => {
                            q.where_column(first, operator, second);
                        }
                        _ => q.issue(format!("malformed column condition skipped: {row:?}")),
                    }
                }
            },
            Boolean::And,
        )
    }

    fn add_null(&mut self, column: &str, not: bool, boolean: Boolean) -> &mut Self {
        self.push_where(
            Where::Null {
                column: column.to_string(),
                not,
                boolean,
            },
            Vec::new(),
        )
    }

    pub fn where_null(&mut self, column: &str) -> &mut Self {
        self.add_null(column, false, Boolean::And)
    }

    /// `a is null and b is null ...`
    pub fn where_nulls(&mut self, columns: &[&str]) -> &mut Self {
        for column in columns {
            self.add_null(column, false, Boolean::And);
        }
        self
    }

    pub fn or_where_null(&mut self, column: &str) -> &mut Self {
        self.add_null(column, false, Boolean::Or)
    }

    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.add_null(column, true, Boolean::And)
    }

    pub fn or_where_not_null(&mut self, column: &str) -> &mut Self {
        self.add_null(column, true, Boolean::Or)
    }

    fn add_raw(&mut self, sql: &str, bindings: Vec<Value>, boolean: Boolean) -> &mut Self {
        self.push_where(
            Where::Raw {
                sql: sql.to_string(),
                bindings: bindings.len(),
                boolean,
            },
            bindings,
        )
    }

    /// Verbatim condition with `?` bindings.
    pub fn where_raw(&mut self, sql: &str, bindings: Vec<Value>) -> &mut Self {
        self.add_raw(sql, bindings, Boolean::And)
    }

    pub fn or_where_raw(&mut self, sql: &str, bindings: Vec<Value>) -> &mut Self {
        self.add_raw(sql, bindings, Boolean::Or)
    }

    fn add_between(&mut self, column: &str, values: Vec<Operand>, not: bool, boolean: Boolean) -> &mut Self {
        let mut values = values.into_iter();
        let (Some(low), Some(high)) = (values.next(), values.next()) else {
            self.issue(format!("between on `{column}` needs two values; condition skipped"));
            return self;
        };
        let mut bindings = low.bindings();
        bindings.extend(high.bindings());
        self.push_where(
            Where::Between {
                column: column.to_string(),
                low,
                high,
                not,
                boolean,
            },
            bindings,
        )
    }

    /// `column between a and b`; values past the second are ignored.
    pub fn where_between<I>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_between(column, values, false, Boolean::And)
    }

    pub fn or_where_between<I>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_between(column, values, false, Boolean::Or)
    }

    pub fn where_not_between<I>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_between(column, values, true, Boolean::And)
    }

    pub fn or_where_not_between<I>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_between(column, values, true, Boolean::Or)
    }

    fn add_in(&mut self, column: &str, values: Vec<Operand>, not: bool, boolean: Boolean) -> &mut Self {
        let bindings = values.iter().flat_map(Operand::bindings).collect();
        self.push_where(
            Where::In {
                column: column.to_string(),
                values,
                not,
                boolean,
            },
            bindings,
        )
    }

    pub fn where_in<I>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_in(column, values, false, Boolean::And)
    }

    pub fn or_where_in<I>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_in(column, values, false, Boolean::Or)
    }

    pub fn where_not_in<I>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_in(column, values, true, Boolean::And)
    }

    pub fn or_where_not_in<I>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_in(column, values, true, Boolean::Or)
    }

    fn add_in_sub(&mut self, column: &str, build: impl FnOnce(&mut Builder), not: bool) -> &mut Self {
        let query = self.sub_query(build);
        let bindings = query.bindings();
        self.push_where(
            Where::InSub {
                column: column.to_string(),
                query: Box::new(query),
                not,
                boolean: Boolean::And,
            },
            bindings,
        )
    }

    /// `column in (select ...)`.
    pub fn where_in_sub(&mut self, column: &str, build: impl FnOnce(&mut Builder)) -> &mut Self {
        self.add_in_sub(column, build, false)
    }

    pub fn where_not_in_sub(&mut self, column: &str, build: impl FnOnce(&mut Builder)) -> &mut Self {
        self.add_in_sub(column, build, true)
    }

    fn add_exists(&mut self, build: impl FnOnce(&mut Builder), not: bool, boolean: Boolean) -> &mut Self {
        let query = self.sub_query(build);
        let bindings = query.bindings();
        self.push_where(
            Where::Exists {
                query: Box::new(query),
                not,
                boolean,
            },
            bindings,
        )
    }

    pub fn where_exists(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        self.add_exists(build, false, Boolean::And)
    }

    pub fn or_where_exists(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        self.add_exists(build, false, Boolean::Or)
    }

    pub fn where_not_exists(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        self.add_exists(build, true, Boolean::And)
    }

    pub fn or_where_not_exists(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        self.add_exists(build, true, Boolean::Or)
    }

    fn add_date(
        &mut self,
        part: DatePart,
        column: &str,
        operator: &str,
        value: Operand,
        boolean: Boolean,
    ) -> &mut Self {
        let operator = self.operator(operator);
        let bindings = value.bindings();
        self.push_where(
            Where::Date {
                part,
                column: column.to_string(),
                operator,
                value,
                boolean,
            },
            bindings,
        )
    }

    pub fn where_date(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Date, column, operator, value.into(), Boolean::And)
    }

    pub fn or_where_date(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Date, column, operator, value.into(), Boolean::Or)
    }

    pub fn where_time(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Time, column, operator, value.into(), Boolean::And)
    }

    pub fn or_where_time(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Time, column, operator, value.into(), Boolean::Or)
    }

    pub fn where_year(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Year, column, operator, value.into(), Boolean::And)
    }

    pub fn or_where_year(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Year, column, operator, value.into(), Boolean::Or)
    }

    pub fn where_month(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Month, column, operator, value.into(), Boolean::And)
    }

    pub fn or_where_month(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Month, column, operator, value.into(), Boolean::Or)
    }

    pub fn where_day(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Day, column, operator, value.into(), Boolean::And)
    }

    pub fn or_where_day(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_date(DatePart::Day, column, operator, value.into(), Boolean::Or)
    }

    // ==================== Conditionals ====================

    /// Apply `then` when `condition` holds.
    pub fn when(&mut self, condition: bool, then: impl FnOnce(&mut Builder, bool)) -> &mut Self {
        if condition {
            then(self, condition);
        }
        self
    }

    pub fn when_else(
        &mut self,
        condition: bool,
        then: impl FnOnce(&mut Builder, bool),
        otherwise: impl FnOnce(&mut Builder, bool),
    ) -> &mut Self {
        if condition {
            then(self, condition);
        } else {
            otherwise(self, condition);
        }
        self
    }

    /// Apply `then` when `condition` does not hold.
    pub fn unless(&mut self, condition: bool, then: impl FnOnce(&mut Builder, bool)) -> &mut Self {
        if !condition {
            then(self, condition);
        }
        self
    }

    pub fn unless_else(
        &mut self,
        condition: bool,
        then: impl FnOnce(&mut Builder, bool),
        otherwise: impl FnOnce(&mut Builder, bool),
    ) -> &mut Self {
        if condition {
            otherwise(self, condition);
        } else {
            then(self, condition);
        }
        self
    }

    // ==================== Joins ====================

    fn add_join(&mut self, join_type: JoinType, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
        let operator = self.operator(operator);
        let mut join = Join::new(join_type, table);
        join.on(first, &operator, second);
        self.query.joins.push(join);
        self
    }

    pub fn join(&mut self, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
        self.add_join(JoinType::Inner, table, first, operator, second)
    }

    pub fn left_join(&mut self, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
        self.add_join(JoinType::Left, table, first, operator, second)
    }

    pub fn right_join(&mut self, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
        self.add_join(JoinType::Right, table, first, operator, second)
    }

    pub fn cross_join(&mut self, table: &str) -> &mut Self {
        self.query.joins.push(Join::new(JoinType::Cross, table));
        self
    }

    /// A join with several ON conditions.
    pub fn join_with(&mut self, join_type: JoinType, table: &str, build: impl FnOnce(&mut Join)) -> &mut Self {
        let mut join = Join::new(join_type, table);
        build(&mut join);
        self.query.joins.push(join);
        self
    }

    // ==================== Grouping ====================

    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for column in columns {
            self.query.groups.extend(split_columns(column.as_ref()));
        }
        self
    }

    fn add_having(&mut self, column: &str, operator: &str, value: Operand, boolean: Boolean) -> &mut Self {
        let operator = self.operator(operator);
        self.query
            .add_bindings(BindingSection::Having, value.bindings());
        self.query.havings.push(Having::Basic {
            column: column.to_string(),
            operator,
            value,
            boolean,
        });
        self
    }

    pub fn having(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_having(column, operator, value.into(), Boolean::And)
    }

    pub fn or_having(&mut self, column: &str, operator: &str, value: impl Into<Operand>) -> &mut Self {
        self.add_having(column, operator, value.into(), Boolean::Or)
    }

    pub fn having_raw(&mut self, sql: &str, bindings: Vec<Value>) -> &mut Self {
        self.query.havings.push(Having::Raw {
            sql: sql.to_string(),
            bindings: bindings.len(),
            boolean: Boolean::And,
        });
        self.query.add_bindings(BindingSection::Having, bindings);
        self
    }

    // ==================== Ordering / paging ====================

    /// Order by a column; an unrecognised direction sorts ascending.
    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        let direction = OrderDirection::parse(direction).unwrap_or_else(|| {
            self.issue(format!("unknown sort direction `{direction}` replaced by `asc`"));
            OrderDirection::Asc
        });
        self.query.orders.push(OrderBy::Column {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn order_by_desc(&mut self, column: &str) -> &mut Self {
        self.order_by(column, "desc")
    }

    pub fn order_by_raw(&mut self, sql: &str, bindings: Vec<Value>) -> &mut Self {
        self.query.orders.push(OrderBy::Raw {
            sql: sql.to_string(),
            bindings: bindings.len(),
        });
        self.query.add_bindings(BindingSection::Order, bindings);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.query.offset = Some(offset);
        self
    }

    pub fn take(&mut self, limit: u64) -> &mut Self {
        self.limit(limit)
    }

    pub fn skip(&mut self, offset: u64) -> &mut Self {
        self.offset(offset)
    }

    /// Page `page` (1-based) of `per_page` rows.
    pub fn for_page(&mut self, page: u64, per_page: u64) -> &mut Self {
        self.offset(page.saturating_sub(1).saturating_mul(per_page))
            .limit(per_page)
    }

    pub fn lock_for_update(&mut self) -> &mut Self {
        self.query.lock = Some(Lock::Update);
        self
    }

    pub fn shared_lock(&mut self) -> &mut Self {
        self.query.lock = Some(Lock::Shared);
        self
    }

    // ==================== Compile ====================

    /// The SELECT statement.
    pub fn to_sql(&self) -> String {
        self.grammar.compile_select(&self.query)
    }

    /// Bindings of the SELECT statement, in placeholder order.
    pub fn bindings(&self) -> Vec<Value> {
        self.query.bindings()
    }

    pub fn compile(&self) -> (String, Vec<Value>) {
        (self.to_sql(), self.bindings())
    }

    /// Like [`compile`](Self::compile), failing in strict mode when input
    /// had to be repaired.
    pub fn try_compile(&self) -> Result<(String, Vec<Value>)> {
        self.check()?;
        Ok(self.compile())
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.strict && !self.query.issues.is_empty() {
            return Err(Error::invalid_input(self.query.issues.join("; ")));
        }
        Ok(())
    }

    /// [`check`](Self::check) plus the write clauses the grammar has to
    /// drop: fatal in strict mode, a warning otherwise.
    pub(crate) fn check_write(&self) -> Result<()> {
        self.check()?;
        if let Some(issue) = self.grammar.unsupported_write(&self.query) {
            if self.strict {
                return Err(Error::invalid_input(issue));
            }
            tracing::warn!(driver = self.grammar.driver(), issue = %issue, "Write clauses dropped");
        }
        Ok(())
    }

    pub fn compile_exists(&self) -> String {
        self.grammar.compile_exists(&self.query)
    }

    pub fn compile_aggregate(&self, function: &str, column: &str) -> (String, Vec<Value>) {
        self.grammar.compile_aggregate(&self.query, function, column)
    }

    pub fn compile_insert(&self, records: &[Record]) -> (String, Vec<Value>) {
        let (columns, rows) = rows_of(records);
        self.grammar.compile_insert(&self.query, &columns, &rows)
    }

    pub fn compile_insert_or_ignore(&self, records: &[Record]) -> (String, Vec<Value>) {
        let (columns, rows) = rows_of(records);
        self.grammar
            .compile_insert_or_ignore(&self.query, &columns, &rows)
    }

    pub fn compile_insert_get_id(&self, record: &Record, sequence: Option<&str>) -> (String, Vec<Value>) {
        let columns = record.columns();
        let row = record.values_for(&columns);
        self.grammar
            .compile_insert_get_id(&self.query, &columns, &row, sequence)
    }

    pub fn compile_insert_using(
        &self,
        columns: &[&str],
        build: impl FnOnce(&mut Builder),
    ) -> (String, Vec<Value>) {
        let source = self.sub_query(build);
        let columns: Vec<String> = columns.iter().map(|c| (*c).to_string()).collect();
        self.grammar
            .compile_insert_using(&self.query, &columns, &source)
    }

    pub fn compile_update(&self, values: &Record) -> (String, Vec<Value>) {
        self.grammar.compile_update(&self.query, values.fields())
    }

    pub fn compile_delete(&self) -> (String, Vec<Value>) {
        self.grammar.compile_delete(&self.query)
    }

    /// An empty `update` overwrites every inserted column outside
    /// `unique_by`.
    pub fn compile_upsert(
        &self,
        records: &[Record],
        unique_by: &[&str],
        update: UpsertUpdate,
    ) -> (String, Vec<Value>) {
        let (columns, rows) = rows_of(records);
        let unique_by: Vec<String> = unique_by.iter().map(|c| (*c).to_string()).collect();
        let update = if update.is_empty() {
            UpsertUpdate::Columns(
                columns
                    .iter()
                    .filter(|c| !unique_by.contains(c))
                    .cloned()
                    .collect(),
            )
        } else {
            update
        };
        self.grammar
            .compile_upsert(&self.query, &columns, &rows, &unique_by, &update)
    }

    pub fn compile_truncate(&self) -> Vec<(String, Vec<Value>)> {
        self.grammar.compile_truncate(&self.query)
    }
}
