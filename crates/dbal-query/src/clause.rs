//! Clause nodes stored on a [`Query`].

use crate::expr::Operand;
use crate::query::Query;

/// How a condition attaches to the one before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Boolean {
    #[default]
    And,
    Or,
}

impl Boolean {
    pub const fn as_str(self) -> &'static str {
        match self {
            Boolean::And => "and",
            Boolean::Or => "or",
        }
    }
}

/// The date/time component compared by `where_date` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Date,
    Time,
    Year,
    Month,
    Day,
}

impl DatePart {
    pub const fn as_str(self) -> &'static str {
        match self {
            DatePart::Date => "date",
            DatePart::Time => "time",
            DatePart::Year => "year",
            DatePart::Month => "month",
            DatePart::Day => "day",
        }
    }
}

/// A WHERE condition.
#[derive(Debug, Clone)]
pub enum Where {
    /// `column op value`; a sub-query value renders as `column op (select ...)`
    Basic {
        column: String,
        operator: String,
        value: Operand,
        boolean: Boolean,
    },
    /// `(select ...) op value`
    SubColumn {
        query: Box<Query>,
        operator: String,
        value: Operand,
        boolean: Boolean,
    },
    /// `first op second`, both identifiers
    Column {
        first: String,
        operator: String,
        second: String,
        boolean: Boolean,
    },
    Null {
        column: String,
        not: bool,
        boolean: Boolean,
    },
    Between {
        column: String,
        low: Operand,
        high: Operand,
        not: bool,
        boolean: Boolean,
    },
    In {
        column: String,
        values: Vec<Operand>,
        not: bool,
        boolean: Boolean,
    },
    InSub {
        column: String,
        query: Box<Query>,
        not: bool,
        boolean: Boolean,
    },
    Exists {
        query: Box<Query>,
        not: bool,
        boolean: Boolean,
    },
    /// Verbatim SQL carrying `bindings` positional placeholders
    Raw {
        sql: String,
        bindings: usize,
        boolean: Boolean,
    },
    /// Parenthesised group of the inner query's conditions
    Nested {
        query: Box<Query>,
        boolean: Boolean,
    },
    Date {
        part: DatePart,
        column: String,
        operator: String,
        value: Operand,
        boolean: Boolean,
    },
}

impl Where {
    pub fn boolean(&self) -> Boolean {
        match self {
            Where::Basic { boolean, .. }
            | Where::SubColumn { boolean, .. }
            | Where::Column { boolean, .. }
            | Where::Null { boolean, .. }
            | Where::Between { boolean, .. }
            | Where::In { boolean, .. }
            | Where::InSub { boolean, .. }
            | Where::Exists { boolean, .. }
            | Where::Raw { boolean, .. }
            | Where::Nested { boolean, .. }
            | Where::Date { boolean, .. } => *boolean,
        }
    }
}

/// A HAVING condition.
#[derive(Debug, Clone)]
pub enum Having {
    Basic {
        column: String,
        operator: String,
        value: Operand,
        boolean: Boolean,
    },
    Raw {
        sql: String,
        bindings: usize,
        boolean: Boolean,
    },
}

impl Having {
    pub fn boolean(&self) -> Boolean {
        match self {
            Having::Basic { boolean, .. } | Having::Raw { boolean, .. } => *boolean,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }

    /// Parse `"asc"`/`"desc"` case-insensitively.
    pub fn parse(direction: &str) -> Option<Self> {
        if direction.eq_ignore_ascii_case("asc") {
            Some(OrderDirection::Asc)
        } else if direction.eq_ignore_ascii_case("desc") {
            Some(OrderDirection::Desc)
        } else {
            None
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone)]
pub enum OrderBy {
    Column {
        column: String,
        direction: OrderDirection,
    },
    Raw {
        sql: String,
        bindings: usize,
    },
}

/// The FROM source.
#[derive(Debug, Clone)]
pub enum FromClause {
    Table {
        name: String,
        alias: Option<String>,
    },
    Sub {
        query: Box<Query>,
        alias: String,
    },
}

impl FromClause {
    /// Build a table source, splitting a trailing `as alias`.
    pub fn table(name: &str) -> Self {
        match crate::grammar::split_alias(name) {
            Some((table, alias)) => FromClause::Table {
                name: table.to_string(),
                alias: Some(alias.to_string()),
            },
            None => FromClause::Table {
                name: name.trim().to_string(),
                alias: None,
            },
        }
    }

    /// The alias if one was given, otherwise the table name.
    pub fn reference(&self) -> &str {
        match self {
            FromClause::Table { name, alias } => alias.as_deref().unwrap_or(name),
            FromClause::Sub { alias, .. } => alias,
        }
    }

    /// The underlying table name, `None` for a sub-query source.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            FromClause::Table { name, .. } => Some(name),
            FromClause::Sub { .. } => None,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            FromClause::Table { alias, .. } => alias.as_deref(),
            FromClause::Sub { alias, .. } => Some(alias),
        }
    }
}

/// Row locking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lock {
    Update,
    Shared,
}

/// Types of SQL joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinType {
    pub const fn as_str(self) -> &'static str {
        match self {
            JoinType::Inner => "inner join",
            JoinType::Left => "left join",
            JoinType::Right => "right join",
            JoinType::Cross => "cross join",
        }
    }
}

/// One `first op second` pair of a join's ON clause.
#[derive(Debug, Clone)]
pub struct JoinCondition {
    pub first: String,
    pub operator: String,
    pub second: String,
    pub boolean: Boolean,
}

/// A JOIN clause.
#[derive(Debug, Clone)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub conditions: Vec<JoinCondition>,
}

impl Join {
    pub fn new(join_type: JoinType, table: impl Into<String>) -> Self {
        Self {
            join_type,
            table: table.into(),
            conditions: Vec::new(),
        }
    }

    /// Add an `and`-joined ON condition.
    pub fn on(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
        self.push(first, operator, second, Boolean::And)
    }

    /// Add an `or`-joined ON condition.
    pub fn or_on(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
        self.push(first, operator, second, Boolean::Or)
    }

    fn push(&mut self, first: &str, operator: &str, second: &str, boolean: Boolean) -> &mut Self {
        self.conditions.push(JoinCondition {
            first: first.to_string(),
            operator: operator.to_string(),
            second: second.to_string(),
            boolean,
        });
        self
    }
}
