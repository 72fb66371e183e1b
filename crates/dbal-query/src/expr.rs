//! Operands and select-list entries.
//!
//! A condition's right-hand side is an [`Operand`]: a bound value, a raw
//! fragment, another column or a whole sub-query. Only bound values
//! produce placeholders; everything else is inlined by the grammar.

use dbal_core::Value;

use crate::query::Query;

/// A verbatim SQL fragment, emitted without quoting or binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(String);

impl Raw {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shorthand for [`Raw::new`].
///
/// ```ignore
/// builder.where_("created_at", "<", raw("NOW()"));
/// ```
pub fn raw(sql: impl Into<String>) -> Raw {
    Raw::new(sql)
}

/// The right-hand side of a condition, a set clause or an insert cell.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Bound literal
    Value(Value),
    /// Inlined SQL
    Raw(Raw),
    /// Another column, wrapped as an identifier
    Column(String),
    /// Parenthesised sub-query
    Sub(Box<Query>),
}

impl Operand {
    /// Reference another column instead of binding a literal.
    pub fn column(name: impl Into<String>) -> Self {
        Operand::Column(name.into())
    }

    /// Values this operand contributes to the binding list, in order.
    pub fn bindings(&self) -> Vec<Value> {
        match self {
            Operand::Value(v) => vec![v.clone()],
            Operand::Sub(q) => q.bindings(),
            Operand::Raw(_) | Operand::Column(_) => Vec::new(),
        }
    }

    /// True for a bound NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Operand::Value(Value::Null))
    }

    /// The bound text, if this is a text literal.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Operand::Value(Value::Text(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<Raw> for Operand {
    fn from(r: Raw) -> Self {
        Operand::Raw(r)
    }
}

impl From<Query> for Operand {
    fn from(q: Query) -> Self {
        Operand::Sub(Box::new(q))
    }
}

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::Value(v.map_or(Value::Null, Into::into))
    }
}

macro_rules! operand_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )*
    };
}

operand_from_value!(bool, i8, i16, i32, i64, u32, u64, f32, f64, String, &str, &String, Vec<u8>);

/// One entry of a select list.
#[derive(Debug, Clone)]
pub enum Selectable {
    /// Column name, optionally `table.column` and/or `name as alias`
    Column(String),
    /// Raw expression with the number of `?` placeholders it carries
    Raw { sql: String, bindings: usize },
    /// `(sub-query) as alias`
    Sub { query: Box<Query>, alias: String },
}

impl From<&str> for Selectable {
    fn from(name: &str) -> Self {
        Selectable::Column(name.to_string())
    }
}

impl From<String> for Selectable {
    fn from(name: String) -> Self {
        Selectable::Column(name)
    }
}

impl From<Raw> for Selectable {
    fn from(r: Raw) -> Self {
        Selectable::Raw {
            sql: r.0,
            bindings: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_conversions() {
        assert!(matches!(Operand::from(5), Operand::Value(Value::Int(5))));
        assert!(matches!(Operand::from("x"), Operand::Value(Value::Text(_))));
        assert!(Operand::from(None::<i64>).is_null());
        assert!(matches!(Operand::from(raw("NOW()")), Operand::Raw(_)));
        assert_eq!(Operand::from("a@b").as_text(), Some("a@b"));
    }

    #[test]
    fn test_operand_bindings() {
        assert_eq!(Operand::from(3).bindings(), vec![Value::Int(3)]);
        assert!(Operand::column("score_grade").bindings().is_empty());
        assert!(Operand::from(raw("NOW()")).bindings().is_empty());
    }

    #[test]
    fn test_selectable_from_raw() {
        match Selectable::from(raw("count(*) as n")) {
            Selectable::Raw { sql, bindings } => {
                assert_eq!(sql, "count(*) as n");
                assert_eq!(bindings, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
