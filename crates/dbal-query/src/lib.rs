//! Fluent query builder and SQL grammars.
//!
//! `dbal-query` turns [`Builder`] calls into a dialect-neutral [`Query`]
//! and compiles it through a [`Grammar`]:
//!
//! - [`Builder`] - select / where / join / group / order / paging plus
//!   insert, update, delete, upsert and truncate
//! - [`Grammar`] - the base compiler, overridden per dialect by
//!   [`MySql`], [`Postgres`], [`Sqlite`], [`Hana`] and generic [`Sql`]
//! - [`Operand`], [`Raw`], [`Record`] - values, verbatim fragments and
//!   column/value lists
//!
//! Compilation is pure; only the execution methods on [`Builder`] touch
//! the bound [`Connection`](dbal_core::Connection).

pub mod builder;
pub mod clause;
mod execute;
pub mod expr;
pub mod grammar;
pub mod query;
pub mod record;

pub use builder::Builder;
pub use clause::{
    Boolean, DatePart, FromClause, Having, Join, JoinCondition, JoinType, Lock, OrderBy,
    OrderDirection, Where,
};
pub use expr::{Operand, Raw, Selectable, raw};
pub use grammar::{Grammar, Hana, MySql, Postgres, Sql, Sqlite, split_alias, split_columns};
pub use query::{BindingSection, Bindings, Query};
pub use record::{Record, UpsertUpdate, rows_of};
