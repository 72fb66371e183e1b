//! dbal - one fluent query and schema API over MySQL, PostgreSQL, SQLite,
//! SAP HANA and generic SQL.
//!
//! The workspace is split by concern and re-exported here:
//!
//! - `dbal-core` - values, rows, errors and the driver contract
//! - `dbal-query` - the query builder and per-dialect grammars
//! - `dbal-schema` - table blueprints, DDL and catalog reflection
//!
//! dbal never opens a socket. A driver implements [`Driver`] and
//! [`Connection`]; dbal compiles SQL and hands it over together with the
//! bindings.
//!
//! # Quick Start
//!
//! ```ignore
//! use dbal::prelude::*;
//!
//! let registry = Registry::with_defaults();
//! let config = Config::new("postgres", "postgres://localhost/blog").prefix("blog_");
//! let db = Db::connect(&registry, config, &my_driver)?;
//!
//! db.schema().create_table("posts", |t| {
//!     t.id("id");
//!     t.string("title", 200);
//!     t.enum_("state", &["draft", "published"]).default("draft");
//!     t.timestamps();
//! })?;
//!
//! db.table("posts").insert(&[Record::new().set("title", "Hello")])?;
//!
//! let published = db
//!     .table("posts")
//!     .where_eq("state", "published")
//!     .order_by_desc("created_at")
//!     .limit(10)
//!     .get()?;
//!
//! db.schema().alter_table("posts", |t| {
//!     t.text("summary").nullable();
//!     t.rename_column("title", "headline");
//! })?;
//! ```

pub mod db;
pub mod registry;

pub use db::Db;
pub use registry::Registry;

pub use dbal_core::{
    CommandFailure, Config, Connection, Dialect, Driver, Error, FromValue, PreparedStatement,
    QueryErrorKind, Result, Row, SchemaErrorKind, Value, Version,
};

pub use dbal_query::{
    Boolean, Builder, DatePart, Grammar, Hana, JoinType, Lock, MySql, Operand, OrderDirection,
    Postgres, Query, Raw, Record, Sql, Sqlite, UpsertUpdate, raw,
};

pub use dbal_schema::{
    Column, ColumnDef, ColumnType, Command, CommandKind, CreateTableOptions, DefaultValue, Index,
    IndexType, Primary, Schema, SchemaGrammar, Table,
};

/// Everything needed for day-to-day use.
///
/// ```ignore
/// use dbal::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Builder, ColumnType, Config, Connection, CreateTableOptions, Db, Driver, Error, Record,
        Registry, Result, Row, Schema, Table, UpsertUpdate, Value, raw,
    };
}
