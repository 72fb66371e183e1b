//! Schema blueprints, DDL grammars and catalog reflection.
//!
//! - [`Table`] - a table snapshot plus the log of changes made to it
//! - [`Column`], [`Index`], [`Primary`] - the blueprint parts
//! - [`SchemaGrammar`] - DDL compilation, the CREATE / ALTER execution
//!   paths and reflection, implemented for every `dbal-query` grammar
//! - [`Schema`] - the front-end bound to a connection
//!
//! CREATE TABLE compiles the whole blueprint into a fixed statement order
//! (types, table, indexes, comments). ALTER TABLE replays the command log
//! one command at a time, reporting each outcome to the command's
//! callback and folding failures into one composite error.

pub mod column;
pub mod command;
pub mod grammar;
pub mod index;
mod reflect;
pub mod schema;
pub mod table;

pub use column::{Column, ColumnType, DefaultValue};
pub use command::{Callback, Command, CommandKind};
pub use grammar::SchemaGrammar;
pub use index::{Index, IndexType, Primary};
pub use reflect::NativeType;
pub use schema::Schema;
pub use table::{ColumnDef, CreateTableOptions, Table};
