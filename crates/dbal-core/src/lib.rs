//! Core types for dbal.
//!
//! `dbal-core` holds what every other crate in the workspace agrees on:
//!
//! - [`Value`] - bound parameter values and result cells
//! - [`Row`] - result rows with name-based access
//! - [`Connection`] / [`Driver`] - the synchronous driver contract
//! - [`Dialect`] - identifier quoting and placeholder style
//! - [`Config`] / [`Version`] - handle configuration and server versions
//! - [`Error`] / [`Result`] - the shared error type

pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod row;
pub mod value;
pub mod version;

pub use config::Config;
pub use connection::{Connection, Driver, PreparedStatement};
pub use dialect::{Dialect, sanitize_identifier};
pub use error::{
    CommandFailure, ConfigError, ConnectionError, Error, QueryError, QueryErrorKind, Result,
    SchemaError, SchemaErrorKind, TypeError,
};
pub use row::{ColumnInfo, FromValue, Row};
pub use value::Value;
pub use version::Version;
