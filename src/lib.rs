//! Parameterized SQL commands against SQL Server or MySQL through one call surface.
//!
//! A [`Connector`] holds a [`ServerKind`] and a connection string. Each of its three
//! operations opens a connection, binds named parameters, runs one command and closes the
//! connection again:
//!
//! - [`Connector::execute`]: non-query; `true` when rows were affected
//! - [`Connector::query_single`]: first result set, `None` when it has no rows
//! - [`Connector::query_multiple`]: every result set, `None` when there is none
//!
//! [`BlockingConnector`] offers the same calls without an async runtime.

pub mod blocking;
pub mod command;
pub mod connector;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "mysql")]
pub mod mysql;

pub use blocking::BlockingConnector;
pub use command::{Command, CommandOptions, CommandType, DEFAULT_TIMEOUT_SECONDS};
pub use connector::Connector;
pub use driver::{Driver, Session};
pub use error::SqlConnectorError;
pub use results::{CustomDbRow, MultiResultSet, ResultSet};
pub use types::{ParameterSet, RowValues, ServerKind};
