//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::blocking::BlockingConnector;
pub use crate::command::{Command, CommandOptions, CommandType};
pub use crate::connector::Connector;
pub use crate::driver::{Driver, Session};
pub use crate::error::SqlConnectorError;
pub use crate::results::{CustomDbRow, MultiResultSet, ResultSet};
pub use crate::translation::{
    BoundStatement, PlaceholderStyle, bind_named_parameters, split_statements,
};
pub use crate::types::{ParameterSet, RowValues, ServerKind};

#[cfg(feature = "mssql")]
pub use crate::mssql::MssqlDriver;
#[cfg(feature = "mysql")]
pub use crate::mysql::MysqlDriver;
