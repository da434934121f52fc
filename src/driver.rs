//! The capability seam between [`Connector`](crate::Connector) and a backend.
//!
//! A backend supplies a [`Driver`] that opens one [`Session`] per call. The connector owns
//! everything else (configuration check, timeout, closing), so every backend gets the same
//! contract by construction.

use async_trait::async_trait;

use crate::command::Command;
use crate::error::SqlConnectorError;
use crate::results::{MultiResultSet, ResultSet};

#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// Open a fresh connection.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the connection string is rejected or the server is
    /// unreachable.
    async fn open(&self, connection_string: &str) -> Result<Box<dyn Session>, SqlConnectorError>;
}

/// One open connection. Sessions are never reused across connector calls.
#[async_trait]
pub trait Session: Send {
    /// Run an update-style command and report the rows affected.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    async fn execute_non_query(&mut self, command: &Command<'_>) -> Result<u64, SqlConnectorError>;

    /// Run a command and materialize its first result set, if it produced one.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    async fn execute_reader(
        &mut self,
        command: &Command<'_>,
    ) -> Result<Option<ResultSet>, SqlConnectorError>;

    /// Run a command and materialize every result set it produced, in order.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    async fn execute_batch(&mut self, command: &Command<'_>)
    -> Result<MultiResultSet, SqlConnectorError>;

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the shutdown handshake fails.
    async fn close(self: Box<Self>) -> Result<(), SqlConnectorError>;
}
