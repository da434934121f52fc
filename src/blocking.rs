use tokio::runtime::{Builder, Runtime};

use crate::command::CommandOptions;
use crate::connector::Connector;
use crate::error::SqlConnectorError;
use crate::results::{MultiResultSet, ResultSet};
use crate::types::{ParameterSet, ServerKind};

/// Blocking facade over [`Connector`] for callers without an async runtime.
///
/// Owns a small tokio runtime and drives each call to completion on it. Calls may be made
/// from several threads at once. Do not call from inside an async context; tokio panics
/// when a runtime is blocked on from within another.
pub struct BlockingConnector {
    inner: Connector,
    runtime: Runtime,
}

impl BlockingConnector {
    /// # Errors
    ///
    /// Returns `SqlConnectorError::Io` if the runtime cannot be started.
    pub fn new(server_kind: ServerKind, connection_string: impl Into<String>) -> Result<Self, SqlConnectorError> {
        Self::from_connector(Connector::new(server_kind, connection_string))
    }

    /// # Errors
    ///
    /// Returns `SqlConnectorError::Io` if the runtime cannot be started.
    pub fn from_connector(inner: Connector) -> Result<Self, SqlConnectorError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("sql-connector")
            .enable_all()
            .build()?;
        Ok(Self { inner, runtime })
    }

    #[must_use]
    pub fn connector(&self) -> &Connector {
        &self.inner
    }

    /// Blocking [`Connector::execute`].
    ///
    /// # Errors
    ///
    /// As [`Connector::execute`].
    pub fn execute(
        &self,
        command_text: &str,
        parameters: Option<&ParameterSet>,
        options: CommandOptions,
    ) -> Result<bool, SqlConnectorError> {
        self.runtime
            .block_on(self.inner.execute(command_text, parameters, options))
    }

    /// Blocking [`Connector::query_single`].
    ///
    /// # Errors
    ///
    /// As [`Connector::query_single`].
    pub fn query_single(
        &self,
        command_text: &str,
        parameters: Option<&ParameterSet>,
        options: CommandOptions,
    ) -> Result<Option<ResultSet>, SqlConnectorError> {
        self.runtime
            .block_on(self.inner.query_single(command_text, parameters, options))
    }

    /// Blocking [`Connector::query_multiple`].
    ///
    /// # Errors
    ///
    /// As [`Connector::query_multiple`].
    pub fn query_multiple(
        &self,
        command_text: &str,
        parameters: Option<&ParameterSet>,
        options: CommandOptions,
    ) -> Result<Option<MultiResultSet>, SqlConnectorError> {
        self.runtime
            .block_on(self.inner.query_multiple(command_text, parameters, options))
    }
}

impl std::fmt::Debug for BlockingConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingConnector")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
