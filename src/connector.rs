use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::command::{Command, CommandOptions};
use crate::driver::{Driver, Session};
use crate::error::SqlConnectorError;
use crate::results::{MultiResultSet, ResultSet};
use crate::types::{ParameterSet, ServerKind};

/// Runs parameterized commands against one configured server.
///
/// Holds only the server kind and connection string; every call opens its own connection
/// and closes it before returning, so a `Connector` can be shared freely across tasks.
///
/// ```rust,no_run
/// use sql_connector::prelude::*;
///
/// # async fn demo() -> Result<(), SqlConnectorError> {
/// let connector = Connector::new(
///     ServerKind::Mssql,
///     "server=tcp:localhost,1433;database=app;user id=sa;password=secret;TrustServerCertificate=true",
/// );
/// let params = ParameterSet::new().with("id", 42).with("note", RowValues::Null);
/// let updated = connector
///     .execute("update item set note = @note where id = @id", Some(&params), CommandOptions::default())
///     .await?;
/// let rows = connector
///     .query_single("select id, note from item where id = @id", Some(&params), CommandOptions::default())
///     .await?;
/// # let _ = (updated, rows);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connector {
    server_kind: ServerKind,
    connection_string: String,
    driver: Arc<dyn Driver>,
}

impl Connector {
    /// Build a connector for one of the bundled backends. Nothing is validated until the
    /// first call.
    #[must_use]
    pub fn new(server_kind: ServerKind, connection_string: impl Into<String>) -> Self {
        Self::with_driver(server_kind, connection_string, default_driver(server_kind))
    }

    /// Build a connector over a custom [`Driver`], e.g. an instrumented or stub backend.
    #[must_use]
    pub fn with_driver(
        server_kind: ServerKind,
        connection_string: impl Into<String>,
        driver: Arc<dyn Driver>,
    ) -> Self {
        Self {
            server_kind,
            connection_string: connection_string.into(),
            driver,
        }
    }

    #[must_use]
    pub fn server_kind(&self) -> ServerKind {
        self.server_kind
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Run an INSERT, UPDATE, DELETE or procedure for its side effects.
    ///
    /// Returns `true` only when the backend reports more than zero affected rows. A
    /// command that succeeds but touches nothing returns `false`, exactly as an empty
    /// connection string does (the latter never opens a connection).
    ///
    /// Row counts come from the server's completion messages. SQL Server reports one for a
    /// SELECT too, so on [`ServerKind::Mssql`] a query that returns rows also yields `true`;
    /// MySQL counts only changed rows.
    ///
    /// # Errors
    ///
    /// Backend errors (connectivity, syntax, constraints) pass through unchanged;
    /// [`SqlConnectorError::Timeout`] when the command outlives its timeout.
    pub async fn execute(
        &self,
        command_text: &str,
        parameters: Option<&ParameterSet>,
        options: CommandOptions,
    ) -> Result<bool, SqlConnectorError> {
        if self.connection_string.is_empty() {
            debug!(server = %self.server_kind, "empty connection string, skipping execute");
            return Ok(false);
        }
        let command = Command::new(command_text, parameters, options);
        let affected = self
            .run(&command, |session, command| session.execute_non_query(command))
            .await?;
        Ok(affected > 0)
    }

    /// Run a query and return its first result set.
    ///
    /// Zero rows and "no result set at all" both come back as `Ok(None)`; callers cannot
    /// tell a confirmed empty match from a command that produced no table.
    ///
    /// # Errors
    ///
    /// [`SqlConnectorError::ConfigError`] for an empty connection string; otherwise as
    /// [`execute`](Self::execute).
    pub async fn query_single(
        &self,
        command_text: &str,
        parameters: Option<&ParameterSet>,
        options: CommandOptions,
    ) -> Result<Option<ResultSet>, SqlConnectorError> {
        self.require_connection_string()?;
        let command = Command::new(command_text, parameters, options);
        let table = self
            .run(&command, |session, command| session.execute_reader(command))
            .await?;
        Ok(table.filter(|t| !t.is_empty()))
    }

    /// Run a batch or procedure and return every result set it produced.
    ///
    /// Tables are kept even when they hold no rows; `Ok(None)` means no table at all. No
    /// transaction is opened, so statements in the batch do not share a snapshot.
    ///
    /// # Errors
    ///
    /// As [`query_single`](Self::query_single).
    pub async fn query_multiple(
        &self,
        command_text: &str,
        parameters: Option<&ParameterSet>,
        options: CommandOptions,
    ) -> Result<Option<MultiResultSet>, SqlConnectorError> {
        self.require_connection_string()?;
        let command = Command::new(command_text, parameters, options);
        let tables = self
            .run(&command, |session, command| session.execute_batch(command))
            .await?;
        Ok(Some(tables).filter(|t| !t.is_empty()))
    }

    fn require_connection_string(&self) -> Result<(), SqlConnectorError> {
        if self.connection_string.is_empty() {
            return Err(SqlConnectorError::ConfigError(format!(
                "connection string for {} is empty",
                self.server_kind
            )));
        }
        Ok(())
    }

    /// Open a session, run one operation under the command timeout, then close the session
    /// whatever the outcome.
    async fn run<T, F>(&self, command: &Command<'_>, op: F) -> Result<T, SqlConnectorError>
    where
        F: for<'s> FnOnce(
            &'s mut Box<dyn Session>,
            &'s Command<'s>,
        ) -> BoxFuture<'s, Result<T, SqlConnectorError>>,
    {
        debug!(
            server = %self.server_kind,
            command_type = ?command.command_type(),
            parameters = command.parameter_count(),
            timeout_secs = command.timeout().as_secs(),
            "opening connection"
        );
        let mut session = self.driver.open(&self.connection_string).await?;

        match timeout(command.timeout(), op(&mut session, command)).await {
            Ok(result) => {
                self.close(session).await;
                result
            }
            Err(_) => {
                // The session may be mid-response; drop it rather than attempt a clean close.
                warn!(
                    server = %self.server_kind,
                    timeout_secs = command.timeout().as_secs(),
                    "command timed out, dropping connection"
                );
                drop(session);
                Err(SqlConnectorError::Timeout(command.timeout().as_secs()))
            }
        }
    }

    async fn close(&self, session: Box<dyn Session>) {
        match session.close().await {
            Ok(()) => debug!(server = %self.server_kind, "connection closed"),
            Err(error) => warn!(server = %self.server_kind, %error, "closing connection failed"),
        }
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("server_kind", &self.server_kind)
            .field("connection_string", &"<redacted>")
            .field("driver", &self.driver)
            .finish()
    }
}

fn default_driver(server_kind: ServerKind) -> Arc<dyn Driver> {
    match server_kind {
        #[cfg(feature = "mssql")]
        ServerKind::Mssql => Arc::new(crate::mssql::MssqlDriver),
        #[cfg(feature = "mysql")]
        ServerKind::Mysql => Arc::new(crate::mysql::MysqlDriver),
    }
}
