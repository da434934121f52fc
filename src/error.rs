use thiserror::Error;

/// Errors surfaced by a [`Connector`](crate::Connector) call.
///
/// Driver errors pass through unchanged in the transparent variants so callers see the
/// backend's own message.
#[derive(Debug, Error)]
pub enum SqlConnectorError {
    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[cfg(feature = "mysql")]
    #[error(transparent)]
    MysqlError(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Command timed out after {0} seconds")]
    Timeout(u64),
}
