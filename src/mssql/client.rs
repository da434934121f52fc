use tiberius::error::Error as TiberiusError;
use tiberius::{Client, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::debug;

use super::config::{MssqlClient, parse_connection_string};
use crate::error::SqlConnectorError;

/// Helper function to create a new MSSQL connection from a connection string
///
/// Named instances (`server=host\\instance`) are resolved through the SQL Browser service.
/// A routing redirect (Azure SQL gateways) is followed once.
///
/// # Errors
/// Returns the tiberius or I/O error if the server cannot be reached or rejects the login.
pub async fn create_mssql_client(connection_string: &str) -> Result<MssqlClient, SqlConnectorError> {
    let config = parse_connection_string(connection_string)?;

    let tcp = TcpStream::connect_named(&config).await?;
    tcp.set_nodelay(true)?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        Err(TiberiusError::Routing { host, port }) => {
            debug!(%host, port, "SQL Server redirected connection");
            let mut config = config;
            config.host(&host);
            config.port(port);

            let tcp = TcpStream::connect(config.get_addr()).await?;
            tcp.set_nodelay(true)?;
            Ok(Client::connect(config, tcp.compat_write()).await?)
        }
        Err(e) => Err(e.into()),
    }
}
