use tiberius::Config as TiberiusConfig;
use tiberius::Client;
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

use crate::error::SqlConnectorError;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Parse a SQL Server connection string.
///
/// ADO.NET strings (`server=tcp:host,1433;database=app;user id=sa;password=...`) are the
/// norm; strings starting with `jdbc:sqlserver://` are parsed as JDBC URLs.
///
/// # Errors
///
/// Returns `SqlConnectorError::ConfigError` for an empty string and the tiberius error for
/// anything it rejects.
pub fn parse_connection_string(connection_string: &str) -> Result<TiberiusConfig, SqlConnectorError> {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() {
        return Err(SqlConnectorError::ConfigError(
            "SQL Server connection string is empty".to_string(),
        ));
    }

    let config = if trimmed
        .get(..17)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("jdbc:sqlserver://"))
    {
        TiberiusConfig::from_jdbc_string(trimmed)?
    } else {
        TiberiusConfig::from_ado_string(trimmed)?
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ado_strings() {
        let config = parse_connection_string(
            "server=tcp:db.internal,14330;database=app;user id=svc;password=pw;TrustServerCertificate=true",
        )
        .unwrap();
        assert_eq!(config.get_addr(), "db.internal:14330");
    }

    #[test]
    fn parses_jdbc_strings() {
        let config =
            parse_connection_string("jdbc:sqlserver://db.internal:1444;databaseName=app;user=svc;password=pw")
                .unwrap();
        assert_eq!(config.get_addr(), "db.internal:1444");
    }

    #[test]
    fn rejects_blank_strings() {
        assert!(matches!(
            parse_connection_string("   "),
            Err(SqlConnectorError::ConfigError(_))
        ));
    }
}
