use async_trait::async_trait;

use super::client::create_mssql_client;
use super::config::MssqlClient;
use super::params::{bind_query_params, prepare_statement};
use super::query::read_result_sets;
use crate::command::Command;
use crate::driver::{Driver, Session};
use crate::error::SqlConnectorError;
use crate::results::{MultiResultSet, ResultSet};

/// Opens plain tiberius connections; pooling is left to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlDriver;

#[async_trait]
impl Driver for MssqlDriver {
    async fn open(&self, connection_string: &str) -> Result<Box<dyn Session>, SqlConnectorError> {
        let client = create_mssql_client(connection_string).await?;
        Ok(Box::new(MssqlSession { client }))
    }
}

/// One SQL Server connection.
pub struct MssqlSession {
    client: MssqlClient,
}

#[async_trait]
impl Session for MssqlSession {
    /// Execute a DML command and sum the rows affected across every statement in the batch.
    async fn execute_non_query(&mut self, command: &Command<'_>) -> Result<u64, SqlConnectorError> {
        let statement = prepare_statement(command)?;
        let exec_result = bind_query_params(&statement).execute(&mut self.client).await?;
        Ok(exec_result.rows_affected().iter().sum())
    }

    async fn execute_reader(
        &mut self,
        command: &Command<'_>,
    ) -> Result<Option<ResultSet>, SqlConnectorError> {
        let statement = prepare_statement(command)?;
        let stream = bind_query_params(&statement).query(&mut self.client).await?;
        Ok(read_result_sets(stream, 1).await?.into_first())
    }

    async fn execute_batch(
        &mut self,
        command: &Command<'_>,
    ) -> Result<MultiResultSet, SqlConnectorError> {
        let statement = prepare_statement(command)?;
        let stream = bind_query_params(&statement).query(&mut self.client).await?;
        read_result_sets(stream, usize::MAX).await
    }

    async fn close(self: Box<Self>) -> Result<(), SqlConnectorError> {
        self.client.close().await?;
        Ok(())
    }
}
