use async_trait::async_trait;
use sqlx::{ConnectOptions, Connection, MySqlConnection};

use super::config::parse_connection_string;
use super::params::prepare_text_statements;
use super::procedure::prepare_call;
use super::query::{execute_statements, read_result_sets};
use crate::command::{Command, CommandType};
use crate::driver::{Driver, Session};
use crate::error::SqlConnectorError;
use crate::results::{MultiResultSet, ResultSet};
use crate::translation::BoundStatement;

/// Opens single sqlx connections (no pool).
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDriver;

#[async_trait]
impl Driver for MysqlDriver {
    async fn open(&self, connection_string: &str) -> Result<Box<dyn Session>, SqlConnectorError> {
        let options = parse_connection_string(connection_string)?;
        let conn = options.connect().await?;
        Ok(Box::new(MysqlSession { conn }))
    }
}

/// One MySQL connection.
pub struct MysqlSession {
    conn: MySqlConnection,
}

impl MysqlSession {
    async fn statements(&mut self, command: &Command<'_>) -> Result<Vec<BoundStatement>, SqlConnectorError> {
        match command.command_type() {
            CommandType::Text => Ok(prepare_text_statements(command)),
            CommandType::StoredProcedure => Ok(vec![prepare_call(&mut self.conn, command).await?]),
        }
    }
}

#[async_trait]
impl Session for MysqlSession {
    async fn execute_non_query(&mut self, command: &Command<'_>) -> Result<u64, SqlConnectorError> {
        let statements = self.statements(command).await?;
        execute_statements(&mut self.conn, &statements).await
    }

    async fn execute_reader(
        &mut self,
        command: &Command<'_>,
    ) -> Result<Option<ResultSet>, SqlConnectorError> {
        let statements = self.statements(command).await?;
        Ok(read_result_sets(&mut self.conn, &statements, 1).await?.into_first())
    }

    async fn execute_batch(
        &mut self,
        command: &Command<'_>,
    ) -> Result<MultiResultSet, SqlConnectorError> {
        let statements = self.statements(command).await?;
        read_result_sets(&mut self.conn, &statements, usize::MAX).await
    }

    async fn close(self: Box<Self>) -> Result<(), SqlConnectorError> {
        self.conn.close().await?;
        Ok(())
    }
}
