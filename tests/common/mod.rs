#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sql_connector::prelude::*;

/// What a stub session saw.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub text: String,
    pub command_type: CommandType,
    pub parameters: Option<ParameterSet>,
    pub timeout: Duration,
}

/// How a stub session answers every command.
#[derive(Debug, Clone)]
pub enum Script {
    Affected(u64),
    Table(Option<ResultSet>),
    Tables(MultiResultSet),
    Fail(String),
    Hang,
}

#[derive(Debug)]
pub struct StubDriver {
    script: Script,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<Recorded>>>,
}

impl StubDriver {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            commands: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<Recorded> {
        self.commands.lock().unwrap().clone()
    }

    pub fn last_command(&self) -> Recorded {
        self.commands().pop().expect("no command was run")
    }
}

pub fn connector(kind: ServerKind, connection_string: &str, driver: &Arc<StubDriver>) -> Connector {
    let driver: Arc<dyn Driver> = driver.clone();
    Connector::with_driver(kind, connection_string, driver)
}

/// A table of `rows` rows with ids 1..=rows.
pub fn table(rows: i64) -> ResultSet {
    let mut rs = ResultSet::new(vec!["id".to_string(), "name".to_string()]);
    for id in 1..=rows {
        rs.add_row_values(vec![RowValues::Int(id), RowValues::Text(format!("row {id}"))]);
    }
    rs
}

#[async_trait]
impl Driver for StubDriver {
    async fn open(&self, _connection_string: &str) -> Result<Box<dyn Session>, SqlConnectorError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSession {
            script: self.script.clone(),
            closes: Arc::clone(&self.closes),
            commands: Arc::clone(&self.commands),
        }))
    }
}

struct StubSession {
    script: Script,
    closes: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<Recorded>>>,
}

impl StubSession {
    async fn answer(&self, command: &Command<'_>) -> Result<Script, SqlConnectorError> {
        self.commands.lock().unwrap().push(Recorded {
            text: command.text().to_string(),
            command_type: command.command_type(),
            parameters: command.parameters().cloned(),
            timeout: command.timeout(),
        });
        match &self.script {
            Script::Fail(message) => Err(SqlConnectorError::ExecutionError(message.clone())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(SqlConnectorError::ExecutionError("woke up".to_string()))
            }
            other => Ok(other.clone()),
        }
    }
}

fn wrong_script() -> SqlConnectorError {
    SqlConnectorError::ExecutionError("script does not fit this operation".to_string())
}

#[async_trait]
impl Session for StubSession {
    async fn execute_non_query(&mut self, command: &Command<'_>) -> Result<u64, SqlConnectorError> {
        match self.answer(command).await? {
            Script::Affected(n) => Ok(n),
            _ => Err(wrong_script()),
        }
    }

    async fn execute_reader(
        &mut self,
        command: &Command<'_>,
    ) -> Result<Option<ResultSet>, SqlConnectorError> {
        match self.answer(command).await? {
            Script::Table(table) => Ok(table),
            _ => Err(wrong_script()),
        }
    }

    async fn execute_batch(
        &mut self,
        command: &Command<'_>,
    ) -> Result<MultiResultSet, SqlConnectorError> {
        match self.answer(command).await? {
            Script::Tables(tables) => Ok(tables),
            _ => Err(wrong_script()),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), SqlConnectorError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
