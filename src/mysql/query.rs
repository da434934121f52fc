use chrono::{NaiveDate, NaiveDateTime};
use futures_util::TryStreamExt;
use futures_util::stream::BoxStream;
use serde_json::Value as JsonValue;
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::{MySqlQueryResult, MySqlRow};
use sqlx::{Column, Either, Executor, MySqlConnection, Row, Statement, TypeInfo, ValueRef};

use tracing::debug;

use super::params::bind_query;
use crate::error::SqlConnectorError;
use crate::results::{MultiResultSet, ResultSet};
use crate::translation::{BoundStatement, PlaceholderStyle, split_statements};
use crate::types::RowValues;

/// Execute each statement in order and sum the rows affected.
///
/// # Errors
///
/// Returns the sqlx error of the first failing statement; earlier statements stay applied.
pub async fn execute_statements(
    conn: &mut MySqlConnection,
    statements: &[BoundStatement],
) -> Result<u64, SqlConnectorError> {
    let mut rows_affected = 0;
    for statement in statements {
        let result = if statement.binds.is_empty() {
            (&mut *conn).execute(sqlx::raw_sql(&statement.sql)).await?
        } else {
            (&mut *conn).execute(bind_query(statement)).await?
        };
        rows_affected += result.rows_affected();
    }
    Ok(rows_affected)
}

/// Execute each statement in order and materialize up to `keep` result sets.
///
/// Every statement runs even after `keep` tables are collected. The MySQL protocol sends no
/// column metadata for an empty result set, so one is recovered by preparing the statement
/// that produced it. That needs a one-to-one match between the command's top-level
/// statements and the server's responses: an empty set is kept when it comes from a
/// row-returning statement (`SELECT`, `WITH`, `SHOW`, ...) in such a command. Empty sets
/// returned from inside a `CALL` cannot be told apart from its status response and are
/// dropped; sets with rows are always kept.
///
/// # Errors
///
/// Returns the sqlx error of the first failing statement or undecodable value.
pub async fn read_result_sets(
    conn: &mut MySqlConnection,
    statements: &[BoundStatement],
    keep: usize,
) -> Result<MultiResultSet, SqlConnectorError> {
    let mut tables = MultiResultSet::new();

    for statement in statements {
        let responses = {
            let mut stream = fetch_many(conn, statement);
            let mut collector = ResponseCollector::new(keep.saturating_sub(tables.len()));
            while let Some(item) = stream.try_next().await? {
                match item {
                    Either::Right(row) => {
                        if collector.wants_rows() {
                            collector.push_row(|| column_names(&row), extract_values(&row)?);
                        }
                    }
                    Either::Left(_) => collector.end_response(),
                }
            }
            collector.finish()
        };

        let pieces = if statement.binds.is_empty() {
            split_statements(&statement.sql, PlaceholderStyle::Mysql)
        } else {
            vec![statement.sql.as_str()]
        };
        let mut recovered = Vec::new();
        for (index, sql) in empty_set_sources(&responses, &pieces) {
            if let Some(columns) = prepared_columns(conn, sql).await {
                recovered.push((index, columns));
            }
        }

        for table in assemble(responses, recovered) {
            if tables.len() < keep {
                tables.push(table);
            }
        }
    }

    Ok(tables)
}

async fn prepared_columns(conn: &mut MySqlConnection, sql: &str) -> Option<Vec<String>> {
    match (&mut *conn).prepare(sql).await {
        Ok(prepared) => {
            let columns: Vec<String> = prepared
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect();
            (!columns.is_empty()).then_some(columns)
        }
        Err(error) => {
            debug!(%error, "could not prepare statement for empty result set columns");
            None
        }
    }
}

/// What the server sent for one response: rows, nothing, or rows not needed.
#[derive(Debug)]
enum Response {
    Rows(ResultSet),
    Empty,
    Skipped,
}

/// Groups a `fetch_many` stream into responses. Each response ends at a `Left` item.
struct ResponseCollector {
    responses: Vec<Response>,
    current: Option<ResultSet>,
    keep: usize,
    with_rows: usize,
    skipping: bool,
}

impl ResponseCollector {
    fn new(keep: usize) -> Self {
        Self {
            responses: Vec::new(),
            current: None,
            keep,
            with_rows: 0,
            skipping: false,
        }
    }

    /// False once `keep` sets with rows precede the current one; it can never be kept.
    fn wants_rows(&mut self) -> bool {
        if self.current.is_none() && !self.skipping && self.with_rows >= self.keep {
            self.skipping = true;
        }
        !self.skipping
    }

    fn push_row(&mut self, column_names: impl FnOnce() -> Vec<String>, values: Vec<RowValues>) {
        self.current
            .get_or_insert_with(|| ResultSet::new(column_names()))
            .add_row_values(values);
    }

    fn end_response(&mut self) {
        let response = match self.current.take() {
            Some(table) => {
                self.with_rows += 1;
                Response::Rows(table)
            }
            None if self.skipping => Response::Skipped,
            None => Response::Empty,
        };
        self.skipping = false;
        self.responses.push(response);
    }

    fn finish(mut self) -> Vec<Response> {
        if self.current.is_some() || self.skipping {
            self.end_response();
        }
        self.responses
    }
}

/// Pair empty responses with the statements that produced them, when that pairing is
/// unambiguous and the statement returns rows.
fn empty_set_sources<'s>(responses: &[Response], pieces: &[&'s str]) -> Vec<(usize, &'s str)> {
    if responses.len() != pieces.len() {
        return Vec::new();
    }
    responses
        .iter()
        .zip(pieces)
        .enumerate()
        .filter(|(_, (response, sql))| matches!(response, Response::Empty) && returns_rows(sql))
        .map(|(index, (_, sql))| (index, *sql))
        .collect()
}

/// Tables in response order: sets with rows plus the empty sets whose columns were recovered.
fn assemble(responses: Vec<Response>, recovered: Vec<(usize, Vec<String>)>) -> Vec<ResultSet> {
    let mut recovered = recovered.into_iter().peekable();
    let mut tables = Vec::new();
    for (index, response) in responses.into_iter().enumerate() {
        match response {
            Response::Rows(table) => tables.push(table),
            Response::Empty => {
                if let Some((_, columns)) = recovered.next_if(|(at, _)| *at == index) {
                    tables.push(ResultSet::new(columns));
                }
            }
            Response::Skipped => {}
        }
    }
    tables
}

/// Statements without values go over the text protocol; MySQL refuses to prepare some
/// statements (CREATE PROCEDURE, for one).
fn fetch_many<'e>(
    conn: &'e mut MySqlConnection,
    statement: &'e BoundStatement,
) -> BoxStream<'e, Result<Either<MySqlQueryResult, MySqlRow>, sqlx::Error>> {
    if statement.binds.is_empty() {
        conn.fetch_many(sqlx::raw_sql(&statement.sql))
    } else {
        conn.fetch_many(bind_query(statement))
    }
}

/// Leading keyword check for statements that produce a result set.
fn returns_rows(sql: &str) -> bool {
    let mut rest = sql.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("--").or_else(|| rest.strip_prefix('#')) {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail).trim_start();
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail).trim_start();
        } else {
            break;
        }
    }
    if rest.starts_with('(') {
        return true;
    }
    let keyword: String = rest
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    matches!(
        keyword.as_str(),
        "select" | "with" | "show" | "values" | "table" | "describe" | "desc" | "explain"
    )
}

fn column_names(row: &MySqlRow) -> Vec<String> {
    row.columns().iter().map(|col| col.name().to_string()).collect()
}

fn extract_values(row: &MySqlRow) -> Result<Vec<RowValues>, SqlConnectorError> {
    (0..row.len()).map(|idx| extract_value(row, idx)).collect()
}

/// Decode one cell by its reported MySQL type.
///
/// Integers are read without sqlx's width check so every integer column decodes to `Int`;
/// unsigned values past `i64::MAX` fall back to text, as do decimals.
fn extract_value(row: &MySqlRow, idx: usize) -> Result<RowValues, SqlConnectorError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(RowValues::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let value = match type_name.as_str() {
        "BOOLEAN" => RowValues::Bool(row.try_get::<bool, _>(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            RowValues::Int(row.try_get_unchecked::<i64, _>(idx)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" => {
            let value = row.try_get_unchecked::<u64, _>(idx)?;
            i64::try_from(value).map_or_else(|_| RowValues::Text(value.to_string()), RowValues::Int)
        }
        "FLOAT" => RowValues::Float(f64::from(row.try_get::<f32, _>(idx)?)),
        "DOUBLE" => RowValues::Float(row.try_get::<f64, _>(idx)?),
        "DECIMAL" => RowValues::Text(row.try_get_unchecked::<String, _>(idx)?),
        "DATETIME" | "TIMESTAMP" => RowValues::Timestamp(row.try_get::<NaiveDateTime, _>(idx)?),
        "DATE" => row
            .try_get::<NaiveDate, _>(idx)?
            .and_hms_opt(0, 0, 0)
            .map_or(RowValues::Null, RowValues::Timestamp),
        // TIME spans -838:59:59 to 838:59:59, beyond a time of day.
        "TIME" => RowValues::Text(row.try_get::<MySqlTime, _>(idx)?.to_string()),
        "JSON" => RowValues::JSON(row.try_get::<JsonValue, _>(idx)?),
        "BIT" | "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
        | "GEOMETRY" => RowValues::Blob(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        _ => RowValues::Text(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}
