use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use super::row::{CustomDbRow, index_columns};
use crate::types::RowValues;

/// One materialized result set: column metadata plus rows in the order the driver returned
/// them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create an empty result set with the given columns.
    #[must_use]
    pub fn new(column_names: Vec<String>) -> ResultSet {
        let column_index = Arc::new(index_columns(&column_names));
        ResultSet {
            results: Vec::new(),
            column_names: Arc::new(column_names),
            column_index,
        }
    }

    /// Column names in select-list order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Append a row. Values are positional and follow [`column_names`](Self::column_names).
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        self.results.push(CustomDbRow {
            column_names: Arc::clone(&self.column_names),
            rows: row_values,
            column_index_cache: Arc::clone(&self.column_index),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[CustomDbRow] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomDbRow> {
        self.results.iter()
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&CustomDbRow> {
        self.results.get(row)
    }

    /// Render the rows as a JSON array of objects keyed by column name.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let rows = self
            .results
            .iter()
            .map(|row| {
                let object: Map<String, JsonValue> = self
                    .column_names
                    .iter()
                    .zip(row.rows.iter())
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect();
                JsonValue::Object(object)
            })
            .collect();
        JsonValue::Array(rows)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CustomDbRow;
    type IntoIter = std::slice::Iter<'a, CustomDbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Every result set produced by one command, in statement order.
#[derive(Debug, Clone, Default)]
pub struct MultiResultSet {
    tables: Vec<ResultSet>,
}

impl MultiResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: ResultSet) {
        self.tables.push(table);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn tables(&self) -> &[ResultSet] {
        &self.tables
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ResultSet> {
        self.tables.get(index)
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut ResultSet> {
        self.tables.last_mut()
    }

    /// Take the first result set, dropping the rest.
    #[must_use]
    pub fn into_first(self) -> Option<ResultSet> {
        self.tables.into_iter().next()
    }
}

impl Index<usize> for MultiResultSet {
    type Output = ResultSet;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tables[index]
    }
}

impl IntoIterator for MultiResultSet {
    type Item = ResultSet;
    type IntoIter = std::vec::IntoIter<ResultSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

impl FromIterator<ResultSet> for MultiResultSet {
    fn from_iter<I: IntoIterator<Item = ResultSet>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}
