use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::TryStreamExt;
use tiberius::{ColumnData, FromSql, QueryItem, QueryStream, Row};

use crate::error::SqlConnectorError;
use crate::results::{MultiResultSet, ResultSet};
use crate::types::RowValues;

/// Materialize up to `keep` result sets from a query stream.
///
/// The stream is always drained to the end so every statement in the batch runs and the
/// connection is left clean; result sets past `keep` are discarded. Each result set starts
/// at a metadata token, so a SELECT that matches nothing still yields an empty table.
///
/// # Errors
///
/// Returns the tiberius error if the stream fails or a value cannot be decoded.
pub async fn read_result_sets(
    mut stream: QueryStream<'_>,
    keep: usize,
) -> Result<MultiResultSet, SqlConnectorError> {
    let mut reader = TableReader::new(keep);

    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => {
                reader.start_table(|| meta.columns().iter().map(|col| col.name().to_string()).collect());
            }
            QueryItem::Row(row) => {
                if reader.wants_rows() {
                    reader.push_row(extract_values(row)?);
                }
            }
        }
    }

    Ok(reader.finish())
}

/// Builds tables from metadata/row events in stream order.
struct TableReader {
    tables: MultiResultSet,
    keep: usize,
    collecting: bool,
}

impl TableReader {
    fn new(keep: usize) -> Self {
        Self {
            tables: MultiResultSet::new(),
            keep,
            collecting: false,
        }
    }

    fn start_table(&mut self, column_names: impl FnOnce() -> Vec<String>) {
        self.collecting = self.tables.len() < self.keep;
        if self.collecting {
            self.tables.push(ResultSet::new(column_names()));
        }
    }

    fn wants_rows(&self) -> bool {
        self.collecting
    }

    fn push_row(&mut self, values: Vec<RowValues>) {
        if let Some(table) = self.tables.last_mut() {
            table.add_row_values(values);
        }
    }

    fn finish(self) -> MultiResultSet {
        self.tables
    }
}

fn extract_values(row: Row) -> Result<Vec<RowValues>, SqlConnectorError> {
    row.into_iter().map(extract_value).collect()
}

/// Convert one cell into `RowValues`.
fn extract_value(data: ColumnData<'static>) -> Result<RowValues, SqlConnectorError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(RowValues::Int),
        ColumnData::F32(v) => v.map(|v| RowValues::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(RowValues::Float),
        ColumnData::Bit(v) => v.map(RowValues::Bool),
        ColumnData::String(v) => v.map(|s| RowValues::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| RowValues::Text(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| RowValues::Blob(b.into_owned())),
        // Decimal text keeps full precision.
        ColumnData::Numeric(v) => v.map(|n| RowValues::Text(n.to_string())),
        ColumnData::Xml(v) => v.map(|x| RowValues::Text(x.into_owned().into_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(&data)?.map(RowValues::Timestamp)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(&data)?
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(RowValues::Timestamp),
        ColumnData::Time(_) => NaiveTime::from_sql(&data)?.map(|t| RowValues::Text(t.to_string())),
        ColumnData::DateTimeOffset(_) => DateTime::<FixedOffset>::from_sql(&data)?
            .map(|dt| RowValues::Timestamp(dt.naive_utc())),
        #[allow(unreachable_patterns)]
        _ => None,
    };

    Ok(value.unwrap_or(RowValues::Null))
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn integers_widen_to_int() {
        assert_eq!(extract_value(ColumnData::U8(Some(200))).unwrap(), RowValues::Int(200));
        assert_eq!(extract_value(ColumnData::I16(Some(-3))).unwrap(), RowValues::Int(-3));
        assert_eq!(extract_value(ColumnData::I64(Some(i64::MAX))).unwrap(), RowValues::Int(i64::MAX));
    }

    #[test]
    fn typed_nulls_become_null() {
        assert_eq!(extract_value(ColumnData::I32(None)).unwrap(), RowValues::Null);
        assert_eq!(extract_value(ColumnData::String(None)).unwrap(), RowValues::Null);
        assert_eq!(extract_value(ColumnData::DateTime2(None)).unwrap(), RowValues::Null);
    }

    #[test]
    fn strings_bits_and_binary() {
        assert_eq!(
            extract_value(ColumnData::String(Some(Cow::Borrowed("hi")))).unwrap(),
            RowValues::Text("hi".into())
        );
        assert_eq!(extract_value(ColumnData::Bit(Some(true))).unwrap(), RowValues::Bool(true));
        assert_eq!(
            extract_value(ColumnData::Binary(Some(Cow::Owned(vec![1, 2])))).unwrap(),
            RowValues::Blob(vec![1, 2])
        );
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn tables_follow_metadata_order_and_keep_empty_ones() {
        let mut reader = TableReader::new(usize::MAX);
        reader.start_table(|| cols(&["id"]));
        reader.push_row(vec![RowValues::Int(1)]);
        reader.push_row(vec![RowValues::Int(2)]);
        reader.start_table(|| cols(&["name", "qty"]));
        reader.start_table(|| cols(&["total"]));
        reader.push_row(vec![RowValues::Int(9)]);

        let tables = reader.finish();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].len(), 2);
        assert!(tables[1].is_empty());
        assert_eq!(tables[1].column_names(), ["name".to_string(), "qty".to_string()]);
        assert_eq!(tables[2].results[0].get("total"), Some(&RowValues::Int(9)));
    }

    #[test]
    fn tables_past_keep_are_skipped() {
        let mut reader = TableReader::new(1);
        reader.start_table(|| cols(&["a"]));
        reader.push_row(vec![RowValues::Int(1)]);
        reader.start_table(|| panic!("columns of a skipped table are never read"));
        assert!(!reader.wants_rows());

        let tables = reader.finish();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 1);
    }
}
