mod result_set;
mod row;

pub use result_set::{MultiResultSet, ResultSet};
pub use row::CustomDbRow;
