// MySQL module - MySQL backend built on sqlx
//
// - config: Connection string parsing (URLs and MySql.Data-style key/value strings)
// - params: Statement splitting and parameter binding
// - procedure: Stored procedure calls resolved through information_schema
// - query: Result set materialization
// - executor: The `Driver`/`Session` implementation used by `Connector`

pub mod config;
pub mod executor;
pub mod params;
pub mod procedure;
pub mod query;

pub use config::parse_connection_string;
pub use executor::{MysqlDriver, MysqlSession};
pub use params::{bind_query, prepare_text_statements};
pub use procedure::prepare_call;
pub use query::{execute_statements, read_result_sets};
