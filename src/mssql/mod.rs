// MSSQL module - SQL Server backend built on tiberius
//
// - config: Connection string parsing
// - client: Raw client creation (SQL Browser lookup, routing redirects)
// - params: Statement preparation and parameter binding
// - query: Result set materialization
// - executor: The `Driver`/`Session` implementation used by `Connector`

pub mod client;
pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use client::create_mssql_client;
pub use config::{MssqlClient, parse_connection_string};
pub use executor::{MssqlDriver, MssqlSession};
pub use params::{bind_query_params, prepare_statement};
pub use query::read_result_sets;
