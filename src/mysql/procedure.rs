use sqlx::MySqlConnection;

use crate::command::Command;
use crate::error::SqlConnectorError;
use crate::translation::BoundStatement;
use crate::types::RowValues;

const PROCEDURE_PARAMETERS: &str = "SELECT CAST(PARAMETER_NAME AS CHAR(64)), CAST(PARAMETER_MODE AS CHAR(5)) \
     FROM information_schema.PARAMETERS \
     WHERE SPECIFIC_SCHEMA = COALESCE(?, DATABASE()) AND SPECIFIC_NAME = ? \
     AND ROUTINE_TYPE = 'PROCEDURE' AND ORDINAL_POSITION > 0 \
     ORDER BY ORDINAL_POSITION";

/// Build a `CALL` for a stored procedure, binding arguments by name.
///
/// MySQL only accepts positional arguments, so the procedure's declared parameters are read
/// from `information_schema` and the supplied values are laid out in that order.
///
/// # Errors
///
/// `ParameterError` when a declared parameter is missing, a supplied one is not declared, or
/// the procedure has OUT/INOUT parameters; the sqlx error if the lookup fails.
pub async fn prepare_call(
    conn: &mut MySqlConnection,
    command: &Command<'_>,
) -> Result<BoundStatement, SqlConnectorError> {
    let name = command.text().trim();
    let (schema, routine) = split_routine_name(name);

    let declared: Vec<(Option<String>, Option<String>)> = sqlx::query_as(PROCEDURE_PARAMETERS)
        .bind(schema)
        .bind(routine.clone())
        .fetch_all(&mut *conn)
        .await?;

    let declared: Vec<(String, String)> = declared
        .into_iter()
        .map(|(name, mode)| (name.unwrap_or_default(), mode.unwrap_or_else(|| "IN".to_string())))
        .collect();
    let binds = order_arguments(&routine, &declared, command)?;

    let placeholders = vec!["?"; binds.len()].join(", ");
    Ok(BoundStatement {
        sql: format!("CALL {name}({placeholders})"),
        binds,
    })
}

fn order_arguments(
    routine: &str,
    declared: &[(String, String)],
    command: &Command<'_>,
) -> Result<Vec<RowValues>, SqlConnectorError> {
    let params = command.parameters();

    if let Some(params) = params {
        for (supplied, _) in params.iter() {
            if !declared.iter().any(|(name, _)| name.eq_ignore_ascii_case(supplied)) {
                return Err(SqlConnectorError::ParameterError(format!(
                    "procedure `{routine}` has no parameter `{supplied}`"
                )));
            }
        }
    }

    declared
        .iter()
        .map(|(name, mode)| {
            if !mode.eq_ignore_ascii_case("IN") {
                return Err(SqlConnectorError::ParameterError(format!(
                    "parameter `{name}` of procedure `{routine}` is {mode}; only IN parameters are supported"
                )));
            }
            params
                .and_then(|p| p.get(name))
                .cloned()
                .ok_or_else(|| {
                    SqlConnectorError::ParameterError(format!(
                        "procedure `{routine}` expects parameter `{name}`"
                    ))
                })
        })
        .collect()
}

/// `shop.close_order` or `` `shop`.`close_order` `` -> (Some("shop"), "close_order").
fn split_routine_name(name: &str) -> (Option<String>, String) {
    let unquote = |part: &str| part.trim().trim_matches('`').to_string();
    match name.split_once('.') {
        Some((schema, routine)) => (Some(unquote(schema)), unquote(routine)),
        None => (None, unquote(name)),
    }
}
