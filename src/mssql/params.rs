use tiberius::Query;

use crate::command::{Command, CommandType};
use crate::error::SqlConnectorError;
use crate::translation::{BoundStatement, PlaceholderStyle, bind_named_parameters};
use crate::types::RowValues;

/// Turn a command into T-SQL with `@P<n>` placeholders.
///
/// Text commands have their `@name` tokens rewritten. A stored procedure becomes
/// `EXEC <name> @a = @P1, @b = @P2`, so arguments bind by name and order does not matter.
/// Argument names are emitted as the caller spelled them.
///
/// # Errors
///
/// `ParameterError` when a stored procedure argument name is not a plain T-SQL identifier.
pub fn prepare_statement(command: &Command<'_>) -> Result<BoundStatement, SqlConnectorError> {
    match command.command_type() {
        CommandType::Text => Ok(bind_named_parameters(
            command.text(),
            command.parameters(),
            PlaceholderStyle::Mssql,
        )),
        CommandType::StoredProcedure => {
            let mut sql = format!("EXEC {}", command.text().trim());
            let mut binds = Vec::with_capacity(command.parameter_count());
            for (i, (name, value)) in command.parameters().into_iter().flat_map(|p| p.iter()).enumerate() {
                if !is_argument_name(name) {
                    return Err(SqlConnectorError::ParameterError(format!(
                        "`{name}` is not a valid procedure argument name"
                    )));
                }
                sql.push_str(if i == 0 { " " } else { ", " });
                sql.push_str(&format!("@{name} = @P{}", i + 1));
                binds.push(value.clone());
            }
            Ok(BoundStatement { sql, binds })
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_@$#]*`
fn is_argument_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '$' | '#'))
}

/// Bind parameters directly to the query for SQL Server
/// Return a query builder with parameters already bound
pub fn bind_query_params(statement: &BoundStatement) -> Query<'_> {
    let mut query_builder = Query::new(statement.sql.as_str());

    for param in &statement.binds {
        match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Text(s) => query_builder.bind(s.clone()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => query_builder.bind(*dt),
            RowValues::Null => query_builder.bind(Option::<String>::None),
            RowValues::JSON(jsval) => query_builder.bind(jsval.to_string()),
            RowValues::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOptions;
    use crate::types::ParameterSet;

    #[test]
    fn stored_procedure_binds_arguments_by_name() {
        let params = ParameterSet::new()
            .with("@Status", "open")
            .with("owner", RowValues::Null);
        let command = Command::new(
            "dbo.usp_close_tickets",
            Some(&params),
            CommandOptions::default().with_stored_procedure(true),
        );
        let stmt = prepare_statement(&command).unwrap();
        assert_eq!(
            stmt.sql,
            "EXEC dbo.usp_close_tickets @owner = @P1, @Status = @P2"
        );
        assert_eq!(stmt.binds, vec![RowValues::Null, RowValues::Text("open".into())]);
    }

    #[test]
    fn stored_procedure_keeps_mixed_case_names() {
        let params = ParameterSet::new().with("@CustomerId", 1);
        let command = Command::new("dbo.p", Some(&params), CommandOptions::default().with_stored_procedure(true));
        assert_eq!(prepare_statement(&command).unwrap().sql, "EXEC dbo.p @CustomerId = @P1");
    }

    #[test]
    fn stored_procedure_rejects_names_that_are_not_identifiers() {
        for bad in ["x = 1; DROP TABLE t; --", "a b", "1st", "name]", "@"] {
            let params = ParameterSet::new().with(bad, 1);
            let command = Command::new("dbo.p", Some(&params), CommandOptions::default().with_stored_procedure(true));
            assert!(
                matches!(prepare_statement(&command), Err(SqlConnectorError::ParameterError(_))),
                "{bad:?} was accepted"
            );
        }

        let params = ParameterSet::new().with("@_tmp$1", 1).with("rows#", 2);
        let command = Command::new("dbo.p", Some(&params), CommandOptions::default().with_stored_procedure(true));
        assert_eq!(
            prepare_statement(&command).unwrap().sql,
            "EXEC dbo.p @_tmp$1 = @P1, @rows# = @P2"
        );
    }

    #[test]
    fn stored_procedure_without_parameters() {
        let command = Command::new("usp_ping", None, CommandOptions::default().with_stored_procedure(true));
        assert_eq!(prepare_statement(&command).unwrap().sql, "EXEC usp_ping");
    }

    #[test]
    fn text_command_rewrites_names() {
        let params = ParameterSet::new().with("id", 3);
        let command = Command::new("delete from t where id = @id", Some(&params), CommandOptions::default());
        let stmt = prepare_statement(&command).unwrap();
        assert_eq!(stmt.sql, "delete from t where id = @P1");
        assert_eq!(stmt.binds, vec![RowValues::Int(3)]);
    }
}
