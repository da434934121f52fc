use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::types::Json;

use crate::command::Command;
use crate::translation::{BoundStatement, PlaceholderStyle, bind_named_parameters, split_statements};
use crate::types::RowValues;

pub type MysqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

/// Bind a text command's named parameters.
///
/// A command with nothing to bind goes to the server whole, so compound bodies
/// (`BEGIN ... END`) and multi-statement batches reach MySQL as written. Prepared statements
/// hold one statement each, so a command with values is split on top-level `;` and every
/// statement binds its own placeholders.
#[must_use]
pub fn prepare_text_statements(command: &Command<'_>) -> Vec<BoundStatement> {
    let text = command.text();
    let whole = bind_named_parameters(text, command.parameters(), PlaceholderStyle::Mysql);
    if whole.binds.is_empty() {
        return vec![BoundStatement::unbound(text)];
    }
    split_statements(text, PlaceholderStyle::Mysql)
        .into_iter()
        .map(|sql| bind_named_parameters(sql, command.parameters(), PlaceholderStyle::Mysql))
        .collect()
}

/// Build a sqlx query with every positional value bound.
#[must_use]
pub fn bind_query(statement: &BoundStatement) -> MysqlQuery<'_> {
    statement
        .binds
        .iter()
        .fold(sqlx::query(&statement.sql), bind_value)
}

fn bind_value<'q>(query: MysqlQuery<'q>, value: &RowValues) -> MysqlQuery<'q> {
    match value {
        RowValues::Int(i) => query.bind(*i),
        RowValues::Float(f) => query.bind(*f),
        RowValues::Text(s) => query.bind(s.clone()),
        RowValues::Bool(b) => query.bind(*b),
        RowValues::Timestamp(dt) => query.bind(*dt),
        RowValues::Null => query.bind(Option::<String>::None),
        RowValues::JSON(jsval) => query.bind(Json(jsval.clone())),
        RowValues::Blob(bytes) => query.bind(bytes.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOptions;
    use crate::types::ParameterSet;

    #[test]
    fn batches_bind_per_statement() {
        let params = ParameterSet::new().with("id", 9).with("note", RowValues::Null);
        let command = Command::new(
            "update t set note = @note where id = @id; select * from t where id = ?id;",
            Some(&params),
            CommandOptions::default(),
        );
        let statements = prepare_text_statements(&command);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].sql, "update t set note = ? where id = ?");
        assert_eq!(statements[0].binds, vec![RowValues::Null, RowValues::Int(9)]);
        assert_eq!(statements[1].sql, "select * from t where id = ?");
        assert_eq!(statements[1].binds, vec![RowValues::Int(9)]);
    }

    #[test]
    fn unbound_commands_are_sent_whole() {
        let body = "CREATE PROCEDURE p() BEGIN SELECT 1; SELECT 2; END";
        let command = Command::new(body, None, CommandOptions::default());
        assert_eq!(prepare_text_statements(&command), vec![BoundStatement::unbound(body)]);

        let params = ParameterSet::new().with("unused", 1);
        let batch = "select @@version; select * from t where note = '@unused';";
        let command = Command::new(batch, Some(&params), CommandOptions::default());
        assert_eq!(prepare_text_statements(&command), vec![BoundStatement::unbound(batch)]);
    }

    #[test]
    fn empty_text_is_passed_through() {
        let command = Command::new("", None, CommandOptions::default());
        assert_eq!(prepare_text_statements(&command), vec![BoundStatement::unbound("")]);
    }
}
