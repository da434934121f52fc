//! Named-parameter rewriting.
//!
//! Both drivers bind positionally: tiberius as `@P1, @P2, ...` and sqlx/MySQL as bare `?`.
//! Callers write `@name` (or `?name` on MySQL) and pass a [`ParameterSet`]; this module
//! rewrites the tokens whose names are in the set and returns the values in bind order.

mod parsers;
mod scanner;

use parsers::{is_name_char, scan_parameter_name};
use scanner::State;

use crate::types::{ParameterSet, RowValues};

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// SQL Server ordinals `@P1`; a name used twice reuses its ordinal.
    Mssql,
    /// MySQL positional `?`; every occurrence takes its own bind.
    Mysql,
}

/// SQL text with positional placeholders and the values to bind, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub binds: Vec<RowValues>,
}

impl BoundStatement {
    #[must_use]
    pub fn unbound(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            binds: Vec::new(),
        }
    }
}

/// Rewrite named parameters into the backend's positional placeholders.
///
/// Tokens inside string literals, quoted identifiers and comments are left alone, as are
/// `@@globals` and any `@name` not present in `params` (T-SQL locals, MySQL user variables).
/// Warning: the scanner is a lightweight state machine, not a SQL parser; exotic constructs
/// may still confuse it.
/// ```rust
/// use sql_connector::prelude::*;
///
/// let params = ParameterSet::new().with("id", 5);
/// let stmt = bind_named_parameters(
///     "select @id, '@id', @@rowcount where x = @id",
///     Some(&params),
///     PlaceholderStyle::Mssql,
/// );
/// assert_eq!(stmt.sql, "select @P1, '@id', @@rowcount where x = @P1");
/// assert_eq!(stmt.binds, vec![RowValues::Int(5)]);
/// ```
#[must_use]
pub fn bind_named_parameters(
    sql: &str,
    params: Option<&ParameterSet>,
    style: PlaceholderStyle,
) -> BoundStatement {
    let Some(params) = params.filter(|p| !p.is_empty()) else {
        return BoundStatement::unbound(sql);
    };

    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut ordinals: Vec<&str> = Vec::new();
    let mut binds = Vec::new();
    let mut state = State::Normal;
    let mut copied = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if state == State::Normal
            && is_parameter_prefix(bytes, idx, style)
            && let Some((end, name)) = scan_parameter_name(bytes, idx)
        {
            if let Some(value) = params.get(name) {
                out.push_str(&sql[copied..idx]);
                match style {
                    PlaceholderStyle::Mssql => {
                        let ordinal = match ordinals
                            .iter()
                            .position(|seen| seen.eq_ignore_ascii_case(name))
                        {
                            Some(pos) => pos + 1,
                            None => {
                                ordinals.push(name);
                                binds.push(value.clone());
                                ordinals.len()
                            }
                        };
                        out.push_str("@P");
                        out.push_str(&ordinal.to_string());
                    }
                    PlaceholderStyle::Mysql => {
                        out.push('?');
                        binds.push(value.clone());
                    }
                }
                copied = end;
            }
            idx = end;
            continue;
        }
        idx = state.step(bytes, idx, style) + 1;
    }

    out.push_str(&sql[copied..]);
    BoundStatement { sql: out, binds }
}

fn is_parameter_prefix(bytes: &[u8], idx: usize, style: PlaceholderStyle) -> bool {
    let b = bytes[idx];
    let prefix = b == b'@' || (b == b'?' && style == PlaceholderStyle::Mysql);
    let after_word = idx > 0 && (bytes[idx - 1] == b'@' || is_name_char(bytes[idx - 1]));
    prefix && !after_word && bytes.get(idx + 1) != Some(&b'@')
}

/// Split a batch on top-level `;`.
///
/// Segments holding only whitespace or comments are dropped. Each returned statement is
/// trimmed and carries no trailing semicolon.
#[must_use]
pub fn split_statements(sql: &str, style: PlaceholderStyle) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut state = State::Normal;
    let mut start = 0;
    let mut has_code = false;
    let mut idx = 0;

    while idx < bytes.len() {
        if state == State::Normal && bytes[idx] == b';' {
            if has_code {
                statements.push(sql[start..idx].trim());
            }
            start = idx + 1;
            has_code = false;
            idx += 1;
            continue;
        }
        has_code |= state.is_code(bytes, idx, style);
        idx = state.step(bytes, idx, style) + 1;
    }

    if has_code {
        statements.push(sql[start..].trim());
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ParameterSet {
        ParameterSet::new()
            .with("id", 7)
            .with("name", "bob")
            .with("gone", RowValues::Null)
    }

    #[test]
    fn mssql_reuses_ordinals_for_repeated_names() {
        let p = params();
        let stmt = bind_named_parameters(
            "update t set name = @name, deleted = @gone where id = @id or parent = @ID",
            Some(&p),
            PlaceholderStyle::Mssql,
        );
        assert_eq!(
            stmt.sql,
            "update t set name = @P1, deleted = @P2 where id = @P3 or parent = @P3"
        );
        assert_eq!(
            stmt.binds,
            vec![
                RowValues::Text("bob".into()),
                RowValues::Null,
                RowValues::Int(7)
            ]
        );
    }

    #[test]
    fn mysql_binds_every_occurrence() {
        let p = params();
        let stmt = bind_named_parameters(
            "select * from t where id = @id or parent = ?id and name = @name",
            Some(&p),
            PlaceholderStyle::Mysql,
        );
        assert_eq!(stmt.sql, "select * from t where id = ? or parent = ? and name = ?");
        assert_eq!(
            stmt.binds,
            vec![
                RowValues::Int(7),
                RowValues::Int(7),
                RowValues::Text("bob".into())
            ]
        );
    }

    #[test]
    fn leaves_unknown_names_and_globals_alone() {
        let p = params();
        let sql = "declare @local int = @id; select @local, @@ROWCOUNT, a@id from t";
        let stmt = bind_named_parameters(sql, Some(&p), PlaceholderStyle::Mssql);
        assert_eq!(
            stmt.sql,
            "declare @local int = @P1; select @local, @@ROWCOUNT, a@id from t"
        );
        assert_eq!(stmt.binds, vec![RowValues::Int(7)]);
    }

    #[test]
    fn skips_literals_identifiers_and_comments() {
        let p = params();
        let sql = "select '@id', [@id], \"@id\" -- @id\n/* @name /* @id */ @name */ from t where a = @id";
        let stmt = bind_named_parameters(sql, Some(&p), PlaceholderStyle::Mssql);
        assert_eq!(
            stmt.sql,
            "select '@id', [@id], \"@id\" -- @id\n/* @name /* @id */ @name */ from t where a = @P1"
        );

        let sql = "select 'it\\'s @id', `@id` # @id\n from t where a = @id";
        let stmt = bind_named_parameters(sql, Some(&p), PlaceholderStyle::Mysql);
        assert_eq!(stmt.sql, "select 'it\\'s @id', `@id` # @id\n from t where a = ?");
        assert_eq!(stmt.binds.len(), 1);
    }

    #[test]
    fn bare_question_mark_is_untouched() {
        let p = params();
        let stmt = bind_named_parameters("select ? , @id", Some(&p), PlaceholderStyle::Mysql);
        assert_eq!(stmt.sql, "select ? , ?");
        assert_eq!(stmt.binds, vec![RowValues::Int(7)]);
    }

    #[test]
    fn no_parameters_passes_text_through() {
        let stmt = bind_named_parameters("select @id", None, PlaceholderStyle::Mssql);
        assert_eq!(stmt, BoundStatement::unbound("select @id"));
        let stmt = bind_named_parameters("", Some(&params()), PlaceholderStyle::Mysql);
        assert_eq!(stmt.sql, "");
    }

    #[test]
    fn splits_on_top_level_semicolons() {
        let sql = "select 1; select ';' as x;  -- trailing note\n; /* only */ ;select `a;b` from t";
        assert_eq!(
            split_statements(sql, PlaceholderStyle::Mysql),
            vec!["select 1", "select ';' as x", "select `a;b` from t"]
        );
    }

    #[test]
    fn split_keeps_single_statement_without_semicolon() {
        assert_eq!(
            split_statements("  call p(?)  ", PlaceholderStyle::Mysql),
            vec!["call p(?)"]
        );
        assert!(split_statements("   ", PlaceholderStyle::Mysql).is_empty());
    }
}
