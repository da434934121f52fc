use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ParameterSet;

/// Timeout applied when the caller passes zero or a negative value.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// How the command text is interpreted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    /// Literal SQL.
    #[default]
    Text,
    /// The text names a stored procedure; parameters become its arguments.
    StoredProcedure,
}

/// Per-call options for `execute`, `query_single` and `query_multiple`.
///
/// # Examples
/// ```rust
/// use sql_connector::prelude::*;
///
/// let options = CommandOptions::default()
///     .with_stored_procedure(true)
///     .with_timeout_seconds(120);
/// assert_eq!(options.command_type(), CommandType::StoredProcedure);
/// assert_eq!(options.timeout().as_secs(), 120);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandOptions {
    pub stored_procedure: bool,
    /// Zero or negative means [`DEFAULT_TIMEOUT_SECONDS`].
    pub timeout_seconds: i32,
}

impl CommandOptions {
    #[must_use]
    pub fn with_stored_procedure(mut self, stored_procedure: bool) -> Self {
        self.stored_procedure = stored_procedure;
        self
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: i32) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    #[must_use]
    pub fn command_type(&self) -> CommandType {
        if self.stored_procedure {
            CommandType::StoredProcedure
        } else {
            CommandType::Text
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        normalize_timeout(self.timeout_seconds)
    }
}

/// `timeout > 0 ? timeout : 30`, in seconds.
#[must_use]
pub fn normalize_timeout(timeout_seconds: i32) -> Duration {
    match u64::try_from(timeout_seconds) {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
    }
}

/// A command ready to hand to a backend session.
#[derive(Debug, Clone, Copy)]
pub struct Command<'a> {
    text: &'a str,
    command_type: CommandType,
    parameters: Option<&'a ParameterSet>,
    timeout: Duration,
}

impl<'a> Command<'a> {
    #[must_use]
    pub fn new(text: &'a str, parameters: Option<&'a ParameterSet>, options: CommandOptions) -> Self {
        Self {
            text,
            command_type: options.command_type(),
            parameters,
            timeout: options.timeout(),
        }
    }

    /// SQL text, or the procedure name for [`CommandType::StoredProcedure`].
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    #[must_use]
    pub fn parameters(&self) -> Option<&'a ParameterSet> {
        self.parameters
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters.map_or(0, ParameterSet::len)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_normalization() {
        assert_eq!(normalize_timeout(0), Duration::from_secs(30));
        assert_eq!(normalize_timeout(-4), Duration::from_secs(30));
        assert_eq!(normalize_timeout(1), Duration::from_secs(1));
        assert_eq!(normalize_timeout(600), Duration::from_secs(600));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: CommandOptions = serde_json::from_str(r#"{"stored_procedure": true}"#).unwrap();
        assert_eq!(options.command_type(), CommandType::StoredProcedure);
        assert_eq!(options.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn command_carries_normalized_options() {
        let params = ParameterSet::new().with("a", 1);
        let cmd = Command::new("sp_go", Some(&params), CommandOptions::default().with_timeout_seconds(-1));
        assert_eq!(cmd.command_type(), CommandType::Text);
        assert_eq!(cmd.timeout(), Duration::from_secs(30));
        assert_eq!(cmd.parameter_count(), 1);
    }
}
