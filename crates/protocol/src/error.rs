//! Protocol error types

use thiserror::Error;

/// Errors from parsing a pipe-delimited log line
#[derive(Debug, Error)]
pub enum ParseLineError {
    /// Wrong number of pipe-delimited fields
    #[error("expected 5 or 7 pipe-delimited fields, found {found}")]
    FieldCount { found: usize },

    /// A mandatory field is empty
    #[error("mandatory field `{0}` is empty")]
    EmptyField(&'static str),

    /// Timestamp does not match the fixed textual format
    #[error("invalid timestamp `{0}`")]
    Timestamp(String),

    /// Numeric field failed to parse
    #[error("invalid numeric value `{value}` for field `{field}`")]
    Number { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseLineError::FieldCount { found: 3 };
        assert!(err.to_string().contains("found 3"));

        let err = ParseLineError::EmptyField("id");
        assert!(err.to_string().contains("`id`"));

        let err = ParseLineError::Timestamp("not-a-time".into());
        assert!(err.to_string().contains("not-a-time"));

        let err = ParseLineError::Number {
            field: "random_number",
            value: "abc".into(),
        };
        assert!(err.to_string().contains("abc"));
    }
}
