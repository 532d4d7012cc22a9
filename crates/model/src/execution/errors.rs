use std::fmt;
use thiserror::Error;

/// Which projected column of an import row was unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Key,
    RowId,
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowField::Key => f.write_str("key"),
            RowField::RowId => f.write_str("row identifier"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("import row is missing its {0}")]
    Missing(RowField),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("setting '{key}' must not be empty")]
    Empty { key: String },

    #[error("setting '{key}' has invalid value '{value}': {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}
