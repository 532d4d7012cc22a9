use connectors::file::csv::error::FileError;
use engine_core::error::StateStoreError;
use engine_processing::error::OnStartError;
use model::execution::errors::SettingsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid import settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to load the import file: {0}")]
    File(#[from] FileError),

    #[error("On-start stage aborted: {0}")]
    OnStart(#[from] OnStartError),

    #[error("State store error: {0}")]
    State(#[from] StateStoreError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("No ignore set published for run '{0}'")]
    RunNotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
