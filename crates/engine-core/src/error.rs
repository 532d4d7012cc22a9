use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContextError {
    #[error("No transform map was supplied to the on-start stage")]
    MissingContext,

    #[error("Transform map '{map}' is invalid: {reason}")]
    InvalidMap { map: String, reason: String },

    #[error("Import set identifier must not be empty")]
    MissingImportSet,
}

#[derive(Error, Debug)]
pub enum StateStoreError {
    #[error("Ignore set for run '{run_id}' has already been published")]
    AlreadyPublished { run_id: String },

    #[error("State storage failure: {0}")]
    Storage(String),

    #[error("Failed to (de)serialize published state: {0}")]
    Serialization(String),
}

impl From<sled::Error> for StateStoreError {
    fn from(err: sled::Error) -> Self {
        StateStoreError::Storage(err.to_string())
    }
}

impl From<bincode::Error> for StateStoreError {
    fn from(err: bincode::Error) -> Self {
        StateStoreError::Serialization(err.to_string())
    }
}
