use thiserror::Error;

/// An action that is not valid in the current state.
///
/// The `Display` text doubles as the notice shown to the user; a rejected
/// action never changes any state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Stop the current session first")]
    SessionRunning,

    #[error("Stop the current session before loading a saved text")]
    LoadWhileRunning,

    #[error("A session is already running")]
    AlreadyRunning,

    #[error("No session is running")]
    NotRunning,

    #[error("Cannot save empty text")]
    EmptyText,

    #[error("Enter some text to practice first")]
    EmptySource,

    #[error("Max errors must be at least 1 (got {0})")]
    InvalidMaxErrors(usize),

    #[error("Text height must be at least 1 line")]
    InvalidTextHeight,

    #[error("Saved text {0} no longer exists")]
    UnknownEntry(String),
}

/// Failure while reading or writing the local key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
