use thiserror::Error;

/// Error type for the collaborators around the calculator.
///
/// The calculation itself never fails. These errors come from reading and writing
/// tables and session files, and from editing tables by index.
#[derive(Error, Debug)]
pub enum MarginError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid session file: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Could not serialise session: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Row index {index} is out of range for a table with {len} rows")]
    RowOutOfRange { index: usize, len: usize },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Convenience type for `Result<T, MarginError>`.
pub type MarginResult<T> = Result<T, MarginError>;
