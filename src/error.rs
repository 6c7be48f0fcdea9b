use thiserror::Error;

#[derive(Error, Debug)]
pub enum PassbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Malformed file: {0}")]
    MalformedFile(String),

    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl From<csv::Error> for PassbookError {
    fn from(e: csv::Error) -> Self {
        PassbookError::MalformedFile(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PassbookError>;
