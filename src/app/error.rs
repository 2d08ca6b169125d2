use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArborError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Feed parsing error: {0}")]
    Parse(String),

    #[error("Folder already exists: {0}")]
    DuplicateName(String),

    #[error("Feed already exists: {0}")]
    DuplicateFeed(String),

    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store file is corrupt: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ArborError {
    fn from(err: reqwest::Error) -> Self {
        ArborError::Network(err.to_string())
    }
}

impl ArborError {
    /// True for a failed store write whose mutation is still applied in memory.
    pub fn is_unsaved(&self) -> bool {
        matches!(self, ArborError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, ArborError>;
