use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReaderError>;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Reader error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for ReaderError {
    fn from(err: reqwest::Error) -> Self {
        ReaderError::Network(err.to_string())
    }
}
