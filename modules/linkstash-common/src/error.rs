use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkStashError {
    #[error("Acquisition error: {0}")]
    Acquisition(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Item already saved: {0}")]
    Duplicate(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl LinkStashError {
    /// Duplicate URLs are a user-visible notice, not a failure.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, LinkStashError::Duplicate(_))
    }
}
