/// Convenience result type used across quotereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error taxonomy for one production run.
///
/// Every variant except [`ReelError::Other`] maps to a distinct run-level outcome: fetch and pool
/// errors abort before anything is rendered, render errors abort before upload, and the publish
/// errors abort after the artifact exists. None of them may advance persisted rotation state.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// The quote table is unreachable, malformed or empty.
    #[error("quote source error: {0}")]
    FatalFetch(String),

    /// A rotation pool (quotes, music, effects) has no items.
    #[error("empty pool: {0}")]
    EmptyPool(String),

    /// Font, compositing, audio or encoder failure.
    #[error("render error: {0}")]
    Render(String),

    /// Cloud storage rejected the artifact.
    #[error("upload error: {0}")]
    Upload(String),

    /// The remote platform reported a terminal failure for the media container.
    #[error("remote processing error: {0}")]
    RemoteProcessing(String),

    /// The media container never reached a terminal status.
    #[error("timed out after {attempts} status polls")]
    Timeout {
        /// Number of status polls issued before giving up.
        attempts: u32,
    },

    /// Transport-level or unexpected-status HTTP failure.
    #[error("http error: {0}")]
    Http(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid input value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Another run holds the progress lock.
    #[error("another run holds the lock '{0}'")]
    Locked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn fatal_fetch(msg: impl Into<String>) -> Self {
        Self::FatalFetch(msg.into())
    }

    pub fn empty_pool(msg: impl Into<String>) -> Self {
        Self::EmptyPool(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn remote_processing(msg: impl Into<String>) -> Self {
        Self::RemoteProcessing(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<reqwest::Error> for ReelError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
