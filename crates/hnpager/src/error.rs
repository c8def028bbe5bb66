use hnpager_core::{ConfigError, DecodeError, PaginationError};
use std::path::PathBuf;

/// Failures surfaced by the resolver and the session
///
/// `Transient` and `Decode` are the two ways fetching can fail. Neither is
/// retried automatically; the consumer decides when to ask again.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to fetch {context}: {reason}")]
    Transient { context: String, reason: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    InvalidPageSize(#[from] PaginationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read configuration file {}: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl Error {
    pub fn transient(context: impl Into<String>, reason: impl ToString) -> Self {
        Error::Transient {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Network or payload failure, as opposed to a usage or setup problem
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::Transient { .. } | Error::Decode(_))
    }
}

pub type FetchResult<T> = std::result::Result<T, Error>;
