use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A key was present but could not be read as the requested type, or was absent.
    #[error("Failed to get '{key}': {message}")]
    Config { key: String, message: String },

    #[error("Unknown distance metric '{0}' (expected cosine, dot or l2)")]
    UnknownMetric(String),
}

pub type Result<T> = std::result::Result<T, Error>;
