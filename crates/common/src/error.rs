use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Registry storage error: {0}")]
    Registry(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Chat transport error: {0}")]
    Transport(String),

    #[error("Catalog fetch error: {0}")]
    Catalog(String),

    #[error("Reasoning service error: {0}")]
    Reasoning(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
