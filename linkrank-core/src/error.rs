use linkrank_fetch::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("Source title must not be empty")]
    EmptySourceTitle,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Failed to write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, RankError>;
