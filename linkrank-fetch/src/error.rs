use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Batch of {len} titles exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },

    #[error("Article not found: {0}")]
    NotFound(String),
}

impl FetchError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::HttpError(e) => e.is_timeout() || e.is_connect(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
