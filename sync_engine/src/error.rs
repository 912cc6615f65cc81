use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("upstream responded with HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("fetch task ended without a result: {0}")]
    Interrupted(String),
}

impl FetchError {
    /// Short error class used in log fields and status reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) | FetchError::Status(_) | FetchError::Interrupted(_) => {
                "transport"
            }
            FetchError::Parse(_) => "parse",
        }
    }
}
