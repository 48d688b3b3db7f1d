use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success response. `message` is the body's `error` field, or the
    /// operation's generic message when that is missing.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    /// Text suitable for an inline error notice.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
