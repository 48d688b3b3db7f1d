#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    WidgetNotReady,
    InvalidUrl(String),
}

impl std::fmt::Display for LayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerError::WidgetNotReady => write!(f, "map widget not ready"),
            LayerError::InvalidUrl(msg) => write!(f, "invalid layer url: {msg}"),
        }
    }
}

impl std::error::Error for LayerError {}
