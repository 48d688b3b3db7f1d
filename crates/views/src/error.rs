use client::ApiError;
use layers::LayerError;
use thiserror::Error;

use crate::scope::Cancelled;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Map(#[from] LayerError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("no such entry: {0}")]
    NotFound(String),
}

impl ViewError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ViewError::Cancelled(_))
    }
}
