//! Error types for the feature services.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("engine error: {0}")]
    Engine(#[from] habit_metrics::MetricsError),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl From<String> for InsightsError {
    fn from(err: String) -> Self {
        InsightsError::Catalog(err)
    }
}

/// Result type alias for service operations.
pub type InsightsResult<T> = Result<T, InsightsError>;
