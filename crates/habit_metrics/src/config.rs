use crate::MetricsError;

/// Default completion-history cap: one year of daily entries.
const DEFAULT_HISTORY_LIMIT: usize = 365;

/// Tunables for the enrichment pipeline.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Maximum number of dates returned in a habit's completion history.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, MetricsError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never mutate the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, MetricsError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let history_limit = match get("HABIT_HISTORY_LIMIT") {
            None => DEFAULT_HISTORY_LIMIT,
            Some(raw) => raw.parse().map_err(|_| {
                MetricsError::Config(format!("HABIT_HISTORY_LIMIT is not a number: {raw}"))
            })?,
        };
        Ok(Self { history_limit })
    }
}
