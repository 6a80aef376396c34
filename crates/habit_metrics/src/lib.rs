//! Habit analytics core: streak, completion-rate, and history computation
//! over sparse per-day completion logs, behind a `HabitLogStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod config;
pub mod dates;
pub mod enrich;
pub mod stats;
pub mod streaks;

pub use config::EngineConfig;
pub use enrich::{EnrichedHabit, HabitEnricher, HabitMetrics, StreakUpdate};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("log store error: {0}")]
    Store(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// How often a habit is expected to be completed. Determines the unit of
/// a "period" for streaks and completion rate.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Productivity,
    Learning,
    Work,
    Personal,
    Mindfulness,
    Social,
    Creative,
    Finance,
    Other,
}

impl Category {
    /// Human-readable label, capitalized.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Health => "Health",
            Category::Productivity => "Productivity",
            Category::Learning => "Learning",
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Mindfulness => "Mindfulness",
            Category::Social => "Social",
            Category::Creative => "Creative",
            Category::Finance => "Finance",
            Category::Other => "Other",
        }
    }
}

/// A single per-day completion record.
///
/// The storage layer upserts on `(habit_id, log_date)`, so at most one log
/// exists per habit per day. A `completed == false` row is an explicit
/// un-completion and counts the same as no row at all for every
/// aggregation in this crate.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CompletionLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub habit_id: Uuid,
    /// The calendar day being marked, not the time of the action.
    pub log_date: NaiveDate,
    pub completed: bool,
    /// When the row was created or last updated. Only used for
    /// "completed today, at what time" display.
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category: Category,
    pub frequency: Frequency,
    /// Last-persisted streak cache. Fallback when computation fails,
    /// overwrite candidate when it succeeds and differs.
    pub current_streak: u32,
    pub longest_streak: u32,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Habit {
    /// Whether the habit counts as active on the given calendar day.
    /// Active from its creation day through the day before its archive
    /// day; the archive day itself is already excluded.
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        if day < dates::normalize_day(self.created_at) {
            return false;
        }
        match self.archived_at {
            None => true,
            Some(archived) => day < dates::normalize_day(archived),
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Storage collaborator for completion logs and the persisted streak cache.
///
/// All ranges are inclusive on both ends. Implementations are expected to
/// return logs with `log_date` already normalized to calendar days.
#[async_trait]
pub trait HabitLogStore: Send + Sync + 'static {
    /// All logs for one habit within `[from, to]`.
    async fn logs_for_habit(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionLog>, MetricsError>;

    /// All of a user's logs dated exactly `day`, across habits.
    async fn logs_for_date(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<CompletionLog>, MetricsError>;

    /// All of a user's logs within `[from, to]`, across habits.
    async fn logs_for_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionLog>, MetricsError>;

    /// Overwrite the persisted streak cache for a habit. Fire-and-forget
    /// from the engine's perspective: failures are logged by the caller
    /// and never retried here.
    async fn persist_streaks(
        &self,
        habit_id: Uuid,
        user_id: Uuid,
        current_streak: u32,
        longest_streak: u32,
    ) -> Result<(), MetricsError>;
}
