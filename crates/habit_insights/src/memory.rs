//! In-memory implementation of both storage traits.
//!
//! Enforces the `(habit_id, log_date)` upsert invariant the SQL layer
//! guarantees in production, so tests and demos exercise the same storage
//! contract the engine assumes. Not intended for production use.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use habit_metrics::{CompletionLog, Habit, HabitLogStore, MetricsError};

use crate::{HabitCatalog, InsightsResult};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    habits: Vec<Habit>,
    logs: Vec<CompletionLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_habit(&self, habit: Habit) {
        let mut inner = self.inner.lock().await;
        inner.habits.push(habit);
    }

    /// Upsert a log for `(habit_id, log_date)`: marking the same day twice
    /// replaces the existing row, exactly like the SQL `ON CONFLICT`
    /// update, so at most one log ever exists per habit per day.
    pub async fn record(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        log_date: NaiveDate,
        completed: bool,
        recorded_at: DateTime<Utc>,
    ) -> CompletionLog {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner
            .logs
            .iter_mut()
            .find(|log| log.habit_id == habit_id && log.log_date == log_date)
        {
            existing.completed = completed;
            existing.recorded_at = recorded_at;
            return existing.clone();
        }
        let log = CompletionLog {
            id: Uuid::new_v4(),
            user_id,
            habit_id,
            log_date,
            completed,
            recorded_at,
        };
        inner.logs.push(log.clone());
        log
    }

    /// Current streak cache of a habit, for asserting write-backs.
    pub async fn streaks_of(&self, habit_id: Uuid) -> Option<(u32, u32)> {
        let inner = self.inner.lock().await;
        inner
            .habits
            .iter()
            .find(|habit| habit.id == habit_id)
            .map(|habit| (habit.current_streak, habit.longest_streak))
    }
}

#[async_trait]
impl HabitLogStore for MemoryStore {
    async fn logs_for_habit(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionLog>, MetricsError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .logs
            .iter()
            .filter(|log| {
                log.user_id == user_id
                    && log.habit_id == habit_id
                    && log.log_date >= from
                    && log.log_date <= to
            })
            .cloned()
            .collect())
    }

    async fn logs_for_date(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<CompletionLog>, MetricsError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .logs
            .iter()
            .filter(|log| log.user_id == user_id && log.log_date == day)
            .cloned()
            .collect())
    }

    async fn logs_for_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionLog>, MetricsError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .logs
            .iter()
            .filter(|log| log.user_id == user_id && log.log_date >= from && log.log_date <= to)
            .cloned()
            .collect())
    }

    async fn persist_streaks(
        &self,
        habit_id: Uuid,
        user_id: Uuid,
        current_streak: u32,
        longest_streak: u32,
    ) -> Result<(), MetricsError> {
        let mut inner = self.inner.lock().await;
        let habit = inner
            .habits
            .iter_mut()
            .find(|habit| habit.id == habit_id && habit.user_id == user_id)
            .ok_or_else(|| MetricsError::Store(format!("unknown habit {habit_id}")))?;
        habit.current_streak = current_streak;
        habit.longest_streak = longest_streak;
        Ok(())
    }
}

#[async_trait]
impl HabitCatalog for MemoryStore {
    async fn habits_for_user(&self, user_id: Uuid) -> InsightsResult<Vec<Habit>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .habits
            .iter()
            .filter(|habit| habit.user_id == user_id)
            .cloned()
            .collect())
    }
}
