//! Per-habit orchestration of the calculators, with graceful degradation.
//!
//! Enrichment never fails: a store outage degrades the affected metrics to
//! the habit's persisted streak cache (for streaks) or zero/empty values,
//! so a read request is at worst stale, never broken.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::dates::{epoch, week_window};
use crate::stats::{completion_history, completion_rate, count_completed, today_status};
use crate::streaks::{current_streak, longest_streak};
use crate::{Habit, HabitLogStore};

/// Metrics derived from a habit's completion logs. Recomputed on every
/// read; nothing here is persisted except the two streak integers cached
/// on the habit itself.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HabitMetrics {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completion_rate: f64,
    pub completed_today: bool,
    pub completed_today_at: Option<DateTime<Utc>>,
    pub completed_this_week: u32,
    /// Completed dates, most recent first, capped by
    /// [`EngineConfig::history_limit`].
    pub completion_history: Vec<NaiveDate>,
}

/// Intent to overwrite a habit's persisted streak cache. Emitted when the
/// computed streaks differ from the stored ones; whether to act on it is
/// the caller's decision.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct StreakUpdate {
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// An enriched habit: the habit (streak fields refreshed in-memory when
/// computation succeeded), its derived metrics, and the optional
/// write-back intent.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EnrichedHabit {
    pub habit: Habit,
    pub metrics: HabitMetrics,
    pub streak_update: Option<StreakUpdate>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HabitEnricher {
    config: EngineConfig,
}

impl HabitEnricher {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Compute all derived metrics for one habit as of `today`.
    ///
    /// Makes three store calls: the habit's full log range (feeding both
    /// streaks, the completion rate, and the history), the user's logs for
    /// `today`, and the habit's logs for the Monday..Sunday window around
    /// `today`. Each fetch degrades independently.
    pub async fn enrich(
        &self,
        store: &dyn HabitLogStore,
        habit: &Habit,
        today: NaiveDate,
    ) -> EnrichedHabit {
        let mut habit = habit.clone();

        let (current, longest, rate, history, streaks_computed) = match store
            .logs_for_habit(habit.user_id, habit.id, epoch(), today)
            .await
        {
            Ok(logs) => {
                let completed_days: Vec<NaiveDate> = logs
                    .iter()
                    .filter(|log| log.completed)
                    .map(|log| log.log_date)
                    .collect();
                let current = current_streak(&completed_days, habit.frequency, today);
                let longest = longest_streak(&completed_days, habit.frequency);

                let created = crate::dates::normalize_day(habit.created_at);
                let completed_since_creation = completed_days
                    .iter()
                    .filter(|day| **day >= created)
                    .count();
                let rate =
                    completion_rate(completed_since_creation, created, today, habit.frequency);
                let history = completion_history(&logs, self.config.history_limit);
                (current, longest, rate, history, true)
            }
            Err(e) => {
                tracing::warn!(
                    habit_id = %habit.id,
                    error = %e,
                    "log fetch failed; falling back to persisted streaks"
                );
                (habit.current_streak, habit.longest_streak, 0.0, Vec::new(), false)
            }
        };

        // Refresh the in-memory cache before assembling the record so the
        // returned habit and metrics agree, and surface the write-back
        // intent when the persisted values are stale.
        let streak_update = if streaks_computed
            && (current != habit.current_streak || longest != habit.longest_streak)
        {
            habit.current_streak = current;
            habit.longest_streak = longest;
            Some(StreakUpdate {
                habit_id: habit.id,
                user_id: habit.user_id,
                current_streak: current,
                longest_streak: longest,
            })
        } else {
            None
        };

        let (completed_today, completed_today_at) =
            match store.logs_for_date(habit.user_id, today).await {
                Ok(logs) => today_status(&logs, habit.id),
                Err(e) => {
                    tracing::warn!(habit_id = %habit.id, error = %e, "today-status fetch failed");
                    (false, None)
                }
            };

        let (week_from, week_to) = week_window(today);
        let completed_this_week = match store
            .logs_for_habit(habit.user_id, habit.id, week_from, week_to)
            .await
        {
            Ok(logs) => count_completed(&logs) as u32,
            Err(e) => {
                tracing::warn!(habit_id = %habit.id, error = %e, "week-window fetch failed");
                0
            }
        };

        EnrichedHabit {
            metrics: HabitMetrics {
                current_streak: current,
                longest_streak: longest,
                completion_rate: rate,
                completed_today,
                completed_today_at,
                completed_this_week,
                completion_history: history,
            },
            habit,
            streak_update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, CompletionLog, Frequency, MetricsError};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    struct FixedStore {
        logs: Vec<CompletionLog>,
    }

    #[async_trait]
    impl HabitLogStore for FixedStore {
        async fn logs_for_habit(
            &self,
            user_id: Uuid,
            habit_id: Uuid,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<CompletionLog>, MetricsError> {
            Ok(self
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
            Ok(self
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
            Ok(self
                .logs
                .iter()
                .filter(|log| {
                    log.user_id == user_id && log.log_date >= from && log.log_date <= to
                })
                .cloned()
                .collect())
        }

        async fn persist_streaks(
            &self,
            _habit_id: Uuid,
            _user_id: Uuid,
            _current_streak: u32,
            _longest_streak: u32,
        ) -> Result<(), MetricsError> {
            Ok(())
        }
    }

    fn sample_habit(user_id: Uuid, created_days_ago: i64, today: NaiveDate) -> Habit {
        let created = Utc
            .from_utc_datetime(
                &(today - Duration::days(created_days_ago))
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
            );
        Habit {
            id: Uuid::new_v4(),
            user_id,
            name: "Meditate".into(),
            description: None,
            icon: None,
            color: None,
            category: Category::Mindfulness,
            frequency: Frequency::Daily,
            current_streak: 0,
            longest_streak: 0,
            created_at: created,
            archived_at: None,
        }
    }

    fn completed_log(habit: &Habit, log_date: NaiveDate) -> CompletionLog {
        CompletionLog {
            id: Uuid::new_v4(),
            user_id: habit.user_id,
            habit_id: habit.id,
            log_date,
            completed: true,
            recorded_at: Utc.from_utc_datetime(&log_date.and_hms_opt(7, 30, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn enrich_computes_metrics_and_emits_update_intent() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let user_id = Uuid::new_v4();
        let habit = sample_habit(user_id, 9, today);

        let logs = (0..5)
            .map(|off| completed_log(&habit, today - Duration::days(off)))
            .collect();
        let store = FixedStore { logs };

        let enricher = HabitEnricher::new(EngineConfig::default());
        let enriched = enricher.enrich(&store, &habit, today).await;

        assert_eq!(enriched.metrics.current_streak, 5);
        assert_eq!(enriched.metrics.longest_streak, 5);
        assert_eq!(enriched.metrics.completion_rate, 50.0);
        assert!(enriched.metrics.completed_today);
        assert!(enriched.metrics.completed_today_at.is_some());
        assert_eq!(enriched.metrics.completion_history.len(), 5);
        assert_eq!(enriched.metrics.completion_history[0], today);

        let update = enriched.streak_update.expect("stale cache must emit intent");
        assert_eq!(update.current_streak, 5);
        assert_eq!(update.longest_streak, 5);
        assert_eq!(enriched.habit.current_streak, 5);
    }

    #[tokio::test]
    async fn enrich_skips_update_when_cache_matches() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let user_id = Uuid::new_v4();
        let mut habit = sample_habit(user_id, 3, today);
        habit.current_streak = 2;
        habit.longest_streak = 2;

        let logs = vec![
            completed_log(&habit, today),
            completed_log(&habit, today - Duration::days(1)),
        ];
        let store = FixedStore { logs };

        let enricher = HabitEnricher::new(EngineConfig::default());
        let enriched = enricher.enrich(&store, &habit, today).await;
        assert!(enriched.streak_update.is_none());
    }

    #[tokio::test]
    async fn history_respects_configured_cap() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let user_id = Uuid::new_v4();
        let habit = sample_habit(user_id, 30, today);

        let logs = (0..10)
            .map(|off| completed_log(&habit, today - Duration::days(off)))
            .collect();
        let store = FixedStore { logs };

        let enricher = HabitEnricher::new(EngineConfig { history_limit: 3 });
        let enriched = enricher.enrich(&store, &habit, today).await;
        assert_eq!(enriched.metrics.completion_history.len(), 3);
        assert_eq!(enriched.metrics.completion_history[0], today);
    }

    #[tokio::test]
    async fn logs_before_creation_count_for_streaks_but_not_rate() {
        // A log older than the habit's creation day (backfilled data) still
        // feeds streak history, but the rate window starts at creation.
        let today = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let user_id = Uuid::new_v4();
        let habit = sample_habit(user_id, 1, today);

        let logs = vec![
            completed_log(&habit, today),
            completed_log(&habit, today - Duration::days(1)),
            completed_log(&habit, today - Duration::days(2)),
        ];
        let store = FixedStore { logs };

        let enricher = HabitEnricher::new(EngineConfig::default());
        let enriched = enricher.enrich(&store, &habit, today).await;
        assert_eq!(enriched.metrics.current_streak, 3);
        // Two completions inside the two-day inclusive creation window.
        assert_eq!(enriched.metrics.completion_rate, 100.0);
    }
}
