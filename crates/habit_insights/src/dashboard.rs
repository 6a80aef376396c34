//! The home dashboard: today's completion split, active streaks, and
//! quick stats, assembled from the persisted streak cache plus two log
//! fetches (today and the current ISO week).

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use habit_metrics::dates::week_window;
use habit_metrics::stats::count_completed;
use habit_metrics::{Habit, HabitLogStore};

use crate::types::{DashboardHome, HabitSummary, QuickStats, StreakSummary, TodayStats};
use crate::{HabitCatalog, InsightsResult};

/// How many streaks the dashboard surfaces.
const ACTIVE_STREAK_LIMIT: usize = 5;

pub struct DashboardService {
    store: Arc<dyn HabitLogStore>,
    catalog: Arc<dyn HabitCatalog>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn HabitLogStore>, catalog: Arc<dyn HabitCatalog>) -> Self {
        Self { store, catalog }
    }

    pub async fn home(&self, user_id: Uuid, today: NaiveDate) -> InsightsResult<DashboardHome> {
        let habits = self.catalog.habits_for_user(user_id).await?;
        let active: Vec<&Habit> = habits.iter().filter(|habit| !habit.is_archived()).collect();
        if active.is_empty() {
            return Ok(empty_home(today));
        }

        let today_logs = self.store.logs_for_date(user_id, today).await?;
        let mut completed_at_by_habit: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
        for log in &today_logs {
            if log.completed {
                completed_at_by_habit.insert(log.habit_id, log.recorded_at);
            }
        }

        let (week_from, week_to) = week_window(today);
        let week_logs = self.store.logs_for_range(user_id, week_from, week_to).await?;
        let completions_this_week = count_completed(&week_logs) as u32;

        let mut habits_to_complete = Vec::new();
        let mut habits_completed = Vec::new();
        let mut active_streaks = Vec::new();
        let mut completed_count = 0u32;
        let mut best_longest_streak = 0u32;

        for habit in &active {
            let completed_today_at = completed_at_by_habit.get(&habit.id).copied();
            let completed_today = completed_today_at.is_some();
            if completed_today {
                completed_count += 1;
            }
            best_longest_streak = best_longest_streak.max(habit.longest_streak);

            let summary = HabitSummary {
                id: habit.id,
                name: habit.name.clone(),
                description: habit.description.clone(),
                icon: habit.icon.clone(),
                color: habit.color.clone(),
                frequency: habit.frequency,
                category: habit.category,
                current_streak: habit.current_streak,
                completed_today,
                completed_today_at,
            };
            if completed_today {
                habits_completed.push(summary);
            } else {
                habits_to_complete.push(summary);
            }

            if habit.current_streak > 0 {
                active_streaks.push(StreakSummary {
                    id: habit.id,
                    name: habit.name.clone(),
                    icon: habit.icon.clone(),
                    color: habit.color.clone(),
                    current_streak: habit.current_streak,
                    longest_streak: habit.longest_streak,
                });
            }
        }

        active_streaks.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));
        active_streaks.truncate(ACTIVE_STREAK_LIMIT);

        let total_count = active.len() as u32;
        let completion_rate = f64::from(completed_count) / f64::from(total_count) * 100.0;

        Ok(DashboardHome {
            today: TodayStats {
                date: today,
                completion_rate,
                completed_count,
                total_count,
            },
            habits_to_complete,
            habits_completed,
            active_streaks,
            quick_stats: QuickStats {
                today_rate: completion_rate,
                this_week: completions_this_week,
                longest_streak: best_longest_streak,
                total_habits: total_count,
            },
        })
    }
}

fn empty_home(today: NaiveDate) -> DashboardHome {
    DashboardHome {
        today: TodayStats {
            date: today,
            completion_rate: 0.0,
            completed_count: 0,
            total_count: 0,
        },
        habits_to_complete: Vec::new(),
        habits_completed: Vec::new(),
        active_streaks: Vec::new(),
        quick_stats: QuickStats {
            today_rate: 0.0,
            this_week: 0,
            longest_streak: 0,
            total_habits: 0,
        },
    }
}
