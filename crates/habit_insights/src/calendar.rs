//! Calendar views: per-day completion lists over a range, month and week
//! layouts, and the year heatmap.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use habit_metrics::dates::week_start;
use habit_metrics::{Habit, HabitLogStore};

use crate::types::{
    CalendarRange, CompletionDay, DayData, HabitRef, HeatmapDay, MonthView, PeriodStats, WeekDayData,
    WeekView, YearView,
};
use crate::{HabitCatalog, InsightsError, InsightsResult};

pub struct CalendarService {
    store: Arc<dyn HabitLogStore>,
    catalog: Arc<dyn HabitCatalog>,
}

impl CalendarService {
    pub fn new(store: Arc<dyn HabitLogStore>, catalog: Arc<dyn HabitCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Per-day completed-habit lists over `[from, to]`, rated against the
    /// non-archived habit set (optionally narrowed by `habit_filter`),
    /// plus period totals.
    pub async fn completions(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        habit_filter: &[Uuid],
    ) -> InsightsResult<CalendarRange> {
        let logs = self.store.logs_for_range(user_id, from, to).await?;
        let habits = self.catalog.habits_for_user(user_id).await?;

        let mut habit_refs: HashMap<Uuid, HabitRef> = habits
            .iter()
            .filter(|habit| !habit.is_archived())
            .map(|habit| (habit.id, habit_ref(habit)))
            .collect();
        if !habit_filter.is_empty() {
            habit_refs.retain(|id, _| habit_filter.contains(id));
        }

        let mut completions_by_date: HashMap<NaiveDate, Vec<Uuid>> = HashMap::new();
        for log in &logs {
            if log.completed {
                completions_by_date
                    .entry(log.log_date)
                    .or_default()
                    .push(log.habit_id);
            }
        }

        let total_habits = habit_refs.len() as u32;
        let mut days = Vec::new();
        let mut total_completions = 0u32;
        let mut days_with_completions = 0u32;

        let mut day = from;
        while day <= to {
            let completed: Vec<HabitRef> = completions_by_date
                .get(&day)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| habit_refs.get(id).cloned())
                        .collect()
                })
                .unwrap_or_default();

            let completed_count = completed.len() as u32;
            if completed_count > 0 {
                days_with_completions += 1;
                total_completions += completed_count;
            }

            days.push(CompletionDay {
                date: day,
                habits: completed,
                completion_rate: ratio_percent(completed_count, total_habits),
                total_habits,
                completed_habits: completed_count,
            });
            day += Duration::days(1);
        }

        let total_days = (to.signed_duration_since(from).num_days() + 1).max(0) as u32;
        let expected = total_days * total_habits;
        Ok(CalendarRange {
            days,
            stats: PeriodStats {
                total_completions,
                days_with_completions,
                completion_rate: ratio_percent(total_completions, expected),
                total_days,
            },
        })
    }

    pub async fn month(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
        habit_filter: &[Uuid],
    ) -> InsightsResult<MonthView> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| InsightsError::Validation(format!("invalid month: {year}-{month}")))?;
        let end = last_day_of_month(start);

        let range = self.completions(user_id, start, end, habit_filter).await?;
        Ok(MonthView {
            year,
            month,
            days: range.days.iter().map(day_data).collect(),
            stats: range.stats,
        })
    }

    /// Monday-anchored seven-day view of one ISO week.
    pub async fn week(
        &self,
        user_id: Uuid,
        year: i32,
        week: u32,
        habit_filter: &[Uuid],
    ) -> InsightsResult<WeekView> {
        let start = week_start(year, week);
        let end = start + Duration::days(6);

        let range = self.completions(user_id, start, end, habit_filter).await?;
        let days = range
            .days
            .iter()
            .map(|day| WeekDayData {
                date: day.date,
                day_of_week: day.date.weekday().number_from_monday() as u8 - 1,
                completions: day.habits.iter().map(|habit| habit.id).collect(),
                completion_rate: day.completion_rate,
            })
            .collect();
        Ok(WeekView {
            year,
            week,
            days,
            stats: range.stats,
        })
    }

    /// Heatmap of a whole calendar year, intensity bucketed on the
    /// per-day completion rate.
    pub async fn year(
        &self,
        user_id: Uuid,
        year: i32,
        habit_filter: &[Uuid],
    ) -> InsightsResult<YearView> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| InsightsError::Validation(format!("invalid year: {year}")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| InsightsError::Validation(format!("invalid year: {year}")))?;

        let range = self.completions(user_id, start, end, habit_filter).await?;
        let heatmap = range
            .days
            .iter()
            .map(|day| HeatmapDay {
                date: day.date,
                completion_rate: day.completion_rate,
                intensity: intensity(day.completion_rate),
            })
            .collect();
        Ok(YearView {
            year,
            heatmap,
            stats: range.stats,
        })
    }
}

fn habit_ref(habit: &Habit) -> HabitRef {
    HabitRef {
        id: habit.id,
        name: habit.name.clone(),
        color: habit.color.clone(),
        icon: habit.icon.clone(),
    }
}

fn day_data(day: &CompletionDay) -> DayData {
    DayData {
        date: day.date,
        completions: day.habits.iter().map(|habit| habit.id).collect(),
        completion_rate: day.completion_rate,
    }
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    // both candidates are constructible for any valid `first`
    next_month.unwrap_or(first) - Duration::days(1)
}

fn intensity(rate: f64) -> u8 {
    if rate >= 75.0 {
        4
    } else if rate >= 50.0 {
        3
    } else if rate >= 25.0 {
        2
    } else if rate > 0.0 {
        1
    } else {
        0
    }
}

fn ratio_percent(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    f64::from(numerator) / f64::from(denominator) * 100.0
}
