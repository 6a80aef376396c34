//! Cross-habit analytics: completion trend, category breakdown,
//! day-of-week analysis, overall metrics, rankings, and rule-based
//! insights.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use habit_metrics::dates::{epoch, normalize_day};
use habit_metrics::stats::{completion_rate, count_completed};
use habit_metrics::{Category, Frequency, Habit, HabitLogStore};

use crate::types::{
    CategorySlice, DayOfWeekPoint, Insight, InsightKind, InsightPriority, LeaderboardEntry,
    OverallMetrics, TopHabit, TrendPoint,
};
use crate::{HabitCatalog, InsightsResult};

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Reporting window for trend and day-of-week analysis. `AllTime` starts
/// at the earliest habit creation day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Quarter,
    AllTime,
}

impl Period {
    fn days_back(self) -> Option<i64> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::Quarter => Some(90),
            Period::AllTime => None,
        }
    }
}

/// Ranking key for [`AnalyticsService::top_habits`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopHabitSort {
    CompletionRate,
    CurrentStreak,
}

pub struct AnalyticsService {
    store: Arc<dyn HabitLogStore>,
    catalog: Arc<dyn HabitCatalog>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn HabitLogStore>, catalog: Arc<dyn HabitCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Per-day completions over the window, with the count of habits that
    /// were active each day and the resulting rate. Archived habits stop
    /// counting toward the denominator from their archive day on.
    pub async fn completion_trend(
        &self,
        user_id: Uuid,
        period: Period,
        today: NaiveDate,
    ) -> InsightsResult<Vec<TrendPoint>> {
        let habits = self.catalog.habits_for_user(user_id).await?;
        let Some(start) = window_start(&habits, period, today) else {
            return Ok(Vec::new());
        };
        let logs = self.store.logs_for_range(user_id, start, today).await?;

        let mut completions_by_date: HashMap<NaiveDate, u32> = HashMap::new();
        for log in &logs {
            if log.completed {
                *completions_by_date.entry(log.log_date).or_default() += 1;
            }
        }

        let mut points = Vec::new();
        let mut day = start;
        while day <= today {
            let completions = completions_by_date.get(&day).copied().unwrap_or(0);
            let total = active_habit_count(&habits, day);
            points.push(TrendPoint {
                date: day,
                completions,
                total_habits: total,
                completion_rate: ratio_percent(completions, total),
            });
            day += Duration::days(1);
        }
        Ok(points)
    }

    /// Active habits grouped by category: habit count, average completion
    /// rate, and all-time completion total. Sorted by label so output is
    /// stable.
    pub async fn category_breakdown(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> InsightsResult<Vec<CategorySlice>> {
        let habits = self.catalog.habits_for_user(user_id).await?;

        let mut by_category: HashMap<Category, (u32, f64, u32)> = HashMap::new();
        for habit in habits.iter().filter(|habit| !habit.is_archived()) {
            let (rate, completions) = self.rate_and_completions(habit, today).await;
            let entry = by_category.entry(habit.category).or_insert((0, 0.0, 0));
            entry.0 += 1;
            entry.1 += rate;
            entry.2 += completions;
        }

        let mut slices: Vec<CategorySlice> = by_category
            .into_iter()
            .map(|(category, (count, rate_sum, completions))| CategorySlice {
                category,
                label: category.label(),
                habit_count: count,
                avg_completion_rate: rate_sum / f64::from(count),
                total_completions: completions,
            })
            .collect();
        slices.sort_by(|a, b| a.label.cmp(b.label));
        Ok(slices)
    }

    /// Completions and active-habit exposure summed per weekday across the
    /// window, Monday first.
    pub async fn day_of_week(
        &self,
        user_id: Uuid,
        period: Period,
        today: NaiveDate,
    ) -> InsightsResult<Vec<DayOfWeekPoint>> {
        let habits = self.catalog.habits_for_user(user_id).await?;
        let Some(start) = window_start(&habits, period, today) else {
            return Ok(Vec::new());
        };
        let logs = self.store.logs_for_range(user_id, start, today).await?;

        let mut completions = [0u32; 7];
        for log in &logs {
            if log.completed {
                completions[weekday_index(log.log_date)] += 1;
            }
        }

        // Exposure: how many habit-days each weekday contributed. A habit
        // active on two Mondays of the window counts twice for Monday.
        let mut exposure = [0u32; 7];
        let mut day = start;
        while day <= today {
            exposure[weekday_index(day)] += active_habit_count(&habits, day);
            day += Duration::days(1);
        }

        Ok((0..7)
            .map(|index| DayOfWeekPoint {
                day: DAY_NAMES[index],
                day_index: index as u8,
                completions: completions[index],
                total_habits: exposure[index],
                completion_rate: ratio_percent(completions[index], exposure[index]),
            })
            .collect())
    }

    /// Averages across active habits plus the all-time completion total.
    /// The consistency score is the average completion rate.
    pub async fn overall_metrics(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> InsightsResult<OverallMetrics> {
        let habits = self.catalog.habits_for_user(user_id).await?;
        let active: Vec<&Habit> = habits.iter().filter(|habit| !habit.is_archived()).collect();
        if active.is_empty() {
            return Ok(OverallMetrics {
                avg_completion_rate: 0.0,
                avg_streak: 0.0,
                total_completions: 0,
                consistency_score: 0.0,
            });
        }

        let mut rate_sum = 0.0;
        let mut streak_sum = 0u32;
        let mut total_completions = 0u32;
        for habit in &active {
            let (rate, completions) = self.rate_and_completions(habit, today).await;
            rate_sum += rate;
            streak_sum += habit.current_streak;
            total_completions += completions;
        }

        let avg_completion_rate = rate_sum / active.len() as f64;
        Ok(OverallMetrics {
            avg_completion_rate,
            avg_streak: f64::from(streak_sum) / active.len() as f64,
            total_completions,
            consistency_score: avg_completion_rate,
        })
    }

    /// Active habits ranked by completion rate or current streak. A limit
    /// of zero returns the full ranking.
    pub async fn top_habits(
        &self,
        user_id: Uuid,
        limit: usize,
        sort: TopHabitSort,
        today: NaiveDate,
    ) -> InsightsResult<Vec<TopHabit>> {
        let habits = self.catalog.habits_for_user(user_id).await?;

        let mut ranked = Vec::new();
        for habit in habits.iter().filter(|habit| !habit.is_archived()) {
            let (rate, _) = self.rate_and_completions(habit, today).await;
            ranked.push((habit, rate));
        }

        match sort {
            TopHabitSort::CompletionRate => ranked.sort_by(|a, b| {
                b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
            }),
            TopHabitSort::CurrentStreak => {
                ranked.sort_by(|a, b| b.0.current_streak.cmp(&a.0.current_streak))
            }
        }
        if limit > 0 {
            ranked.truncate(limit);
        }

        Ok(ranked
            .into_iter()
            .map(|(habit, rate)| TopHabit {
                habit_id: habit.id,
                name: habit.name.clone(),
                category: habit.category,
                completion_rate: rate,
                current_streak: habit.current_streak,
                longest_streak: habit.longest_streak,
            })
            .collect())
    }

    /// Active habits ranked by their persisted current streak.
    pub async fn streak_leaderboard(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> InsightsResult<Vec<LeaderboardEntry>> {
        let habits = self.catalog.habits_for_user(user_id).await?;
        let mut active: Vec<&Habit> = habits.iter().filter(|habit| !habit.is_archived()).collect();
        active.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));
        if limit > 0 {
            active.truncate(limit);
        }
        Ok(active
            .into_iter()
            .map(|habit| LeaderboardEntry {
                habit_id: habit.id,
                name: habit.name.clone(),
                category: habit.category,
                current_streak: habit.current_streak,
                longest_streak: habit.longest_streak,
            })
            .collect())
    }

    /// Rule-based feedback: streak praise, inactivity nudges, the best
    /// weekday, and overall-consistency bands.
    pub async fn insights(&self, user_id: Uuid, today: NaiveDate) -> InsightsResult<Vec<Insight>> {
        let habits = self.catalog.habits_for_user(user_id).await?;
        let active: Vec<&Habit> = habits.iter().filter(|habit| !habit.is_archived()).collect();

        let mut insights = Vec::new();
        if active.is_empty() {
            return Ok(insights);
        }

        if let Some(best) = active.iter().max_by_key(|habit| habit.current_streak)
            && best.current_streak >= 7
        {
            insights.push(Insight {
                kind: InsightKind::Positive,
                title: "Great Streak!".into(),
                description: format!(
                    "{} has a {}-day streak. Keep it up!",
                    best.name, best.current_streak
                ),
                priority: InsightPriority::High,
            });
        }

        // Nudge habits that went quiet over the last month.
        let month_ago = today - Duration::days(30);
        for habit in &active {
            let Ok(logs) = self
                .store
                .logs_for_habit(habit.user_id, habit.id, month_ago, today)
                .await
            else {
                continue;
            };
            let expected = match habit.frequency {
                Frequency::Daily => 30u32,
                Frequency::Weekly => 4,
            };
            let recent_rate = ratio_percent(count_completed(&logs) as u32, expected);
            if recent_rate < 50.0 && habit.current_streak == 0 {
                insights.push(Insight {
                    kind: InsightKind::Suggestion,
                    title: "Get Back on Track".into(),
                    description: format!(
                        "{} has been inactive. Try to complete it today!",
                        habit.name
                    ),
                    priority: InsightPriority::Medium,
                });
            }
        }

        if let Ok(points) = self.day_of_week(user_id, Period::Month, today).await
            && let Some(best) = points.iter().max_by(|a, b| {
                a.completion_rate
                    .partial_cmp(&b.completion_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            && best.completion_rate > 70.0
        {
            insights.push(Insight {
                kind: InsightKind::Positive,
                title: "Best Day".into(),
                description: format!(
                    "{} is your most productive day with {:.0}% completion rate!",
                    best.day, best.completion_rate
                ),
                priority: InsightPriority::Low,
            });
        }

        if let Ok(metrics) = self.overall_metrics(user_id, today).await {
            if metrics.avg_completion_rate >= 80.0 {
                insights.push(Insight {
                    kind: InsightKind::Achievement,
                    title: "Excellent Consistency".into(),
                    description:
                        "You're maintaining an 80%+ average completion rate across all habits!"
                            .into(),
                    priority: InsightPriority::High,
                });
            } else if metrics.avg_completion_rate < 50.0 {
                insights.push(Insight {
                    kind: InsightKind::Suggestion,
                    title: "Room for Improvement".into(),
                    description: "Your average completion rate is below 50%. Focus on consistency!"
                        .into(),
                    priority: InsightPriority::Medium,
                });
            }
        }

        Ok(insights)
    }

    /// Completion rate since creation plus the all-time completion count,
    /// from one full-range fetch. Degrades to zeros on a store failure,
    /// matching the enricher's policy.
    async fn rate_and_completions(&self, habit: &Habit, today: NaiveDate) -> (f64, u32) {
        match self
            .store
            .logs_for_habit(habit.user_id, habit.id, epoch(), today)
            .await
        {
            Ok(logs) => {
                let created = normalize_day(habit.created_at);
                let completed: Vec<NaiveDate> = logs
                    .iter()
                    .filter(|log| log.completed)
                    .map(|log| log.log_date)
                    .collect();
                let since_creation = completed.iter().filter(|day| **day >= created).count();
                let rate = completion_rate(since_creation, created, today, habit.frequency);
                (rate, completed.len() as u32)
            }
            Err(e) => {
                tracing::warn!(habit_id = %habit.id, error = %e, "per-habit stats fetch failed");
                (0.0, 0)
            }
        }
    }
}

fn window_start(habits: &[Habit], period: Period, today: NaiveDate) -> Option<NaiveDate> {
    match period.days_back() {
        Some(days) => Some(today - Duration::days(days)),
        None => habits
            .iter()
            .map(|habit| normalize_day(habit.created_at))
            .min(),
    }
}

fn active_habit_count(habits: &[Habit], day: NaiveDate) -> u32 {
    habits.iter().filter(|habit| habit.is_active_on(day)).count() as u32
}

fn weekday_index(day: NaiveDate) -> usize {
    day.weekday().number_from_monday() as usize - 1
}

fn ratio_percent(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    f64::from(numerator) / f64::from(denominator) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::{TimeZone, Utc};
    use habit_metrics::Habit;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(
        user_id: Uuid,
        name: &str,
        category: Category,
        created: NaiveDate,
        current_streak: u32,
    ) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            description: None,
            icon: None,
            color: None,
            category,
            frequency: Frequency::Daily,
            current_streak,
            longest_streak: current_streak,
            created_at: Utc.from_utc_datetime(&created.and_hms_opt(9, 0, 0).unwrap()),
            archived_at: None,
        }
    }

    async fn seed(store: &MemoryStore, h: &Habit, dates: &[NaiveDate]) {
        for d in dates {
            store
                .record(
                    h.user_id,
                    h.id,
                    *d,
                    true,
                    Utc.from_utc_datetime(&d.and_hms_opt(8, 0, 0).unwrap()),
                )
                .await;
        }
    }

    fn service(store: &MemoryStore) -> AnalyticsService {
        AnalyticsService::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn trend_counts_completions_against_active_habits() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let today = day(2025, 6, 10);

        let reading = habit(user, "Read", Category::Learning, day(2025, 5, 1), 0);
        let running = habit(user, "Run", Category::Health, day(2025, 5, 1), 0);
        store.insert_habit(reading.clone()).await;
        store.insert_habit(running.clone()).await;
        seed(&store, &reading, &[today, today - Duration::days(1)]).await;
        seed(&store, &running, &[today]).await;

        let points = service(&store)
            .completion_trend(user, Period::Week, today)
            .await
            .unwrap();
        assert_eq!(points.len(), 8); // inclusive 7-day lookback

        let last = points.last().unwrap();
        assert_eq!(last.date, today);
        assert_eq!(last.completions, 2);
        assert_eq!(last.total_habits, 2);
        assert_eq!(last.completion_rate, 100.0);

        let yesterday = &points[points.len() - 2];
        assert_eq!(yesterday.completions, 1);
        assert_eq!(yesterday.completion_rate, 50.0);
    }

    #[tokio::test]
    async fn trend_excludes_habits_not_yet_created() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let today = day(2025, 6, 10);

        let old = habit(user, "Old", Category::Work, day(2025, 5, 1), 0);
        let fresh = habit(user, "Fresh", Category::Work, today, 0);
        store.insert_habit(old.clone()).await;
        store.insert_habit(fresh.clone()).await;

        let points = service(&store)
            .completion_trend(user, Period::Week, today)
            .await
            .unwrap();
        assert_eq!(points.first().unwrap().total_habits, 1);
        assert_eq!(points.last().unwrap().total_habits, 2);
    }

    #[tokio::test]
    async fn all_time_trend_with_no_habits_is_empty() {
        let store = MemoryStore::new();
        let points = service(&store)
            .completion_trend(Uuid::new_v4(), Period::AllTime, day(2025, 6, 10))
            .await
            .unwrap();
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn category_breakdown_groups_and_averages() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let today = day(2025, 6, 10);
        let created = today - Duration::days(9); // 10-day windows

        let run = habit(user, "Run", Category::Health, created, 0);
        let gym = habit(user, "Gym", Category::Health, created, 0);
        let read = habit(user, "Read", Category::Learning, created, 0);
        for h in [&run, &gym, &read] {
            store.insert_habit(h.clone()).await;
        }
        // Run 10/10 days, Gym 5/10 days, Read 2/10 days.
        seed(&store, &run, &(0..10).map(|o| today - Duration::days(o)).collect::<Vec<_>>()).await;
        seed(&store, &gym, &(0..5).map(|o| today - Duration::days(o)).collect::<Vec<_>>()).await;
        seed(&store, &read, &[today, today - Duration::days(1)]).await;

        let slices = service(&store).category_breakdown(user, today).await.unwrap();
        assert_eq!(slices.len(), 2);

        let health = slices.iter().find(|s| s.category == Category::Health).unwrap();
        assert_eq!(health.habit_count, 2);
        assert_eq!(health.total_completions, 15);
        assert_eq!(health.avg_completion_rate, 75.0);

        let learning = slices.iter().find(|s| s.category == Category::Learning).unwrap();
        assert_eq!(learning.habit_count, 1);
        assert_eq!(learning.avg_completion_rate, 20.0);
    }

    #[tokio::test]
    async fn day_of_week_accumulates_exposure_per_weekday() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        // A Tuesday; the 7-day window covers each weekday at least once.
        let today = day(2025, 6, 10);

        let h = habit(user, "Stretch", Category::Health, day(2025, 5, 1), 0);
        store.insert_habit(h.clone()).await;
        seed(&store, &h, &[day(2025, 6, 9), day(2025, 6, 2)]).await; // two Mondays

        let points = service(&store).day_of_week(user, Period::Week, today).await.unwrap();
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].day, "Monday");

        let monday = &points[0];
        // Window 2025-06-03..=06-10 holds one Monday; only 06-09 is inside.
        assert_eq!(monday.completions, 1);
        assert_eq!(monday.total_habits, 1);
        assert_eq!(monday.completion_rate, 100.0);

        let tuesday = &points[1];
        assert_eq!(tuesday.total_habits, 2); // 06-03 and 06-10
        assert_eq!(tuesday.completions, 0);
    }

    #[tokio::test]
    async fn overall_metrics_average_across_active_habits() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let today = day(2025, 6, 10);
        let created = today - Duration::days(9);

        let a = habit(user, "A", Category::Work, created, 4);
        let b = habit(user, "B", Category::Work, created, 2);
        store.insert_habit(a.clone()).await;
        store.insert_habit(b.clone()).await;
        seed(&store, &a, &(0..10).map(|o| today - Duration::days(o)).collect::<Vec<_>>()).await;
        // b has no completions

        let metrics = service(&store).overall_metrics(user, today).await.unwrap();
        assert_eq!(metrics.avg_completion_rate, 50.0);
        assert_eq!(metrics.avg_streak, 3.0);
        assert_eq!(metrics.total_completions, 10);
        assert_eq!(metrics.consistency_score, 50.0);
    }

    #[tokio::test]
    async fn top_habits_rank_by_rate_and_respect_limit() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let today = day(2025, 6, 10);
        let created = today - Duration::days(9);

        let strong = habit(user, "Strong", Category::Health, created, 9);
        let weak = habit(user, "Weak", Category::Health, created, 1);
        store.insert_habit(strong.clone()).await;
        store.insert_habit(weak.clone()).await;
        seed(&store, &strong, &(0..8).map(|o| today - Duration::days(o)).collect::<Vec<_>>()).await;
        seed(&store, &weak, &[today]).await;

        let top = service(&store)
            .top_habits(user, 1, TopHabitSort::CompletionRate, today)
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Strong");
        assert_eq!(top[0].completion_rate, 80.0);
    }

    #[tokio::test]
    async fn leaderboard_sorts_by_persisted_streak() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let created = day(2025, 5, 1);

        store.insert_habit(habit(user, "Low", Category::Other, created, 2)).await;
        store.insert_habit(habit(user, "High", Category::Other, created, 12)).await;

        let board = service(&store).streak_leaderboard(user, 0).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "High");
        assert_eq!(board[1].name, "Low");
    }

    #[tokio::test]
    async fn insights_flag_streaks_and_inactivity() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let today = day(2025, 6, 10);
        let created = today - Duration::days(29);

        let steady = habit(user, "Steady", Category::Mindfulness, created, 10);
        let stalled = habit(user, "Stalled", Category::Other, created, 0);
        store.insert_habit(steady.clone()).await;
        store.insert_habit(stalled.clone()).await;
        seed(&store, &steady, &(0..30).map(|o| today - Duration::days(o)).collect::<Vec<_>>()).await;

        let insights = service(&store).insights(user, today).await.unwrap();
        assert!(insights.iter().any(|i| i.title == "Great Streak!"
            && i.kind == InsightKind::Positive
            && i.description.contains("Steady")));
        assert!(insights.iter().any(|i| i.title == "Get Back on Track"
            && i.description.contains("Stalled")));
    }

    #[tokio::test]
    async fn insights_empty_without_active_habits() {
        let store = MemoryStore::new();
        let insights = service(&store)
            .insights(Uuid::new_v4(), day(2025, 6, 10))
            .await
            .unwrap();
        assert!(insights.is_empty());
    }
}
