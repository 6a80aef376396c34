//! Response records for the analytics, dashboard, and calendar services.

use chrono::{DateTime, NaiveDate, Utc};
use habit_metrics::{Category, Frequency};
use serde::Serialize;
use uuid::Uuid;

// --- analytics ---

/// One day of the completion trend.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub completions: u32,
    pub total_habits: u32,
    pub completion_rate: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CategorySlice {
    pub category: Category,
    pub label: &'static str,
    pub habit_count: u32,
    pub avg_completion_rate: f64,
    pub total_completions: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DayOfWeekPoint {
    pub day: &'static str,
    /// Monday = 0 .. Sunday = 6.
    pub day_index: u8,
    pub completions: u32,
    pub total_habits: u32,
    pub completion_rate: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OverallMetrics {
    pub avg_completion_rate: f64,
    pub avg_streak: f64,
    pub total_completions: u32,
    pub consistency_score: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TopHabit {
    pub habit_id: Uuid,
    pub name: String,
    pub category: Category,
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub habit_id: Uuid,
    pub name: String,
    pub category: Category,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Suggestion,
    Achievement,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

/// A rule-derived observation shown on the insights page.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub priority: InsightPriority,
}

// --- dashboard ---

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TodayStats {
    pub date: NaiveDate,
    pub completion_rate: f64,
    pub completed_count: u32,
    pub total_count: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HabitSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub frequency: Frequency,
    pub category: Category,
    pub current_streak: u32,
    pub completed_today: bool,
    pub completed_today_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StreakSummary {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct QuickStats {
    pub today_rate: f64,
    pub this_week: u32,
    pub longest_streak: u32,
    pub total_habits: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DashboardHome {
    pub today: TodayStats,
    pub habits_to_complete: Vec<HabitSummary>,
    pub habits_completed: Vec<HabitSummary>,
    pub active_streaks: Vec<StreakSummary>,
    pub quick_stats: QuickStats,
}

// --- calendar ---

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HabitRef {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CompletionDay {
    pub date: NaiveDate,
    pub habits: Vec<HabitRef>,
    pub completion_rate: f64,
    pub total_habits: u32,
    pub completed_habits: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PeriodStats {
    pub total_completions: u32,
    pub days_with_completions: u32,
    pub completion_rate: f64,
    pub total_days: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CalendarRange {
    pub days: Vec<CompletionDay>,
    pub stats: PeriodStats,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DayData {
    pub date: NaiveDate,
    pub completions: Vec<Uuid>,
    pub completion_rate: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayData>,
    pub stats: PeriodStats,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WeekDayData {
    pub date: NaiveDate,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u8,
    pub completions: Vec<Uuid>,
    pub completion_rate: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WeekView {
    pub year: i32,
    pub week: u32,
    pub days: Vec<WeekDayData>,
    pub stats: PeriodStats,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub completion_rate: f64,
    /// 0..=4, bucketed on the day's completion rate.
    pub intensity: u8,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct YearView {
    pub year: i32,
    pub heatmap: Vec<HeatmapDay>,
    pub stats: PeriodStats,
}
