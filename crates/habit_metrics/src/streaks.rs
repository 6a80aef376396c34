//! Current- and longest-streak computation for daily and weekly habits.
//!
//! Every function here is pure: the reference day is a parameter, never a
//! clock read, so callers inject `Utc::now().date_naive()` in production
//! and fixed days in tests.

use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

use crate::Frequency;
use crate::dates::{week_key, week_start};

/// Hard cap on the backward week walk: ~19 years of consecutive weeks.
const MAX_WEEK_WALK: u32 = 1000;

/// Length of the consecutive run ending at (or adjacent to) `today`.
///
/// A day/week that is still open does not break the run: if `today` has no
/// completion the walk anchors on yesterday instead, and the weekly walk
/// anchors on last week when the current week is empty. It just does not
/// count either.
pub fn current_streak(completed: &[NaiveDate], frequency: Frequency, today: NaiveDate) -> u32 {
    if completed.is_empty() {
        return 0;
    }
    match frequency {
        Frequency::Daily => current_daily_streak(completed, today),
        Frequency::Weekly => current_weekly_streak(completed, today),
    }
}

/// Length of the longest consecutive run anywhere in history.
pub fn longest_streak(completed: &[NaiveDate], frequency: Frequency) -> u32 {
    if completed.is_empty() {
        return 0;
    }
    match frequency {
        Frequency::Daily => longest_daily_streak(completed),
        Frequency::Weekly => longest_weekly_streak(completed),
    }
}

fn current_daily_streak(completed: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut days = completed.to_vec();
    days.sort_unstable_by(|a, b| b.cmp(a));

    let mut expected = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    for day in &days {
        if *day == expected {
            streak += 1;
            expected -= Duration::days(1);
        } else if *day < expected {
            // gap found, run is over
            break;
        }
        // days after the cursor are duplicate/future noise; skip them
    }
    streak
}

fn longest_daily_streak(completed: &[NaiveDate]) -> u32 {
    let mut days = completed.to_vec();
    days.sort_unstable();

    let mut longest = 1u32;
    let mut current = 1u32;
    for pair in days.windows(2) {
        if pair[1].signed_duration_since(pair[0]).num_days() == 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

fn current_weekly_streak(completed: &[NaiveDate], today: NaiveDate) -> u32 {
    let weeks: HashSet<(i32, u32)> = completed.iter().copied().map(week_key).collect();

    // Anchor on the current week, or last week if this one is still empty.
    let mut cursor = today;
    if !weeks.contains(&week_key(cursor)) {
        cursor -= Duration::weeks(1);
    }

    let mut streak = 0;
    for _ in 0..MAX_WEEK_WALK {
        if weeks.contains(&week_key(cursor)) {
            streak += 1;
            cursor -= Duration::weeks(1);
        } else {
            break;
        }
    }
    streak
}

fn longest_weekly_streak(completed: &[NaiveDate]) -> u32 {
    let weeks: HashSet<(i32, u32)> = completed.iter().copied().map(week_key).collect();

    // Compare weeks through their Mondays so year boundaries stay exact.
    let mut mondays: Vec<NaiveDate> = weeks
        .into_iter()
        .map(|(year, week)| week_start(year, week))
        .collect();
    mondays.sort_unstable();

    let mut longest = 1u32;
    let mut current = 1u32;
    for pair in mondays.windows(2) {
        if pair[1].signed_duration_since(pair[0]).num_days() == 7 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}
