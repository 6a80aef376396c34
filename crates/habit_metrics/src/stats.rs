//! Completion rate, same-day status, window counts, and history.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{CompletionLog, Frequency};

/// Percentage of expected periods actually completed, in `[0, 100]`.
///
/// The period count is what changes with cadence: days for daily habits,
/// whole weeks for weekly ones, inclusive of both endpoints either way.
/// `completed_count` is always the number of completed logs in
/// `[created_at, as_of]`. A non-positive period count (habit created after
/// `as_of`) yields 0 rather than a division error.
pub fn completion_rate(
    completed_count: usize,
    created_at: NaiveDate,
    as_of: NaiveDate,
    frequency: Frequency,
) -> f64 {
    let elapsed_days = as_of.signed_duration_since(created_at).num_days();
    let periods = match frequency {
        Frequency::Daily => elapsed_days + 1,
        Frequency::Weekly => elapsed_days / 7 + 1,
    };
    if periods <= 0 {
        return 0.0;
    }
    completed_count as f64 / periods as f64 * 100.0
}

/// Count of completed logs in a batch. Windowing is the caller's job: pass
/// the logs fetched for whatever range is being aggregated.
pub fn count_completed(logs: &[CompletionLog]) -> usize {
    logs.iter().filter(|log| log.completed).count()
}

/// Same-day completion status for one habit, from the user's logs dated
/// exactly the reference day. At most one match can exist per the storage
/// upsert invariant; its `recorded_at` is the completion time to display.
pub fn today_status(logs: &[CompletionLog], habit_id: Uuid) -> (bool, Option<DateTime<Utc>>) {
    for log in logs {
        if log.habit_id == habit_id && log.completed {
            return (true, Some(log.recorded_at));
        }
    }
    (false, None)
}

/// Every completed date in the supplied logs, most recent first, truncated
/// to at most `cap` entries. A cap of zero yields an empty history.
pub fn completion_history(logs: &[CompletionLog], cap: usize) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = logs
        .iter()
        .filter(|log| log.completed)
        .map(|log| log.log_date)
        .collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.truncate(cap);
    dates
}
