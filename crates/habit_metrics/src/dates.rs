//! Calendar-day and ISO-week arithmetic shared by every calculator.
//!
//! All comparisons in this crate operate on [`NaiveDate`] values produced
//! by [`normalize_day`]; raw timestamps never reach the algorithms, which
//! keeps time-of-day drift out of the day math.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// How far [`week_start`] will step from its anchor before giving up.
/// Generous: covers every representable ISO week of a year.
const WEEK_LOCATE_LIMIT: u32 = 60;

/// Collapse a timestamp to its UTC calendar day, discarding time-of-day.
/// Idempotent by construction: a `NaiveDate` round-trips unchanged.
pub fn normalize_day(t: DateTime<Utc>) -> NaiveDate {
    t.date_naive()
}

/// The earliest day the engine ever asks a store about. Habit logs before
/// the Unix epoch do not exist.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("1970-01-01 is a valid date")
}

/// The ISO-8601 `(year, week)` pair a day falls into. Weeks start Monday;
/// week 1 is the week containing the year's first Thursday, so dates near
/// year boundaries may belong to the adjacent year's numbering.
pub fn week_key(day: NaiveDate) -> (i32, u32) {
    let week = day.iso_week();
    (week.year(), week.week())
}

/// The Monday of the given ISO week.
///
/// Anchors on January 4th (always inside week 1), steps whole weeks until
/// the key matches, then walks back to Monday. The search is bounded; a
/// failure to converge would mean the calendar arithmetic itself is wrong,
/// so it is logged and the best candidate returned rather than surfaced.
pub fn week_start(year: i32, week: u32) -> NaiveDate {
    let mut day = NaiveDate::from_ymd_opt(year, 1, 4).unwrap_or_else(epoch);
    let mut steps = 0;
    loop {
        let (y, w) = week_key(day);
        if y == year && w == week {
            break;
        }
        if steps >= WEEK_LOCATE_LIMIT {
            tracing::error!(year, week, "week_start failed to locate ISO week");
            break;
        }
        if (y, w) < (year, week) {
            day += Duration::weeks(1);
        } else {
            day -= Duration::weeks(1);
        }
        steps += 1;
    }
    // walk back to the Monday of the located week
    day - Duration::days(i64::from(day.weekday().number_from_monday()) - 1)
}

/// The Monday..Sunday window of the ISO week containing `day`. Sunday is
/// weekday 7, so Monday is always offset zero.
pub fn week_window(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = i64::from(day.weekday().number_from_monday()) - 1;
    let start = day - Duration::days(offset);
    (start, start + Duration::days(6))
}
