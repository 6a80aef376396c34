use chrono::{Duration, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use habit_metrics::Frequency;
use habit_metrics::streaks::{current_streak, longest_streak};

fn bench_streaks(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2025, 6, 4).expect("valid date");

    // Five years of near-daily completions with a gap every 40 days, the
    // worst realistic case for the descending walk.
    let completed: Vec<NaiveDate> = (0..1825)
        .filter(|off| off % 40 != 0)
        .map(|off| today - Duration::days(off))
        .collect();

    c.bench_function("current_streak_daily_5y", |b| {
        b.iter(|| current_streak(&completed, Frequency::Daily, today))
    });
    c.bench_function("longest_streak_daily_5y", |b| {
        b.iter(|| longest_streak(&completed, Frequency::Daily))
    });
    c.bench_function("longest_streak_weekly_5y", |b| {
        b.iter(|| longest_streak(&completed, Frequency::Weekly))
    });
}

criterion_group!(benches, bench_streaks);
criterion_main!(benches);
