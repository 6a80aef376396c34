use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use habit_insights::analytics::{AnalyticsService, Period};
use habit_insights::dashboard::DashboardService;
use habit_insights::memory::MemoryStore;
use habit_insights::overview::HabitOverview;
use habit_metrics::{Category, EngineConfig, Frequency, Habit};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure logging from env var `HABIT_INSIGHTS_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("HABIT_INSIGHTS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("habit_insights: log filter: {}", log_env);

    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    let today = Utc::now().date_naive();

    // Seed a few weeks of sample data so every view has something to show.
    let seeds = [
        ("Morning run", Category::Health, Frequency::Daily, 2u32),
        ("Read 20 pages", Category::Learning, Frequency::Daily, 3),
        ("Weekly review", Category::Work, Frequency::Weekly, 7),
    ];
    for (name, category, frequency, gap) in seeds {
        let habit = Habit {
            id: Uuid::new_v4(),
            user_id: user,
            name: name.into(),
            description: None,
            icon: None,
            color: None,
            category,
            frequency,
            current_streak: 0,
            longest_streak: 0,
            created_at: Utc::now() - Duration::days(21),
            archived_at: None,
        };
        store.insert_habit(habit.clone()).await;
        for off in 0..21 {
            if off % i64::from(gap) == 0 {
                let d = today - Duration::days(off);
                store.record(user, habit.id, d, true, Utc::now()).await;
            }
        }
    }

    let config = EngineConfig::from_env()?;
    let overview = HabitOverview::new(Arc::new(store.clone()), Arc::new(store.clone()), config);
    for item in overview.list_with_metrics(user, today).await? {
        tracing::info!(
            habit = %item.habit.name,
            current_streak = item.metrics.current_streak,
            longest_streak = item.metrics.longest_streak,
            completion_rate = format!("{:.1}%", item.metrics.completion_rate),
            completed_today = item.metrics.completed_today,
            "enriched habit"
        );
    }

    let analytics = AnalyticsService::new(Arc::new(store.clone()), Arc::new(store.clone()));
    let metrics = analytics.overall_metrics(user, today).await?;
    tracing::info!(
        avg_completion_rate = format!("{:.1}%", metrics.avg_completion_rate),
        avg_streak = format!("{:.1}", metrics.avg_streak),
        total_completions = metrics.total_completions,
        "overall metrics"
    );
    for insight in analytics.insights(user, today).await? {
        tracing::info!(title = %insight.title, "{}", insight.description);
    }
    let trend = analytics.completion_trend(user, Period::Week, today).await?;
    tracing::info!(points = trend.len(), "completion trend computed");

    let dashboard = DashboardService::new(Arc::new(store.clone()), Arc::new(store));
    let home = dashboard.home(user, today).await?;
    println!("{}", serde_json::to_string_pretty(&home)?);

    Ok(())
}
