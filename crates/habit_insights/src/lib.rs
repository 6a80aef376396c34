//! Habit-tracking feature services built on the `habit_metrics` engine:
//! list enrichment with streak write-back, analytics rollups, the
//! dashboard home view, and calendar views. Everything reaches storage
//! through the `HabitLogStore` and `HabitCatalog` traits, so the services
//! stay independent of any persistence or transport layer.

use async_trait::async_trait;
use habit_metrics::Habit;
use uuid::Uuid;

pub mod analytics;
pub mod calendar;
pub mod dashboard;
pub mod error;
pub mod memory;
pub mod overview;
pub mod types;

pub use error::{InsightsError, InsightsResult};

/// Catalog collaborator: the habit listing the storage layer owns.
/// Returns every habit of the user, archived ones included; features
/// filter by the activity rule themselves.
#[async_trait]
pub trait HabitCatalog: Send + Sync + 'static {
    async fn habits_for_user(&self, user_id: Uuid) -> InsightsResult<Vec<Habit>>;
}
