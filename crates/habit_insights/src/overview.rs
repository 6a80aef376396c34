//! Habit listing with full metric enrichment and streak write-back.

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use habit_metrics::{EngineConfig, EnrichedHabit, HabitEnricher, HabitLogStore};

use crate::{HabitCatalog, InsightsResult};

pub struct HabitOverview {
    store: Arc<dyn HabitLogStore>,
    catalog: Arc<dyn HabitCatalog>,
    enricher: HabitEnricher,
}

impl HabitOverview {
    pub fn new(
        store: Arc<dyn HabitLogStore>,
        catalog: Arc<dyn HabitCatalog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            enricher: HabitEnricher::new(config),
        }
    }

    /// Every habit of the user with freshly computed metrics. When the
    /// computed streaks differ from the persisted cache the update intent
    /// is applied here; a failed write is logged and the fresh values are
    /// still returned, since the cache can always be recomputed.
    pub async fn list_with_metrics(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> InsightsResult<Vec<EnrichedHabit>> {
        let habits = self.catalog.habits_for_user(user_id).await?;

        let mut enriched = Vec::with_capacity(habits.len());
        for habit in &habits {
            let item = self.enricher.enrich(self.store.as_ref(), habit, today).await;
            if let Some(update) = item.streak_update {
                if let Err(e) = self
                    .store
                    .persist_streaks(
                        update.habit_id,
                        update.user_id,
                        update.current_streak,
                        update.longest_streak,
                    )
                    .await
                {
                    tracing::warn!(
                        habit_id = %update.habit_id,
                        error = %e,
                        "streak write-back failed; returning fresh values anyway"
                    );
                }
            }
            enriched.push(item);
        }
        Ok(enriched)
    }
}
