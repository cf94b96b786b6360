//! Maintains precomputed projections in a keyed view store.
//!
//! Caches are invalidated by recomputation only: every refresh folds the
//! log from scratch and overwrites whole entries. Cached state is never
//! merged with a delta; the event log stays the sole durable truth.

use std::sync::Arc;

use fincast_domain::{Event, MonthlyFinances};
use tracing::debug;
use uuid::Uuid;

use crate::{
    projection::{reduce, ProjectionScope},
    store::{ViewCollection, ViewStore},
    version_index::VersionIndex,
    CoreError,
};

pub struct Materializer {
    views: Arc<dyn ViewStore>,
}

impl Materializer {
    pub fn new(views: Arc<dyn ViewStore>) -> Self {
        Self { views }
    }

    /// Recomputes all cached views for the given scope and overwrites the
    /// store: the active change's draft view plus one cumulative replay per
    /// version. Intended to run on every log notification.
    pub fn refresh(
        &self,
        events: &[Event],
        request_id: Uuid,
        active_change_id: Option<Uuid>,
    ) -> Result<(), CoreError> {
        if let Some(change_id) = active_change_id {
            self.refresh_change(events, request_id, change_id)?;
        }
        let index = VersionIndex::from_events(events);
        for version in index.versions() {
            if let Some(state) = index.project_version(events, request_id, version.id) {
                self.views
                    .put(ViewCollection::CumulativeFinances, version.id, &state.finances)?;
            }
        }
        debug!(
            versions = index.len(),
            active = active_change_id.is_some(),
            "materialized views refreshed"
        );
        Ok(())
    }

    /// Recomputes and overwrites the draft view for one change.
    pub fn refresh_change(
        &self,
        events: &[Event],
        request_id: Uuid,
        change_id: Uuid,
    ) -> Result<(), CoreError> {
        let state = reduce(events, &ProjectionScope::with_active(request_id, change_id));
        self.views
            .put(ViewCollection::IncomesExpenses, change_id, &state.finances)
    }

    pub fn cached_change_view(&self, change_id: Uuid) -> Result<Option<MonthlyFinances>, CoreError> {
        self.views.get(ViewCollection::IncomesExpenses, change_id)
    }

    pub fn cached_version_view(
        &self,
        version_id: Uuid,
    ) -> Result<Option<MonthlyFinances>, CoreError> {
        self.views.get(ViewCollection::CumulativeFinances, version_id)
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        for collection in ViewCollection::ALL {
            self.views.clear(collection)?;
        }
        Ok(())
    }
}
