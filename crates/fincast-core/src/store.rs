//! Persistence seams consumed by the kernel.
//!
//! The core never touches a concrete storage engine; it requires an ordered
//! durable append log for events and a keyed blob store for derived views,
//! both injected through these traits.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use fincast_domain::{Event, MonthlyFinances};
use uuid::Uuid;

use crate::CoreError;

/// Durable append-only collection of events.
///
/// `append_events` must persist in order and never rewrite earlier records.
pub trait EventStore: Send + Sync {
    fn append_events(&self, events: &[Event]) -> Result<(), CoreError>;
    fn load_events(&self) -> Result<Vec<Event>, CoreError>;
    fn clear_events(&self) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The two derived-view collections kept next to the event log.
pub enum ViewCollection {
    /// Draft view per active-change id.
    IncomesExpenses,
    /// Cumulative replay per version id.
    CumulativeFinances,
}

impl ViewCollection {
    pub const ALL: [ViewCollection; 2] = [
        ViewCollection::IncomesExpenses,
        ViewCollection::CumulativeFinances,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ViewCollection::IncomesExpenses => "incomes_expenses",
            ViewCollection::CumulativeFinances => "cumulative_finances",
        }
    }
}

/// Keyed blob store caching precomputed monthly projections.
///
/// Entries are invalidated by recomputation: owners overwrite whole values,
/// they never merge a cached value with a delta.
pub trait ViewStore: Send + Sync {
    fn put(
        &self,
        collection: ViewCollection,
        key: Uuid,
        value: &MonthlyFinances,
    ) -> Result<(), CoreError>;
    fn get(&self, collection: ViewCollection, key: Uuid)
        -> Result<Option<MonthlyFinances>, CoreError>;
    fn keys(&self, collection: ViewCollection) -> Result<Vec<Uuid>, CoreError>;
    fn clear(&self, collection: ViewCollection) -> Result<(), CoreError>;
}

/// In-memory [`ViewStore`] used for tests and unwired sessions.
#[derive(Default)]
pub struct MemoryViewStore {
    entries: Mutex<HashMap<(ViewCollection, Uuid), MonthlyFinances>>,
}

impl MemoryViewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewStore for MemoryViewStore {
    fn put(
        &self,
        collection: ViewCollection,
        key: Uuid,
        value: &MonthlyFinances,
    ) -> Result<(), CoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("view store lock poisoned".into()))?;
        entries.insert((collection, key), value.clone());
        Ok(())
    }

    fn get(
        &self,
        collection: ViewCollection,
        key: Uuid,
    ) -> Result<Option<MonthlyFinances>, CoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("view store lock poisoned".into()))?;
        Ok(entries.get(&(collection, key)).cloned())
    }

    fn keys(&self, collection: ViewCollection) -> Result<Vec<Uuid>, CoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("view store lock poisoned".into()))?;
        Ok(entries
            .keys()
            .filter(|(c, _)| *c == collection)
            .map(|(_, key)| *key)
            .collect())
    }

    fn clear(&self, collection: ViewCollection) -> Result<(), CoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("view store lock poisoned".into()))?;
        entries.retain(|(c, _), _| *c != collection);
        Ok(())
    }
}
