//! The append-only event log.
//!
//! An explicitly constructed, injected instance with a defined lifecycle:
//! created at session start, shared behind an `Arc`, torn down by dropping.
//! Subscribers form an explicit observer list; there is no module-level
//! singleton.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use fincast_domain::Event;
use tracing::debug;

use crate::{store::EventStore, CoreError};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`EventLog::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

struct LogInner {
    events: Vec<Event>,
    /// How many of `events` the backing store has accepted so far.
    persisted_len: usize,
}

/// Insertion-ordered sequence of domain events with subscribe/notify.
///
/// No event is ever removed or mutated after append. Appends are atomic per
/// call and notify every current subscriber exactly once per call, batched.
pub struct EventLog {
    inner: Mutex<LogInner>,
    listeners: Mutex<Vec<(usize, Listener)>>,
    next_listener_id: AtomicUsize,
    store: Option<Arc<dyn EventStore>>,
}

impl EventLog {
    /// Creates an in-memory log with no durable backing.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LogInner {
                events: Vec::new(),
                persisted_len: 0,
            }),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicUsize::new(0),
            store: None,
        }
    }

    /// Opens a log backed by `store`, replaying whatever it already holds.
    pub fn with_store(store: Arc<dyn EventStore>) -> Result<Self, CoreError> {
        let events = store.load_events()?;
        let persisted_len = events.len();
        Ok(Self {
            inner: Mutex::new(LogInner {
                events,
                persisted_len,
            }),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicUsize::new(0),
            store: Some(store),
        })
    }

    /// Atomically extends the log with `events`, persists them, then
    /// notifies subscribers once.
    pub fn append(&self, events: Vec<Event>) -> Result<(), CoreError> {
        self.append_with(|_| Ok(events)).map(|_| ())
    }

    /// Compare-and-append: evaluates `decide` against the current sequence
    /// while holding the append lock, then appends whatever it returns.
    ///
    /// Command handlers re-validate their aggregate guards inside `decide`,
    /// so two racing commands cannot both pass a guard against the same
    /// stale state.
    ///
    /// A persist failure leaves the new events appended in memory and
    /// returns the storage error; callers retry with [`EventLog::flush`],
    /// they must not re-derive the events.
    pub fn append_with<F>(&self, decide: F) -> Result<Vec<Event>, CoreError>
    where
        F: FnOnce(&[Event]) -> Result<Vec<Event>, CoreError>,
    {
        let (appended, persist_result) = {
            let mut inner = self.lock_inner()?;
            let new_events = decide(&inner.events)?;
            inner.events.extend(new_events.iter().cloned());
            let persist_result = self.persist_tail(&mut inner);
            (new_events, persist_result)
        };
        if persist_result.is_ok() {
            debug!(appended = appended.len(), "events appended to log");
            self.notify();
        }
        persist_result.map(|()| appended)
    }

    /// Defensive copy of the whole sequence, in append order.
    pub fn list(&self) -> Vec<Event> {
        self.inner
            .lock()
            .map(|inner| inner.events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the log (and the backing store, when wired) and notifies.
    pub fn clear(&self) -> Result<(), CoreError> {
        {
            let mut inner = self.lock_inner()?;
            inner.events.clear();
            inner.persisted_len = 0;
            if let Some(store) = &self.store {
                store.clear_events()?;
            }
        }
        self.notify();
        Ok(())
    }

    /// Retries persisting any events the store has not yet accepted.
    /// Notifies subscribers when something newly became durable.
    pub fn flush(&self) -> Result<(), CoreError> {
        let persisted = {
            let mut inner = self.lock_inner()?;
            let pending = inner.events.len() - inner.persisted_len;
            if pending == 0 {
                return Ok(());
            }
            self.persist_tail(&mut inner)?;
            pending
        };
        debug!(persisted, "flushed unpersisted log tail");
        self.notify();
        Ok(())
    }

    /// Registers a listener invoked after every append/clear.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::new(callback)));
        }
        SubscriptionId(id)
    }

    /// Removes a listener; returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut listeners) = self.listeners.lock() else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id.0);
        listeners.len() != before
    }

    fn persist_tail(&self, inner: &mut LogInner) -> Result<(), CoreError> {
        let Some(store) = &self.store else {
            inner.persisted_len = inner.events.len();
            return Ok(());
        };
        if inner.persisted_len < inner.events.len() {
            store.append_events(&inner.events[inner.persisted_len..])?;
            inner.persisted_len = inner.events.len();
        }
        Ok(())
    }

    // Listener callbacks run outside both locks so they can re-enter
    // `list()` freely.
    fn notify(&self) {
        let callbacks: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback();
        }
    }

    fn lock_inner(&self) -> Result<std::sync::MutexGuard<'_, LogInner>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Storage("event log lock poisoned".into()))
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
