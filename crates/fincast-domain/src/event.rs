//! Domain events appended to the change-request log.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inclusive closed interval of calendar dates covered by an entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimePeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// An inverted period covers no months and is skipped by projections.
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

/// A single immutable record in the append-only log.
///
/// The persisted shape is `{ "type": ..., "timestamp": <ms since epoch>,
/// ...variant fields }`, with the payload tag flattened next to the
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self { timestamp, payload }
    }

    /// Stamps the payload with the current wall-clock time.
    pub fn now(payload: EventPayload) -> Self {
        Self::new(Utc::now(), payload)
    }

    pub fn belongs_to(&self) -> Option<Uuid> {
        self.payload.belongs_to()
    }
}

/// Closed union of everything that can be appended to the log.
///
/// Unknown tags are rejected at deserialization; there is no catch-all
/// variant on purpose.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EventPayload {
    #[serde(rename_all = "camelCase")]
    RequestCreated { request_id: Uuid },
    #[serde(rename_all = "camelCase")]
    ChangeCreated { change_id: Uuid },
    #[serde(rename_all = "camelCase")]
    IncomeAdded {
        amount: f64,
        description: String,
        belongs_to: Uuid,
        period: TimePeriod,
    },
    #[serde(rename_all = "camelCase")]
    ExpenseAdded {
        amount: f64,
        description: String,
        belongs_to: Uuid,
        period: TimePeriod,
    },
    /// Reserved: declared in the schema but never applied by any fold.
    #[serde(rename_all = "camelCase")]
    EntryRemoved { index: usize, belongs_to: Uuid },
    #[serde(rename_all = "camelCase")]
    ChangeCancelled { change_id: Uuid },
    #[serde(rename_all = "camelCase")]
    ChangePublished { change_id: Uuid },
}

impl EventPayload {
    /// The change id this event contributes to, if it carries one.
    pub fn belongs_to(&self) -> Option<Uuid> {
        match self {
            EventPayload::IncomeAdded { belongs_to, .. }
            | EventPayload::ExpenseAdded { belongs_to, .. }
            | EventPayload::EntryRemoved { belongs_to, .. } => Some(*belongs_to),
            _ => None,
        }
    }

    /// The change id named by a lifecycle (publish/cancel) event.
    pub fn lifecycle_change_id(&self) -> Option<Uuid> {
        match self {
            EventPayload::ChangePublished { change_id }
            | EventPayload::ChangeCancelled { change_id } => Some(*change_id),
            _ => None,
        }
    }

    pub fn period(&self) -> Option<&TimePeriod> {
        match self {
            EventPayload::IncomeAdded { period, .. }
            | EventPayload::ExpenseAdded { period, .. } => Some(period),
            _ => None,
        }
    }
}
