//! The projection engine: folds the event sequence into monthly finances.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use fincast_domain::{
    months_in_period, Entry, EntryKind, Event, EventPayload, MonthlyFinances, ProjectionStatus,
    TimePeriod,
};
use tracing::warn;
use uuid::Uuid;

/// Which events are visible to a projection run.
#[derive(Debug, Clone)]
pub struct ProjectionScope {
    pub request_id: Uuid,
    pub active_change_id: Option<Uuid>,
    pub included_changes: Option<HashSet<Uuid>>,
}

impl ProjectionScope {
    /// Base events only: no active change, no inclusion set.
    pub fn for_request(request_id: Uuid) -> Self {
        Self {
            request_id,
            active_change_id: None,
            included_changes: None,
        }
    }

    /// Base events plus one active change.
    pub fn with_active(request_id: Uuid, change_id: Uuid) -> Self {
        Self {
            request_id,
            active_change_id: Some(change_id),
            included_changes: None,
        }
    }

    /// Base events plus a fixed inclusion set (version replay).
    pub fn with_included(request_id: Uuid, included: HashSet<Uuid>) -> Self {
        Self {
            request_id,
            active_change_id: None,
            included_changes: Some(included),
        }
    }

    fn admits_change(&self, change_id: Uuid) -> bool {
        if self.active_change_id == Some(change_id) {
            return true;
        }
        self.included_changes
            .as_ref()
            .is_some_and(|included| included.contains(&change_id))
    }
}

/// Point-in-time result of folding a sequence under a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    pub finances: MonthlyFinances,
    pub change_status: ProjectionStatus,
    /// Number of events folded, informational only.
    pub version: usize,
    /// Max event timestamp seen, `None` for an empty sequence.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Pure fold of `events` under `scope`. Deterministic, side-effect-free,
/// safe to run concurrently and redundantly.
///
/// Base events (those whose `belongs_to` equals the request id) always
/// apply. Change events apply when the scope admits their change — unless
/// that change was cancelled anywhere in the sequence, which voids every
/// entry it contributed regardless of scope membership.
pub fn reduce(events: &[Event], scope: &ProjectionScope) -> ProjectionState {
    let cancelled: HashSet<Uuid> = events
        .iter()
        .filter_map(|event| match &event.payload {
            EventPayload::ChangeCancelled { change_id } => Some(*change_id),
            _ => None,
        })
        .collect();

    let mut finances = MonthlyFinances::new();
    let mut latest: Option<DateTime<Utc>> = None;
    let mut active_published = false;
    let mut active_cancelled = false;

    for event in events {
        latest = Some(match latest {
            Some(seen) => seen.max(event.timestamp),
            None => event.timestamp,
        });

        match &event.payload {
            EventPayload::IncomeAdded {
                amount,
                description,
                belongs_to,
                period,
            } => apply_entry(
                &mut finances,
                scope,
                &cancelled,
                EntryKind::Income,
                *amount,
                description,
                *belongs_to,
                period,
            ),
            EventPayload::ExpenseAdded {
                amount,
                description,
                belongs_to,
                period,
            } => apply_entry(
                &mut finances,
                scope,
                &cancelled,
                EntryKind::Expense,
                *amount,
                description,
                *belongs_to,
                period,
            ),
            EventPayload::ChangeCancelled { change_id }
                if scope.active_change_id == Some(*change_id) =>
            {
                active_cancelled = true;
            }
            EventPayload::ChangePublished { change_id }
                if scope.active_change_id == Some(*change_id) =>
            {
                active_published = true;
            }
            // RequestCreated, ChangeCreated, EntryRemoved (reserved) and
            // lifecycle events for other changes carry no finances.
            _ => {}
        }
    }

    let change_status = if active_cancelled {
        ProjectionStatus::Cancelled
    } else if active_published {
        ProjectionStatus::Published
    } else if scope.active_change_id.is_some() {
        ProjectionStatus::Draft
    } else {
        ProjectionStatus::Completed
    };

    ProjectionState {
        finances,
        change_status,
        version: events.len(),
        timestamp: latest,
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_entry(
    finances: &mut MonthlyFinances,
    scope: &ProjectionScope,
    cancelled: &HashSet<Uuid>,
    kind: EntryKind,
    amount: f64,
    description: &str,
    belongs_to: Uuid,
    period: &TimePeriod,
) {
    let is_base = belongs_to == scope.request_id;
    if !is_base {
        if !scope.admits_change(belongs_to) {
            return;
        }
        if cancelled.contains(&belongs_to) {
            return;
        }
    }
    if period.is_inverted() {
        warn!(
            %belongs_to,
            start = %period.start,
            end = %period.end,
            "skipping entry with inverted period"
        );
        return;
    }
    for month in months_in_period(period) {
        finances.entry(month).or_default().push(Entry {
            amount,
            description: description.to_string(),
            kind,
            change_id: belongs_to,
        });
    }
}
