//! Command handlers: validated DTOs in, guarded appends out.
//!
//! Every handler re-folds the aggregate and re-checks its guard inside
//! [`EventLog::append_with`], so the guard and the append are evaluated
//! against the same state even under concurrent callers.

use fincast_domain::{Event, EventPayload, MonthKey, TimePeriod};
use uuid::Uuid;

use crate::{aggregate::ChangeAggregate, log::EventLog, CoreError};

/// Income or expense entry as collected from the caller, before validation.
/// Months use the `YYYY-MM` form; the period runs from the first day of
/// `start_month` through the first day of `end_month`, inclusive.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub amount: f64,
    pub description: String,
    pub start_month: String,
    pub end_month: String,
}

impl EntryDraft {
    /// Validates the month pair into a [`TimePeriod`].
    pub fn period(&self) -> Result<TimePeriod, CoreError> {
        let start = parse_month(&self.start_month)?.first_day();
        let end = parse_month(&self.end_month)?.first_day();
        let period = TimePeriod::new(start, end);
        if period.is_inverted() {
            return Err(CoreError::MalformedPeriod(format!(
                "end month {} precedes start month {}",
                self.end_month, self.start_month
            )));
        }
        Ok(period)
    }
}

fn parse_month(raw: &str) -> Result<MonthKey, CoreError> {
    raw.parse::<MonthKey>()
        .map_err(|err| CoreError::MalformedPeriod(err.to_string()))
}

/// Appends `RequestCreated` and returns the new request id.
pub fn create_request(log: &EventLog) -> Result<Uuid, CoreError> {
    let request_id = Uuid::new_v4();
    log.append(vec![Event::now(EventPayload::RequestCreated { request_id })])?;
    Ok(request_id)
}

/// Appends `ChangeCreated` and returns the new change id.
pub fn create_change(log: &EventLog) -> Result<Uuid, CoreError> {
    let change_id = Uuid::new_v4();
    log.append(vec![Event::now(EventPayload::ChangeCreated { change_id })])?;
    Ok(change_id)
}

/// Staged income/expense events for one change, held back until commit.
#[derive(Debug, Clone)]
pub struct PendingBatch {
    change_id: Uuid,
    events: Vec<Event>,
}

impl PendingBatch {
    pub fn new(change_id: Uuid) -> Self {
        Self {
            change_id,
            events: Vec::new(),
        }
    }

    pub fn change_id(&self) -> Uuid {
        self.change_id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn stage_income(&mut self, log: &EventLog, draft: &EntryDraft) -> Result<(), CoreError> {
        let period = draft.period()?;
        self.stage(
            log,
            EventPayload::IncomeAdded {
                amount: draft.amount,
                description: draft.description.clone(),
                belongs_to: self.change_id,
                period,
            },
        )
    }

    pub fn stage_expense(&mut self, log: &EventLog, draft: &EntryDraft) -> Result<(), CoreError> {
        let period = draft.period()?;
        self.stage(
            log,
            EventPayload::ExpenseAdded {
                amount: draft.amount,
                description: draft.description.clone(),
                belongs_to: self.change_id,
                period,
            },
        )
    }

    fn stage(&mut self, log: &EventLog, payload: EventPayload) -> Result<(), CoreError> {
        let aggregate = ChangeAggregate::fold(&log.list(), self.change_id);
        if !aggregate.can_add_item() {
            return Err(CoreError::GuardViolation {
                action: "add an entry to",
                change_id: self.change_id,
            });
        }
        self.events.push(Event::now(payload));
        Ok(())
    }
}

/// Commits a staged batch: the whole batch is appended atomically, or
/// nothing is. Returns how many events were committed.
pub fn commit_change(log: &EventLog, batch: PendingBatch) -> Result<usize, CoreError> {
    let change_id = batch.change_id;
    if batch.is_empty() {
        return Err(CoreError::GuardViolation {
            action: "commit",
            change_id,
        });
    }
    let committed = log.append_with(|current| {
        let aggregate = ChangeAggregate::fold(current, change_id);
        if !aggregate.can_commit() {
            return Err(CoreError::GuardViolation {
                action: "commit",
                change_id,
            });
        }
        Ok(batch.events)
    })?;
    Ok(committed.len())
}

/// Publishes a draft change with at least one committed event.
pub fn publish_change(log: &EventLog, change_id: Uuid) -> Result<(), CoreError> {
    log.append_with(|current| {
        let aggregate = ChangeAggregate::fold(current, change_id);
        if !aggregate.can_publish() {
            return Err(CoreError::GuardViolation {
                action: "publish",
                change_id,
            });
        }
        Ok(vec![Event::now(EventPayload::ChangePublished { change_id })])
    })?;
    Ok(())
}

/// Cancels a draft change with at least one committed event.
pub fn cancel_change(log: &EventLog, change_id: Uuid) -> Result<(), CoreError> {
    log.append_with(|current| {
        let aggregate = ChangeAggregate::fold(current, change_id);
        if !aggregate.can_cancel() {
            return Err(CoreError::GuardViolation {
                action: "cancel",
                change_id,
            });
        }
        Ok(vec![Event::now(EventPayload::ChangeCancelled { change_id })])
    })?;
    Ok(())
}
