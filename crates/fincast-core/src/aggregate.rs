//! Per-change state machine reconstructed by folding the log.

use fincast_domain::{ChangeState, Event, EventPayload};
use uuid::Uuid;

/// Derived state for one change id: lifecycle state plus how many committed
/// events carry its `belongs_to`.
///
/// The aggregate keeps no independent persisted state; it is always rebuilt
/// by a full fold from the start of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeAggregate {
    change_id: Uuid,
    state: ChangeState,
    committed_event_count: usize,
}

impl ChangeAggregate {
    pub fn new(change_id: Uuid) -> Self {
        Self {
            change_id,
            state: ChangeState::Draft,
            committed_event_count: 0,
        }
    }

    /// Full replay of `events` for the given change id.
    pub fn fold(events: &[Event], change_id: Uuid) -> Self {
        let mut aggregate = Self::new(change_id);
        for event in events {
            aggregate.apply(event);
        }
        aggregate
    }

    /// Folds a single event. Lifecycle transitions only leave `Draft`;
    /// `Published` and `Cancelled` are terminal.
    pub fn apply(&mut self, event: &Event) {
        if event.belongs_to() == Some(self.change_id) {
            self.committed_event_count += 1;
        }
        if self.state != ChangeState::Draft {
            return;
        }
        match &event.payload {
            EventPayload::ChangePublished { change_id } if *change_id == self.change_id => {
                self.state = ChangeState::Published;
            }
            EventPayload::ChangeCancelled { change_id } if *change_id == self.change_id => {
                self.state = ChangeState::Cancelled;
            }
            _ => {}
        }
    }

    pub fn change_id(&self) -> Uuid {
        self.change_id
    }

    pub fn state(&self) -> ChangeState {
        self.state
    }

    pub fn committed_event_count(&self) -> usize {
        self.committed_event_count
    }

    pub fn can_add_item(&self) -> bool {
        self.state == ChangeState::Draft
    }

    pub fn can_commit(&self) -> bool {
        self.state == ChangeState::Draft
    }

    pub fn can_publish(&self) -> bool {
        self.state == ChangeState::Draft && self.committed_event_count > 0
    }

    pub fn can_cancel(&self) -> bool {
        self.state == ChangeState::Draft && self.committed_event_count > 0
    }
}
