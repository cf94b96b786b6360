//! Ordered index of published/cancelled versions derived from the log.

use std::collections::HashSet;

use fincast_domain::{Event, EventPayload, VersionInfo, VersionKind};
use uuid::Uuid;

use crate::projection::{reduce, ProjectionScope, ProjectionState};

/// Versions sorted ascending by timestamp, log order breaking ties.
///
/// Re-derived on every log change; never stored independently.
#[derive(Debug, Clone, Default)]
pub struct VersionIndex {
    versions: Vec<VersionInfo>,
}

impl VersionIndex {
    pub fn from_events(events: &[Event]) -> Self {
        let mut versions: Vec<VersionInfo> = events
            .iter()
            .filter_map(|event| match &event.payload {
                EventPayload::ChangePublished { change_id } => Some(VersionInfo::new(
                    *change_id,
                    VersionKind::Published,
                    event.timestamp,
                )),
                EventPayload::ChangeCancelled { change_id } => Some(VersionInfo::new(
                    *change_id,
                    VersionKind::Cancelled,
                    event.timestamp,
                )),
                _ => None,
            })
            .collect();
        // Stable sort keeps log order for equal timestamps.
        versions.sort_by_key(|version| version.timestamp);
        Self { versions }
    }

    pub fn versions(&self) -> &[VersionInfo] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// The most recent published version, if any.
    pub fn latest_published(&self) -> Option<&VersionInfo> {
        self.versions.iter().rev().find(|v| v.is_published())
    }

    /// Change ids of every published version.
    pub fn published_change_ids(&self) -> HashSet<Uuid> {
        self.versions
            .iter()
            .filter(|v| v.is_published())
            .map(|v| v.id)
            .collect()
    }

    /// Inclusion scope for the version with `version_id`: every earlier
    /// *published* version's change id, plus the version's own change id.
    ///
    /// A cancelled version is therefore enumerable and replayable, but its
    /// own change contributes nothing to later inclusion sets. Unknown ids
    /// yield `None`, not an error.
    pub fn included_changes(&self, version_id: Uuid) -> Option<HashSet<Uuid>> {
        let index = self.versions.iter().position(|v| v.id == version_id)?;
        let mut included: HashSet<Uuid> = self.versions[..index]
            .iter()
            .filter(|v| v.is_published())
            .map(|v| v.id)
            .collect();
        included.insert(self.versions[index].id);
        Some(included)
    }

    /// Replays `events` up to the named version: the projection over its
    /// inclusion scope, with no active change. `None` for unknown versions.
    pub fn project_version(
        &self,
        events: &[Event],
        request_id: Uuid,
        version_id: Uuid,
    ) -> Option<ProjectionState> {
        let included = self.included_changes(version_id)?;
        Some(reduce(
            events,
            &ProjectionScope::with_included(request_id, included),
        ))
    }
}
