//! Stable, public-facing helpers that wrap the kernel.
//!
//! This module exposes a simplified API that frontends (CLI, GUI, FFI) can
//! rely on without depending on the entire module surface.

use fincast_domain::{ChangeState, VersionInfo};
use uuid::Uuid;

use crate::{
    aggregate::ChangeAggregate,
    commands,
    log::EventLog,
    projection::{reduce, ProjectionScope, ProjectionState},
    version_index::VersionIndex,
    CoreError,
};

/// Starts a new request on the log and returns its id.
pub fn api_create_request(log: &EventLog) -> Result<Uuid, CoreError> {
    commands::create_request(log)
}

/// Opens a new draft change and returns its id.
pub fn api_create_change(log: &EventLog) -> Result<Uuid, CoreError> {
    commands::create_change(log)
}

/// Current lifecycle state for a change, rebuilt from the full log.
pub fn api_change_state(log: &EventLog, change_id: Uuid) -> ChangeState {
    ChangeAggregate::fold(&log.list(), change_id).state()
}

/// Live monthly view: base events plus the active change, if any.
pub fn api_monthly_view(
    log: &EventLog,
    request_id: Uuid,
    active_change_id: Option<Uuid>,
) -> ProjectionState {
    let scope = match active_change_id {
        Some(change_id) => ProjectionScope::with_active(request_id, change_id),
        None => ProjectionScope::for_request(request_id),
    };
    reduce(&log.list(), &scope)
}

/// All versions derivable from the log, in timestamp order.
pub fn api_versions(log: &EventLog) -> Vec<VersionInfo> {
    VersionIndex::from_events(&log.list()).versions().to_vec()
}

/// Replays the log up to the named version. `None` when the version id is
/// unknown.
pub fn api_replay_version(
    log: &EventLog,
    request_id: Uuid,
    version_id: Uuid,
) -> Option<ProjectionState> {
    let events = log.list();
    VersionIndex::from_events(&events).project_version(&events, request_id, version_id)
}
