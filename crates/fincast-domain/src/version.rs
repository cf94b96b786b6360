//! Change lifecycle states and published/cancelled version descriptors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
/// Lifecycle state of a single change. Transitions are monotone and
/// terminal: `Draft -> Published` or `Draft -> Cancelled`, never back.
pub enum ChangeState {
    #[default]
    Draft,
    Published,
    Cancelled,
}

impl ChangeState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChangeState::Draft)
    }
}

impl fmt::Display for ChangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeState::Draft => "draft",
            ChangeState::Published => "published",
            ChangeState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Status reported by a projection for its scope. `Completed` means the
/// scope had no active change to report on.
pub enum ProjectionStatus {
    Completed,
    Draft,
    Published,
    Cancelled,
}

impl fmt::Display for ProjectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProjectionStatus::Completed => "completed",
            ProjectionStatus::Draft => "draft",
            ProjectionStatus::Published => "published",
            ProjectionStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Whether a version was produced by a publish or a cancel.
pub enum VersionKind {
    Published,
    Cancelled,
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VersionKind::Published => "published",
            VersionKind::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// One published or cancelled change, usable as a replay target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: Uuid,
    pub kind: VersionKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl VersionInfo {
    pub fn new(id: Uuid, kind: VersionKind, timestamp: DateTime<Utc>) -> Self {
        let description = match kind {
            VersionKind::Published => "Published".to_string(),
            VersionKind::Cancelled => "Cancelled".to_string(),
        };
        Self {
            id,
            kind,
            timestamp,
            description,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self.kind, VersionKind::Published)
    }
}
