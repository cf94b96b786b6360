//! fincast-core
//!
//! The event-sourcing kernel: append-only event log, per-change aggregate,
//! projection engine, version index and view materialization. Depends on
//! fincast-domain. No terminal I/O, no concrete storage backend — durable
//! persistence is injected through the traits in [`store`].

pub mod aggregate;
pub mod commands;
pub mod error;
pub mod log;
pub mod materializer;
pub mod projection;
pub mod public_api;
pub mod store;
pub mod version_index;

pub use aggregate::ChangeAggregate;
pub use commands::*;
pub use error::CoreError;
pub use log::{EventLog, SubscriptionId};
pub use materializer::Materializer;
pub use projection::{reduce, ProjectionScope, ProjectionState};
pub use public_api::*;
pub use store::{EventStore, MemoryViewStore, ViewCollection, ViewStore};
pub use version_index::VersionIndex;
