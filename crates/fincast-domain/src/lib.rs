//! fincast-domain
//!
//! Pure domain models for the change-request event log (events, periods,
//! month buckets, versions). No I/O, no storage. Only data types and the
//! calendar helpers they need.

pub mod event;
pub mod finances;
pub mod month;
pub mod version;

pub use event::*;
pub use finances::*;
pub use month::*;
pub use version::*;
