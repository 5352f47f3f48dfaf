//! Persisted progress state
//!
//! Two independent records, versioned by file name so future schema changes
//! don't collide with old data: the completion map (`progress_v2.json`) and
//! the session metadata (`meta_v1.json`).

pub mod meta;
pub mod store;

pub use meta::SessionMeta;
pub use store::ProgressStore;
