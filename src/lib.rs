//! Abhyas - a personal study-progress tracker for layered syllabi
//!
//! The core is a headless state library: a fixed syllabus catalog (subjects,
//! optional subdivisions, topics, class counts), a progress store of per-class
//! completions, pure derived statistics, transient navigation state, and an
//! edit-mode gate guarding undo. Any renderer consumes it through command and
//! query methods; the bundled CLI is one such consumer.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gate;
pub mod nav;
pub mod progress;
pub mod stats;

pub use app::{AppliedChange, JumpOutcome, Tracker};
pub use catalog::Catalog;
pub use config::Config;
pub use error::TrackerError;
