//! Error types for tracker operations

use thiserror::Error;

/// Errors that can occur when mutating or querying tracker state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Subject name does not exist in the catalog
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    /// Subdivision name does not exist under the current subject
    #[error("Unknown subdivision: {0}")]
    UnknownSubdivision(String),

    /// Topic name does not exist under the current subject
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    /// Class index is outside the topic's valid range
    #[error("Invalid class index {index} for topic '{topic}' ({class_count} classes)")]
    InvalidClassIndex {
        /// Topic the index was checked against
        topic: String,
        /// The rejected 1-based index
        index: u32,
        /// Number of classes the topic actually has
        class_count: u32,
    },

    /// Un-checking a completed class requires edit mode
    #[error("Edit mode is locked. Unlock and enable editing to revert completed classes")]
    Locked,

    /// Unlock attempt with the wrong secret
    #[error("Wrong secret")]
    WrongSecret,

    /// Operation requires the gate to be unlocked first
    #[error("Not unlocked")]
    NotUnlocked,
}

impl TrackerError {
    /// Check if this error is a gate/permission refusal rather than a lookup failure
    pub fn is_gate_refusal(&self) -> bool {
        matches!(
            self,
            TrackerError::Locked | TrackerError::WrongSecret | TrackerError::NotUnlocked
        )
    }
}
