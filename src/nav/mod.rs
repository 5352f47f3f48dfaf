//! Navigation and selection state
//!
//! Tracks which subject and subdivision are in view and which topic (if any)
//! is open in detail. Transient only: none of this is persisted, and it is
//! independent of the progress store.

use crate::catalog::{Catalog, Topic};
use crate::error::TrackerError;

/// Current position in the catalog
///
/// Invariant: when the current subject has subdivisions, `current_subdivision`
/// names one of them; otherwise it is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Subject in view
    pub current_subject: String,
    /// Subdivision in view, if the subject has any
    pub current_subdivision: Option<String>,
    /// Topic open in detail view, if any
    pub active_topic: Option<String>,
}

impl Selection {
    /// Start at the catalog's first subject
    pub fn new(catalog: &Catalog) -> Self {
        let first = &catalog.subjects()[0];
        Self {
            current_subject: first.name.clone(),
            current_subdivision: first.first_subdivision().map(str::to_string),
            active_topic: None,
        }
    }

    /// Switch to another subject
    ///
    /// Resets the subdivision to the subject's first (or `None` for flat
    /// subjects) and closes any open topic.
    pub fn select_subject(&mut self, catalog: &Catalog, name: &str) -> Result<(), TrackerError> {
        let subject = catalog
            .subject(name)
            .ok_or_else(|| TrackerError::UnknownSubject(name.to_string()))?;

        self.current_subject = subject.name.clone();
        self.current_subdivision = subject.first_subdivision().map(str::to_string);
        self.active_topic = None;
        Ok(())
    }

    /// Switch to another subdivision of the current subject
    pub fn select_subdivision(&mut self, catalog: &Catalog, name: &str) -> Result<(), TrackerError> {
        let subject = catalog
            .subject(&self.current_subject)
            .ok_or_else(|| TrackerError::UnknownSubject(self.current_subject.clone()))?;

        if subject.subdivision(name).is_none() {
            return Err(TrackerError::UnknownSubdivision(name.to_string()));
        }

        self.current_subdivision = Some(name.to_string());
        self.active_topic = None;
        Ok(())
    }

    /// Open a topic of the current subject in detail view
    ///
    /// The lookup spans the whole subject; when the topic lives in another
    /// subdivision the view follows it there.
    pub fn open_topic(&mut self, catalog: &Catalog, name: &str) -> Result<(), TrackerError> {
        let subject = catalog
            .subject(&self.current_subject)
            .ok_or_else(|| TrackerError::UnknownSubject(self.current_subject.clone()))?;

        if subject.topic(name).is_none() {
            return Err(TrackerError::UnknownTopic(name.to_string()));
        }

        if let Some(subdivision) = subject.subdivision_of(name) {
            self.current_subdivision = Some(subdivision.to_string());
        }
        self.active_topic = Some(name.to_string());
        Ok(())
    }

    /// Close the detail view
    pub fn close_topic(&mut self) {
        self.active_topic = None;
    }

    /// Topics currently in view: the current subdivision's, or the subject's
    /// own for flat subjects
    pub fn topics_in_view<'a>(&self, catalog: &'a Catalog) -> &'a [Topic] {
        let Some(subject) = catalog.subject(&self.current_subject) else {
            return &[];
        };
        match &self.current_subdivision {
            Some(name) => subject.subdivision(name).map(|s| s.topics.as_slice()).unwrap_or(&[]),
            None => match &subject.content {
                crate::catalog::SubjectContent::Topics(topics) => topics,
                crate::catalog::SubjectContent::Subdivisions(_) => &[],
            },
        }
    }
}
