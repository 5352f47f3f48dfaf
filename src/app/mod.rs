//! The tracker facade
//!
//! Owns the catalog, the progress store, the session metadata, the selection
//! state, and the edit gate, and exposes the command/query surface a renderer
//! consumes. Commands return a result describing what happened; queries are
//! side-effect-free. The core never knows how (or whether) it is rendered.
//!
//! Mutations are synchronous and serialized: each command runs to completion,
//! including its write-through persistence, before control returns. A failed
//! storage write is surfaced as a non-fatal warning on the returned change,
//! never as an error; in-memory state stays correct for the session.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};

use crate::catalog::{Catalog, Subject, Topic, TopicRef};
use crate::error::TrackerError;
use crate::gate::{EditGate, GateState};
use crate::nav::Selection;
use crate::progress::{ProgressStore, SessionMeta};
use crate::stats::{self, GlobalStats, SubjectStats, TopicStats};

/// File name of the completion-map blob, versioned by name
const PROGRESS_FILE: &str = "progress_v2.json";
/// File name of the metadata blob, versioned by name
const META_FILE: &str = "meta_v1.json";

/// Outcome of a progress mutation that was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    /// Resolved location the change applies to
    pub location: TopicRef,
    /// The 1-based class index touched
    pub class_index: u32,
    /// Completion state of the class after the command
    pub completed: bool,
    /// False when the requested state already held (no-op success)
    pub changed: bool,
    /// Set when write-through persistence failed. The session keeps working
    /// from memory; the next successful mutation rewrites the full snapshot.
    pub persist_warning: Option<String>,
}

/// Outcome of a jump to the next incomplete topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpOutcome {
    /// Selection moved to the first topic with pending classes
    Moved(TopicRef),
    /// Every topic in the catalog is fully completed
    AllDone,
}

/// The application core: state, mutation policy, and persistence
pub struct Tracker {
    catalog: Catalog,
    store: ProgressStore,
    meta: SessionMeta,
    selection: Selection,
    gate: EditGate,
    data_dir: PathBuf,
}

impl Tracker {
    /// Open a tracker over the given catalog, loading persisted state from
    /// `data_dir`
    pub fn open(
        catalog: Catalog,
        admin_secret: impl Into<String>,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let data_dir = data_dir.into();
        let store = ProgressStore::load(&data_dir.join(PROGRESS_FILE))?;
        let meta = SessionMeta::load(&data_dir.join(META_FILE))?;
        let selection = Selection::new(&catalog);

        Ok(Self { catalog, store, meta, selection, gate: EditGate::new(admin_secret), data_dir })
    }

    /// The catalog this tracker operates over
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current navigation state
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // ---- Progress commands ----------------------------------------------

    /// Set the completion state of one class
    ///
    /// Marking is always permitted; unmarking an already-completed class
    /// requires the gate to be in editing state and fails with `Locked`
    /// otherwise. Requesting the state that already holds is a no-op success
    /// and never double-counts.
    pub fn set_class_state(
        &mut self,
        subject: &str,
        topic: &str,
        class_index: u32,
        completed: bool,
    ) -> Result<AppliedChange, TrackerError> {
        let location = self.resolve_class(subject, topic, class_index)?;

        let changed = if completed {
            let now = Local::now();
            let marked = self.store.mark(subject, topic, class_index, now.to_rfc3339());
            if marked {
                self.meta.record_completion(location.clone(), now.date_naive());
            }
            marked
        } else {
            if self.store.record(subject, topic, class_index).is_some() && !self.gate.can_revert()
            {
                return Err(TrackerError::Locked);
            }
            match self.store.unmark(subject, topic, class_index) {
                Some(timestamp) => {
                    self.meta
                        .revert_completion(parse_completion_day(&timestamp), Local::now().date_naive());
                    true
                }
                None => false,
            }
        };

        let persist_warning = if changed {
            tracing::debug!(subject, topic, class_index, completed, "class state changed");
            self.persist()
        } else {
            None
        };

        Ok(AppliedChange { location, class_index, completed, changed, persist_warning })
    }

    /// Clear all progress and session metadata; irreversible
    ///
    /// Requires the gate to be unlocked. Returns a persistence warning if the
    /// cleared state could not be written out.
    pub fn reset(&mut self) -> Result<Option<String>, TrackerError> {
        if !self.gate.is_unlocked() {
            return Err(TrackerError::NotUnlocked);
        }

        self.store.clear();
        self.meta.clear();
        tracing::info!("progress and session metadata reset");
        Ok(self.persist())
    }

    // ---- Progress queries ------------------------------------------------

    /// Completed classes (valid indices only) for a topic
    pub fn completion_count(&self, subject: &str, topic: &str) -> Result<u32, TrackerError> {
        let (_, entry) = self.resolve_topic(subject, topic)?;
        Ok(self.store.completion_count(subject, topic, entry.class_count))
    }

    /// Whether every class of a topic is complete
    pub fn is_topic_complete(&self, subject: &str, topic: &str) -> Result<bool, TrackerError> {
        let (_, entry) = self.resolve_topic(subject, topic)?;
        Ok(self.store.is_topic_complete(subject, topic, entry.class_count))
    }

    /// Display-formatted completion date of a class, if completed
    pub fn completion_date(
        &self,
        subject: &str,
        topic: &str,
        class_index: u32,
    ) -> Result<Option<String>, TrackerError> {
        self.resolve_class(subject, topic, class_index)?;
        Ok(self.store.record(subject, topic, class_index).map(display_date))
    }

    // ---- Stats queries ---------------------------------------------------

    /// Completion figures for a topic
    pub fn topic_stats(&self, subject: &str, topic: &str) -> Result<TopicStats, TrackerError> {
        let (subj, entry) = self.resolve_topic(subject, topic)?;
        Ok(stats::topic_stats(&self.store, subj, entry))
    }

    /// Completion figures for a subject, flattening subdivisions
    pub fn subject_stats(&self, subject: &str) -> Result<SubjectStats, TrackerError> {
        let subj = self
            .catalog
            .subject(subject)
            .ok_or_else(|| TrackerError::UnknownSubject(subject.to_string()))?;
        Ok(stats::subject_stats(&self.store, subj))
    }

    /// Completion figures over the whole catalog
    pub fn global_stats(&self) -> GlobalStats {
        stats::global_stats(&self.store, &self.catalog)
    }

    /// Completions recorded on the given local calendar day
    pub fn daily_count(&self, date: NaiveDate) -> u32 {
        stats::daily_count(&self.meta, date)
    }

    /// Completions recorded today
    pub fn today_count(&self) -> u32 {
        self.daily_count(Local::now().date_naive())
    }

    /// Where the most recent completion was recorded
    pub fn last_studied(&self) -> Option<&TopicRef> {
        self.meta.last_studied.as_ref()
    }

    /// First topic with pending classes, in declared catalog order
    pub fn find_next_incomplete(&self) -> Option<TopicRef> {
        stats::find_next_incomplete(&self.store, &self.catalog)
    }

    // ---- Navigation commands ---------------------------------------------

    /// Switch the view to another subject
    pub fn select_subject(&mut self, name: &str) -> Result<(), TrackerError> {
        self.selection.select_subject(&self.catalog, name)
    }

    /// Switch the view to another subdivision of the current subject
    pub fn select_subdivision(&mut self, name: &str) -> Result<(), TrackerError> {
        self.selection.select_subdivision(&self.catalog, name)
    }

    /// Open a topic of the current subject in detail view
    pub fn open_topic(&mut self, name: &str) -> Result<(), TrackerError> {
        self.selection.open_topic(&self.catalog, name)
    }

    /// Close the detail view
    pub fn close_topic(&mut self) {
        self.selection.close_topic();
    }

    /// Land the view on the next topic with pending classes
    ///
    /// `AllDone` is a success state of its own, not an error: it means there
    /// is nothing left to study.
    pub fn jump_to_next_incomplete(&mut self) -> Result<JumpOutcome, TrackerError> {
        let Some(target) = self.find_next_incomplete() else {
            return Ok(JumpOutcome::AllDone);
        };

        self.selection.select_subject(&self.catalog, &target.subject)?;
        if let Some(subdivision) = &target.subdivision {
            self.selection.select_subdivision(&self.catalog, subdivision)?;
        }
        self.selection.open_topic(&self.catalog, &target.topic)?;
        Ok(JumpOutcome::Moved(target))
    }

    // ---- Gate commands ---------------------------------------------------

    /// Compare the shared secret and unlock the gate on a match
    pub fn attempt_unlock(&mut self, secret: &str) -> Result<(), TrackerError> {
        self.gate.attempt_unlock(secret)
    }

    /// Toggle edit mode; returns the new editing state
    pub fn toggle_edit(&mut self) -> Result<bool, TrackerError> {
        self.gate.toggle_edit()
    }

    /// Drop the gate back to locked
    pub fn lock(&mut self) {
        self.gate.lock();
    }

    /// Current gate state
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    // ---- Internals -------------------------------------------------------

    fn resolve_topic(&self, subject: &str, topic: &str) -> Result<(&Subject, &Topic), TrackerError> {
        let subj = self
            .catalog
            .subject(subject)
            .ok_or_else(|| TrackerError::UnknownSubject(subject.to_string()))?;
        let entry =
            subj.topic(topic).ok_or_else(|| TrackerError::UnknownTopic(topic.to_string()))?;
        Ok((subj, entry))
    }

    fn resolve_class(
        &self,
        subject: &str,
        topic: &str,
        class_index: u32,
    ) -> Result<TopicRef, TrackerError> {
        let (subj, entry) = self.resolve_topic(subject, topic)?;
        if !(1..=entry.class_count).contains(&class_index) {
            return Err(TrackerError::InvalidClassIndex {
                topic: entry.name.clone(),
                index: class_index,
                class_count: entry.class_count,
            });
        }

        Ok(TopicRef {
            subject: subj.name.clone(),
            subdivision: subj.subdivision_of(topic).map(str::to_string),
            topic: entry.name.clone(),
        })
    }

    /// Write both blobs through to disk; returns a warning string on failure
    fn persist(&self) -> Option<String> {
        let result = self
            .store
            .save(&self.data_dir.join(PROGRESS_FILE))
            .and_then(|_| self.meta.save(&self.data_dir.join(META_FILE)));

        match result {
            Ok(()) => None,
            Err(e) => {
                let warning = format!("Progress not saved: {e:#}");
                tracing::warn!("{warning}");
                Some(warning)
            }
        }
    }
}

/// Format a stored RFC 3339 timestamp for display (e.g. "5 Mar 2026")
fn display_date(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(instant) => instant.format("%-d %b %Y").to_string(),
        // Pre-chrono records may carry arbitrary strings; show them as-is
        Err(_) => timestamp.to_string(),
    }
}

/// Local calendar day a stored timestamp falls on, if parseable
fn parse_completion_day(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|instant| instant.with_timezone(&Local).date_naive())
}
