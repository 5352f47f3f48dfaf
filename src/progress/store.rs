//! Completion records and their persistence
//!
//! The progress store is the single source of truth for "is class N of topic
//! T in subject S complete, and when". Presence of an entry means completed;
//! absence means pending. Entries are created on mark, removed on unmark, and
//! never expire.

use std::collections::{BTreeMap, HashMap, btree_map};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Map of 1-based class index to RFC 3339 completion timestamp
pub type ClassRecords = BTreeMap<u32, String>;

/// All completion records, keyed subject → topic → class index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressStore {
    subjects: HashMap<String, HashMap<String, ClassRecords>>,
}

impl ProgressStore {
    /// Load the store from disk, or start empty if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read progress from {:?}", path))?;
            let data: Value = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {:?}", path))?;
            Ok(Self::restore(&data))
        } else {
            Ok(Self::default())
        }
    }

    /// Save the store to disk, rewriting the whole blob
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(&self.snapshot())
            .with_context(|| "Failed to serialize progress")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write progress to {:?}", path))?;

        Ok(())
    }

    /// Record a completion. Returns false if the class was already complete.
    pub fn mark(
        &mut self,
        subject: &str,
        topic: &str,
        index: u32,
        timestamp: impl Into<String>,
    ) -> bool {
        let records = self
            .subjects
            .entry(subject.to_string())
            .or_default()
            .entry(topic.to_string())
            .or_default();

        match records.entry(index) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(timestamp.into());
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Remove a completion, returning its timestamp if one was present
    pub fn unmark(&mut self, subject: &str, topic: &str, index: u32) -> Option<String> {
        let topics = self.subjects.get_mut(subject)?;
        let records = topics.get_mut(topic)?;
        let removed = records.remove(&index);

        // Prune empty maps so the persisted blob stays tidy
        if removed.is_some() {
            if records.is_empty() {
                topics.remove(topic);
            }
            if topics.is_empty() {
                self.subjects.remove(subject);
            }
        }

        removed
    }

    /// Completion timestamp for a class, if recorded
    pub fn record(&self, subject: &str, topic: &str, index: u32) -> Option<&str> {
        self.records(subject, topic)?.get(&index).map(String::as_str)
    }

    /// All records for a topic, if any exist
    pub fn records(&self, subject: &str, topic: &str) -> Option<&ClassRecords> {
        self.subjects.get(subject)?.get(topic)
    }

    /// Count of completed classes with a valid index
    ///
    /// Only indices in `1..=class_count` count; stale entries left behind by
    /// a shrunken catalog are ignored rather than silently inflating totals.
    pub fn completion_count(&self, subject: &str, topic: &str, class_count: u32) -> u32 {
        self.records(subject, topic)
            .map(|r| r.keys().filter(|&&i| (1..=class_count).contains(&i)).count() as u32)
            .unwrap_or(0)
    }

    /// Whether every class of a topic is complete
    pub fn is_topic_complete(&self, subject: &str, topic: &str, class_count: u32) -> bool {
        self.completion_count(subject, topic, class_count) == class_count
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.subjects.clear();
    }

    /// Serialize to the persisted shape: `{subject: {topic: {"<index>": "<timestamp>"}}}`
    pub fn snapshot(&self) -> Value {
        let mut root = serde_json::Map::new();
        for (subject, topics) in &self.subjects {
            let mut topics_obj = serde_json::Map::new();
            for (topic, records) in topics {
                let classes: serde_json::Map<String, Value> = records
                    .iter()
                    .map(|(index, ts)| (index.to_string(), Value::String(ts.clone())))
                    .collect();
                topics_obj.insert(topic.clone(), Value::Object(classes));
            }
            root.insert(subject.clone(), Value::Object(topics_obj));
        }
        Value::Object(root)
    }

    /// Rebuild a store from persisted data
    ///
    /// Lenient by design: unknown or malformed entries (non-numeric index
    /// keys, non-string timestamps, wrong nesting) are skipped, never an
    /// error. A damaged blob costs individual records, not the session.
    pub fn restore(data: &Value) -> Self {
        let mut store = Self::default();
        let Some(root) = data.as_object() else {
            return store;
        };

        for (subject, topics) in root {
            let Some(topics) = topics.as_object() else {
                continue;
            };
            for (topic, classes) in topics {
                let Some(classes) = classes.as_object() else {
                    continue;
                };
                for (index, timestamp) in classes {
                    let (Ok(index), Some(ts)) = (index.parse::<u32>(), timestamp.as_str()) else {
                        continue;
                    };
                    store.mark(subject, topic, index, ts);
                }
            }
        }

        store
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn mark_then_unmark_round_trips() {
        let mut store = ProgressStore::default();
        assert!(store.mark("Reasoning", "Ranking", 1, "2026-03-05T10:00:00+05:30"));
        assert_eq!(store.record("Reasoning", "Ranking", 1), Some("2026-03-05T10:00:00+05:30"));

        let removed = store.unmark("Reasoning", "Ranking", 1);
        assert_eq!(removed.as_deref(), Some("2026-03-05T10:00:00+05:30"));
        assert_eq!(store.record("Reasoning", "Ranking", 1), None);
    }

    #[test]
    fn double_mark_is_rejected_and_keeps_first_timestamp() {
        let mut store = ProgressStore::default();
        assert!(store.mark("S", "T", 2, "first"));
        assert!(!store.mark("S", "T", 2, "second"));
        assert_eq!(store.record("S", "T", 2), Some("first"));
    }

    #[test]
    fn unmark_of_absent_entry_is_none() {
        let mut store = ProgressStore::default();
        assert_eq!(store.unmark("S", "T", 1), None);
    }

    #[test]
    fn completion_count_ignores_stale_indices() {
        let mut store = ProgressStore::default();
        store.mark("S", "T", 1, "a");
        store.mark("S", "T", 2, "b");
        // Left behind by a catalog that used to have 7 classes
        store.mark("S", "T", 7, "c");

        assert_eq!(store.completion_count("S", "T", 2), 2);
        assert!(store.is_topic_complete("S", "T", 2));
        assert!(!store.is_topic_complete("S", "T", 3));
    }

    #[test]
    fn snapshot_restore_is_equivalent() {
        let mut store = ProgressStore::default();
        store.mark("Reasoning", "Ranking", 1, "2026-03-05T10:00:00+05:30");
        store.mark("Mathematics", "Algebra", 3, "2026-03-06T09:00:00+05:30");
        store.mark("Mathematics", "Algebra", 4, "2026-03-06T09:30:00+05:30");

        let restored = ProgressStore::restore(&store.snapshot());
        assert_eq!(restored, store);
    }

    #[test]
    fn snapshot_uses_string_index_keys() {
        let mut store = ProgressStore::default();
        store.mark("S", "T", 12, "ts");

        let snapshot = store.snapshot();
        assert_eq!(snapshot, json!({ "S": { "T": { "12": "ts" } } }));
    }

    #[test]
    fn restore_skips_malformed_entries() {
        let data = json!({
            "Good": { "Topic": { "1": "ts", "not-a-number": "ts", "2": 42 } },
            "BadTopic": { "Topic": "not-an-object" },
            "BadSubject": []
        });

        let store = ProgressStore::restore(&data);
        assert_eq!(store.record("Good", "Topic", 1), Some("ts"));
        assert_eq!(store.completion_count("Good", "Topic", 10), 1);
        assert_eq!(store.records("BadTopic", "Topic"), None);
        assert_eq!(store.records("BadSubject", "Topic"), None);
    }

    #[test]
    fn restore_of_non_object_is_empty() {
        assert_eq!(ProgressStore::restore(&json!(null)), ProgressStore::default());
        assert_eq!(ProgressStore::restore(&json!([1, 2])), ProgressStore::default());
    }

    #[test]
    fn unmark_prunes_empty_maps_from_snapshot() {
        let mut store = ProgressStore::default();
        store.mark("S", "T", 1, "ts");
        store.unmark("S", "T", 1);
        assert_eq!(store.snapshot(), json!({}));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress_v2.json");

        let mut store = ProgressStore::default();
        store.mark("S", "T", 1, "ts");
        store.save(&path).unwrap();

        let loaded = ProgressStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn load_of_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ProgressStore::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded, ProgressStore::default());
    }
}
