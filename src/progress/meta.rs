//! Session metadata: last-studied marker and daily completion counts

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::TopicRef;

/// Persisted session metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Most recent location a completion was recorded on. Set on completion,
    /// left alone on unmark.
    #[serde(default)]
    pub last_studied: Option<TopicRef>,

    /// Completions per local calendar day, keyed by ISO date (`YYYY-MM-DD`)
    #[serde(default)]
    pub daily_stats: BTreeMap<String, u32>,
}

impl SessionMeta {
    /// Load metadata from disk, or start empty if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read metadata from {:?}", path))?;
            let data: Value = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {:?}", path))?;
            Ok(Self::restore(&data))
        } else {
            Ok(Self::default())
        }
    }

    /// Rebuild metadata from persisted data
    ///
    /// Lenient like the progress blob: a last-studied marker that isn't a
    /// valid location, or a daily bucket that isn't a non-negative integer,
    /// is skipped, never an error.
    pub fn restore(data: &Value) -> Self {
        let mut meta = Self::default();
        let Some(root) = data.as_object() else {
            return meta;
        };

        if let Some(value) = root.get("last_studied") {
            meta.last_studied = serde_json::from_value(value.clone()).ok();
        }

        if let Some(buckets) = root.get("daily_stats").and_then(Value::as_object) {
            for (day, count) in buckets {
                let Some(count) = count.as_u64().and_then(|c| u32::try_from(c).ok()) else {
                    continue;
                };
                meta.daily_stats.insert(day.clone(), count);
            }
        }

        meta
    }

    /// Save metadata to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize metadata")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write metadata to {:?}", path))?;

        Ok(())
    }

    /// Bookkeeping for a newly completed class
    pub fn record_completion(&mut self, location: TopicRef, today: NaiveDate) {
        self.last_studied = Some(location);
        *self.daily_stats.entry(iso_day(today)).or_insert(0) += 1;
    }

    /// Bookkeeping for an unmarked class
    ///
    /// Only today's bucket is ever decremented, and only when the reverted
    /// entry was completed today. Reverting a prior-day completion leaves
    /// every day's logged count untouched.
    pub fn revert_completion(&mut self, completed_on: Option<NaiveDate>, today: NaiveDate) {
        if completed_on == Some(today) {
            if let Some(count) = self.daily_stats.get_mut(&iso_day(today)) {
                *count = count.saturating_sub(1);
            }
        }
    }

    /// Completions recorded on the given day
    pub fn daily_count(&self, date: NaiveDate) -> u32 {
        self.daily_stats.get(&iso_day(date)).copied().unwrap_or(0)
    }

    /// Drop all metadata
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Format a date as the ISO day key used in `daily_stats`
pub fn iso_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn somewhere() -> TopicRef {
        TopicRef { subject: "Reasoning".into(), subdivision: None, topic: "Ranking".into() }
    }

    #[test]
    fn record_completion_sets_last_studied_and_bucket() {
        let mut meta = SessionMeta::default();
        meta.record_completion(somewhere(), day("2026-03-05"));
        meta.record_completion(somewhere(), day("2026-03-05"));

        assert_eq!(meta.last_studied, Some(somewhere()));
        assert_eq!(meta.daily_count(day("2026-03-05")), 2);
        assert_eq!(meta.daily_count(day("2026-03-04")), 0);
    }

    #[test]
    fn revert_of_today_entry_decrements_today() {
        let mut meta = SessionMeta::default();
        let today = day("2026-03-05");
        meta.record_completion(somewhere(), today);

        meta.revert_completion(Some(today), today);
        assert_eq!(meta.daily_count(today), 0);
    }

    #[test]
    fn revert_of_prior_day_entry_touches_nothing() {
        let mut meta = SessionMeta::default();
        let yesterday = day("2026-03-04");
        let today = day("2026-03-05");
        meta.record_completion(somewhere(), yesterday);
        meta.record_completion(somewhere(), today);

        meta.revert_completion(Some(yesterday), today);
        assert_eq!(meta.daily_count(yesterday), 1);
        assert_eq!(meta.daily_count(today), 1);
    }

    #[test]
    fn revert_never_goes_below_zero() {
        let mut meta = SessionMeta::default();
        let today = day("2026-03-05");
        meta.revert_completion(Some(today), today);
        assert_eq!(meta.daily_count(today), 0);
    }

    #[test]
    fn revert_without_known_date_is_a_noop() {
        let mut meta = SessionMeta::default();
        let today = day("2026-03-05");
        meta.record_completion(somewhere(), today);

        meta.revert_completion(None, today);
        assert_eq!(meta.daily_count(today), 1);
    }

    #[test]
    fn unmark_leaves_last_studied_alone() {
        let mut meta = SessionMeta::default();
        let today = day("2026-03-05");
        meta.record_completion(somewhere(), today);
        meta.revert_completion(Some(today), today);
        assert_eq!(meta.last_studied, Some(somewhere()));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta_v1.json");

        let mut meta = SessionMeta::default();
        meta.record_completion(somewhere(), day("2026-03-05"));
        meta.save(&path).unwrap();

        let loaded = SessionMeta::load(&path).unwrap();
        assert_eq!(loaded, meta);
    }

    #[test]
    fn load_of_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = SessionMeta::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded, SessionMeta::default());
    }

    #[test]
    fn restore_skips_malformed_entries() {
        let data = serde_json::json!({
            "last_studied": "not-a-location",
            "daily_stats": {
                "2026-03-05": "oops",
                "2026-03-06": 2,
                "2026-03-07": -4
            }
        });

        let meta = SessionMeta::restore(&data);
        assert_eq!(meta.last_studied, None);
        assert_eq!(meta.daily_count(day("2026-03-05")), 0);
        assert_eq!(meta.daily_count(day("2026-03-06")), 2);
        assert_eq!(meta.daily_count(day("2026-03-07")), 0);
    }

    #[test]
    fn restore_of_non_object_is_empty() {
        assert_eq!(SessionMeta::restore(&serde_json::json!(null)), SessionMeta::default());
        assert_eq!(SessionMeta::restore(&serde_json::json!([1])), SessionMeta::default());
    }

    #[test]
    fn load_keeps_good_entries_next_to_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta_v1.json");
        std::fs::write(
            &path,
            r#"{"daily_stats": {"2026-03-05": "oops", "2026-03-06": 2}}"#,
        )
        .unwrap();

        let loaded = SessionMeta::load(&path).unwrap();
        assert_eq!(loaded.daily_count(day("2026-03-05")), 0);
        assert_eq!(loaded.daily_count(day("2026-03-06")), 2);
        assert_eq!(loaded.last_studied, None);
    }
}
