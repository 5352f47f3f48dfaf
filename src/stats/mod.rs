//! Derived statistics
//!
//! Pure read-side computations over the catalog, the progress store, and the
//! session metadata. Nothing here is cached: every figure is recomputed from
//! the raw maps on demand, so it can never drift out of sync with them.

use chrono::NaiveDate;

use crate::catalog::{Catalog, Subject, Topic, TopicRef};
use crate::progress::{ProgressStore, SessionMeta};

/// Per-topic completion figures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicStats {
    /// Classes completed (valid indices only)
    pub completed: u32,
    /// Classes the topic has in total
    pub total: u32,
}

/// Per-subject completion figures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectStats {
    /// Topics with every class complete
    pub completed_topics: u32,
    /// Topics under the subject (flattening subdivisions)
    pub total_topics: u32,
    /// Classes completed across the subject
    pub completed_classes: u32,
    /// Classes across the subject in total
    pub total_classes: u32,
    /// `round(100 * completed_classes / total_classes)`, 0 when empty
    pub percent: u8,
}

/// Whole-catalog completion figures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalStats {
    /// Classes completed across every subject
    pub completed_classes: u32,
    /// Classes in the whole catalog
    pub total_classes: u32,
    /// `round(100 * completed_classes / total_classes)`, 0 when empty
    pub percent: u8,
}

/// Completion figures for a single topic
pub fn topic_stats(store: &ProgressStore, subject: &Subject, topic: &Topic) -> TopicStats {
    TopicStats {
        completed: store.completion_count(&subject.name, &topic.name, topic.class_count),
        total: topic.class_count,
    }
}

/// Completion figures for a subject, flattening subdivisions
pub fn subject_stats(store: &ProgressStore, subject: &Subject) -> SubjectStats {
    let mut stats = SubjectStats {
        completed_topics: 0,
        total_topics: 0,
        completed_classes: 0,
        total_classes: 0,
        percent: 0,
    };

    for topic in subject.topics() {
        let completed = store.completion_count(&subject.name, &topic.name, topic.class_count);
        stats.total_topics += 1;
        stats.total_classes += topic.class_count;
        stats.completed_classes += completed;
        if completed == topic.class_count {
            stats.completed_topics += 1;
        }
    }

    stats.percent = percent(stats.completed_classes, stats.total_classes);
    stats
}

/// Completion figures over the entire catalog
pub fn global_stats(store: &ProgressStore, catalog: &Catalog) -> GlobalStats {
    let mut completed_classes = 0;
    let mut total_classes = 0;

    for subject in catalog.subjects() {
        for topic in subject.topics() {
            total_classes += topic.class_count;
            completed_classes +=
                store.completion_count(&subject.name, &topic.name, topic.class_count);
        }
    }

    GlobalStats { completed_classes, total_classes, percent: percent(completed_classes, total_classes) }
}

/// Completions recorded on the given local calendar day
pub fn daily_count(meta: &SessionMeta, date: NaiveDate) -> u32 {
    meta.daily_count(date)
}

/// First topic with at least one pending class, scanning the catalog in
/// declared order
///
/// `None` means every topic in the catalog is fully completed. Callers treat
/// that as the terminal "all done" state, not as a failure.
pub fn find_next_incomplete(store: &ProgressStore, catalog: &Catalog) -> Option<TopicRef> {
    for subject in catalog.subjects() {
        for topic in subject.topics() {
            if !store.is_topic_complete(&subject.name, &topic.name, topic.class_count) {
                return Some(TopicRef {
                    subject: subject.name.clone(),
                    subdivision: subject.subdivision_of(&topic.name).map(str::to_string),
                    topic: topic.name.clone(),
                });
            }
        }
    }
    None
}

fn percent(completed: u32, total: u32) -> u8 {
    if total == 0 {
        0
    } else {
        ((f64::from(completed) / f64::from(total)) * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn catalog() -> Catalog {
        // Two subjects with 18 and 10 classes in total
        Catalog::from_json(
            r#"{
                "A": {
                    "icon": "a",
                    "subdivisions": [
                        {
                            "name": "First",
                            "topics": [
                                { "name": "One", "classes": 5 },
                                { "name": "Two", "classes": 4 }
                            ]
                        },
                        {
                            "name": "Second",
                            "topics": [ { "name": "Three", "classes": 9 } ]
                        }
                    ]
                },
                "B": {
                    "icon": "b",
                    "topics": [
                        { "name": "Four", "classes": 7 },
                        { "name": "Five", "classes": 3 }
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    fn complete_topic(store: &mut ProgressStore, subject: &str, topic: &str, classes: u32) {
        for index in 1..=classes {
            store.mark(subject, topic, index, "ts");
        }
    }

    #[test]
    fn empty_store_has_zero_percent_and_full_totals() {
        let catalog = catalog();
        let stats = global_stats(&ProgressStore::default(), &catalog);
        assert_eq!(
            stats,
            GlobalStats { completed_classes: 0, total_classes: 28, percent: 0 }
        );
    }

    #[test]
    fn topic_stats_counts_only_valid_indices() {
        let catalog = catalog();
        let subject = catalog.subject("B").unwrap();
        let topic = subject.topic("Five").unwrap();

        let mut store = ProgressStore::default();
        store.mark("B", "Five", 1, "ts");
        store.mark("B", "Five", 9, "stale");

        assert_eq!(topic_stats(&store, subject, topic), TopicStats { completed: 1, total: 3 });
    }

    #[test]
    fn subject_stats_flatten_subdivisions() {
        let catalog = catalog();
        let subject = catalog.subject("A").unwrap();

        let mut store = ProgressStore::default();
        complete_topic(&mut store, "A", "One", 5);
        store.mark("A", "Three", 1, "ts");

        let stats = subject_stats(&store, subject);
        assert_eq!(
            stats,
            SubjectStats {
                completed_topics: 1,
                total_topics: 3,
                completed_classes: 6,
                total_classes: 18,
                percent: 33,
            }
        );
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(28, 28), 100);
    }

    #[test]
    fn next_incomplete_scans_in_declared_order() {
        let catalog = catalog();
        let mut store = ProgressStore::default();

        assert_eq!(
            find_next_incomplete(&store, &catalog),
            Some(TopicRef {
                subject: "A".into(),
                subdivision: Some("First".into()),
                topic: "One".into(),
            })
        );

        // Complete all of subject A; the scan moves to B's first topic
        complete_topic(&mut store, "A", "One", 5);
        complete_topic(&mut store, "A", "Two", 4);
        complete_topic(&mut store, "A", "Three", 9);

        assert_eq!(
            find_next_incomplete(&store, &catalog),
            Some(TopicRef { subject: "B".into(), subdivision: None, topic: "Four".into() })
        );
    }

    #[test]
    fn next_incomplete_is_none_when_everything_is_done() {
        let catalog = catalog();
        let mut store = ProgressStore::default();
        complete_topic(&mut store, "A", "One", 5);
        complete_topic(&mut store, "A", "Two", 4);
        complete_topic(&mut store, "A", "Three", 9);
        complete_topic(&mut store, "B", "Four", 7);
        complete_topic(&mut store, "B", "Five", 3);

        assert_eq!(find_next_incomplete(&store, &catalog), None);
    }

    #[test]
    fn daily_count_defaults_to_zero() {
        let meta = SessionMeta::default();
        assert_eq!(daily_count(&meta, "2026-03-05".parse().unwrap()), 0);
    }
}
