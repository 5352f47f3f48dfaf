//! Syllabus catalog model
//!
//! The catalog is the fixed, read-only taxonomy the tracker operates over:
//! subjects at the top, an optional subdivision layer below, and topics with a
//! fixed class count at the leaves. It is supplied once at startup (embedded
//! default or a JSON file) and never mutated.

use std::path::Path;

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A named unit of study containing a fixed number of classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Display name, unique within its subject
    pub name: String,
    /// Number of classes; valid indices are `1..=class_count`
    #[serde(rename = "classes")]
    pub class_count: u32,
}

/// An optional grouping layer between subject and topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subdivision {
    /// Display name, unique within its subject
    pub name: String,
    /// Topics within this subdivision, in declared order
    pub topics: Vec<Topic>,
}

/// What a subject contains: either a subdivision layer or bare topics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectContent {
    /// Subject is split into subdivisions, each holding topics
    Subdivisions(Vec<Subdivision>),
    /// Subject holds topics directly
    Topics(Vec<Topic>),
}

/// A top-level subject in the syllabus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Display name, unique in the catalog
    pub name: String,
    /// Display icon (emoji or similar), a pure rendering hint
    pub icon: String,
    /// Subdivisions or topics
    pub content: SubjectContent,
}

impl Subject {
    /// Whether this subject has a subdivision layer
    pub fn has_subdivisions(&self) -> bool {
        matches!(self.content, SubjectContent::Subdivisions(_))
    }

    /// Subdivisions in declared order (empty for flat subjects)
    pub fn subdivisions(&self) -> &[Subdivision] {
        match &self.content {
            SubjectContent::Subdivisions(subs) => subs,
            SubjectContent::Topics(_) => &[],
        }
    }

    /// Name of the first subdivision, if any
    pub fn first_subdivision(&self) -> Option<&str> {
        self.subdivisions().first().map(|s| s.name.as_str())
    }

    /// Find a subdivision by name
    pub fn subdivision(&self, name: &str) -> Option<&Subdivision> {
        self.subdivisions().iter().find(|s| s.name == name)
    }

    /// All topics under this subject in declared order, flattening subdivisions
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        let (subs, flat): (&[Subdivision], &[Topic]) = match &self.content {
            SubjectContent::Subdivisions(subs) => (subs, &[]),
            SubjectContent::Topics(topics) => (&[], topics),
        };
        subs.iter().flat_map(|s| s.topics.iter()).chain(flat.iter())
    }

    /// Find a topic anywhere under this subject
    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics().find(|t| t.name == name)
    }

    /// Name of the subdivision a topic lives in (None for flat subjects)
    pub fn subdivision_of(&self, topic_name: &str) -> Option<&str> {
        self.subdivisions()
            .iter()
            .find(|s| s.topics.iter().any(|t| t.name == topic_name))
            .map(|s| s.name.as_str())
    }
}

/// A resolved location in the catalog
///
/// Used both for the "last studied" marker and for next-incomplete scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
    /// Subject name
    pub subject: String,
    /// Subdivision name, if the subject has subdivisions
    pub subdivision: Option<String>,
    /// Topic name
    pub topic: String,
}

/// The complete syllabus: subjects in declared order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    subjects: Vec<Subject>,
}

/// On-disk shape of a subject entry: `{icon, subdivisions?|topics?}`
#[derive(Debug, Deserialize)]
struct SubjectFile {
    icon: String,
    #[serde(default)]
    subdivisions: Option<Vec<Subdivision>>,
    #[serde(default)]
    topics: Option<Vec<Topic>>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_json(include_str!("default_syllabus.json"))
        .expect("embedded default syllabus is valid")
});

impl Catalog {
    /// The syllabus shipped with the binary
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Parse a catalog from its JSON representation
    ///
    /// The input is an object mapping subject name to `{icon, subdivisions?|topics?}`;
    /// key order is the declared subject order.
    pub fn from_json(input: &str) -> Result<Self> {
        let root: serde_json::Value =
            serde_json::from_str(input).with_context(|| "Failed to parse catalog JSON")?;
        let map = root.as_object().context("Catalog root must be a JSON object")?;

        let mut subjects = Vec::with_capacity(map.len());
        for (name, value) in map {
            let entry: SubjectFile = serde_json::from_value(value.clone())
                .with_context(|| format!("Invalid catalog entry for subject '{name}'"))?;

            let content = match (entry.subdivisions, entry.topics) {
                (Some(subs), None) => SubjectContent::Subdivisions(subs),
                (None, Some(topics)) => SubjectContent::Topics(topics),
                _ => bail!("Subject '{name}' must have exactly one of 'subdivisions' or 'topics'"),
            };

            subjects.push(Subject { name: name.clone(), icon: entry.icon, content });
        }

        let catalog = Self { subjects };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {:?}", path))?;
        Self::from_json(&contents)
    }

    /// Check structural invariants: at least one subject, positive class
    /// counts, unambiguous topic names
    fn validate(&self) -> Result<()> {
        if self.subjects.is_empty() {
            bail!("Catalog has no subjects");
        }
        for subject in &self.subjects {
            let mut seen = std::collections::HashSet::new();
            for topic in subject.topics() {
                if topic.class_count == 0 {
                    bail!(
                        "Topic '{}' in subject '{}' must have at least one class",
                        topic.name,
                        subject.name
                    );
                }
                if !seen.insert(topic.name.as_str()) {
                    bail!(
                        "Topic '{}' appears more than once under subject '{}'",
                        topic.name,
                        subject.name
                    );
                }
            }
        }
        Ok(())
    }

    /// Subjects in declared order
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Find a subject by name
    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    /// Find a topic under a subject
    pub fn topic(&self, subject: &str, topic: &str) -> Option<&Topic> {
        self.subject(subject).and_then(|s| s.topic(topic))
    }

    /// Resolve a (subject, topic) pair to a full location
    pub fn resolve(&self, subject: &str, topic: &str) -> Option<TopicRef> {
        let subj = self.subject(subject)?;
        subj.topic(topic)?;
        Some(TopicRef {
            subject: subj.name.clone(),
            subdivision: subj.subdivision_of(topic).map(str::to_string),
            topic: topic.to_string(),
        })
    }

    /// Total class count across the whole catalog
    pub fn total_classes(&self) -> u32 {
        self.subjects.iter().flat_map(|s| s.topics()).map(|t| t.class_count).sum()
    }
}
