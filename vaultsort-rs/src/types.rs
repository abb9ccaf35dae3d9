//! Shared types for vaultsort.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tag metadata read from a note's frontmatter, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTags {
    /// Entries of the `tags` field, in file order.
    pub tags: Vec<String>,

    /// The `infobox` field, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infobox: Option<String>,
}

/// Normalized, consolidated and inherited tags of a note.
///
/// Backed by an ordered set so iteration is always lexicographic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedTags(BTreeSet<String>);

impl ResolvedTags {
    pub fn insert(&mut self, tag: String) -> bool {
        self.0.insert(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags as a sorted list, the form written back to frontmatter.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<String> for ResolvedTags {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What happened to a single note during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOutcome {
    /// Already in its destination folder.
    Unchanged,
    /// Moved to its destination folder.
    Moved,
    /// Destination occupied by another file; left in place.
    Collision,
    /// Deleted as a redirect or template page.
    Purged,
    /// A filesystem error prevented processing.
    Failed,
}

/// Per-note entry of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteReport {
    /// Path relative to the vault root before the run.
    pub path: String,

    pub outcome: NoteOutcome,

    /// Path relative to the vault root after the run (or the blocked target on collision).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Whether the frontmatter `tags` field was rewritten.
    #[serde(default)]
    pub retagged: bool,

    /// Frontmatter could not be parsed; the note was treated as untagged.
    #[serde(default)]
    pub parse_error: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NoteReport {
    pub fn new(path: impl Into<String>, outcome: NoteOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
            destination: None,
            tags: Vec::new(),
            retagged: false,
            parse_error: false,
            message: None,
        }
    }
}

/// Changes made to the index folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Index files created or rewritten, by tag.
    pub written: Vec<String>,
    /// Index files already up to date, by tag.
    pub unchanged: Vec<String>,
    /// Stale index files deleted, by file name.
    pub removed: Vec<String>,
}

/// Totals for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub scanned: usize,
    pub moved: usize,
    pub unchanged: usize,
    pub retagged: usize,
    pub collisions: usize,
    pub purged: usize,
    pub parse_errors: usize,
    pub failed: usize,
    pub indexes_written: usize,
    pub indexes_removed: usize,
}

/// Everything a run did (or would do, in dry-run mode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub summary: Summary,
    pub notes: Vec<NoteReport>,
    pub indexes: IndexReport,
}

impl RunReport {
    /// True when at least one note failed with a filesystem error.
    pub fn is_partial_failure(&self) -> bool {
        self.summary.failed > 0
    }

    /// Recompute the summary from the per-note entries and index report.
    pub fn tally(&mut self) {
        let mut summary = Summary {
            scanned: self.notes.len(),
            indexes_written: self.indexes.written.len(),
            indexes_removed: self.indexes.removed.len(),
            ..Summary::default()
        };

        for note in &self.notes {
            match note.outcome {
                NoteOutcome::Unchanged => summary.unchanged += 1,
                NoteOutcome::Moved => summary.moved += 1,
                NoteOutcome::Collision => summary.collisions += 1,
                NoteOutcome::Purged => summary.purged += 1,
                NoteOutcome::Failed => summary.failed += 1,
            }
            if note.retagged {
                summary.retagged += 1;
            }
            if note.parse_error {
                summary.parse_errors += 1;
            }
        }

        self.summary = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_tags_sorted_and_deduplicated() {
        let tags: ResolvedTags = ["b", "a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(tags.to_vec(), vec!["a", "b", "c"]);
        assert!(tags.contains("a"));
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_tally() {
        let mut moved = NoteReport::new("a.md", NoteOutcome::Moved);
        moved.retagged = true;
        let mut report = RunReport {
            notes: vec![
                moved,
                NoteReport::new("b.md", NoteOutcome::Failed),
                NoteReport::new("c.md", NoteOutcome::Purged),
            ],
            indexes: IndexReport {
                written: vec!["x".into()],
                ..IndexReport::default()
            },
            ..RunReport::default()
        };
        report.tally();

        assert_eq!(report.summary.scanned, 3);
        assert_eq!(report.summary.moved, 1);
        assert_eq!(report.summary.retagged, 1);
        assert_eq!(report.summary.purged, 1);
        assert_eq!(report.summary.indexes_written, 1);
        assert!(report.is_partial_failure());
    }

    #[test]
    fn test_note_report_serialization_skips_empty_fields() {
        let report = NoteReport::new("a.md", NoteOutcome::Unchanged);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "unchanged");
        assert!(json.get("destination").is_none());
        assert!(json.get("tags").is_none());
    }
}
