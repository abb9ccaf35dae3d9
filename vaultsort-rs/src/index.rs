//! Per-tag index pages.
//!
//! The index folder is owned entirely by this module and rebuilt from
//! scratch on every run: one `_<tag>.md` page per tag in use, and nothing
//! else.

use crate::error::Result;
use crate::types::{IndexReport, ResolvedTags};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// A note listed on an index page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexedNote {
    pub title: String,
    /// Path relative to the vault root.
    pub path: PathBuf,
}

impl IndexedNote {
    pub fn from_path(path: &Path) -> Self {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        Self {
            title,
            path: path.to_path_buf(),
        }
    }

    /// Obsidian wikilink to the note, `[[dir/Note|Note]]`.
    pub fn wikilink(&self) -> String {
        let target = self.path.with_extension("");
        let target = target
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("[[{}|{}]]", target, self.title)
    }
}

/// Accumulates (note, tags) pairs during a walk.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    entries: BTreeMap<String, BTreeSet<IndexedNote>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a note under every one of its tags.
    pub fn record(&mut self, path: &Path, tags: &ResolvedTags) {
        for tag in tags.iter() {
            self.entries
                .entry(tag.to_string())
                .or_default()
                .insert(IndexedNote::from_path(path));
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Notes carrying `tag`, sorted by title then path.
    pub fn notes(&self, tag: &str) -> impl Iterator<Item = &IndexedNote> {
        self.entries.get(tag).into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Markdown content of the index page for `tag`.
    pub fn render(&self, tag: &str) -> String {
        let mut out = format!("# Index for `{}`\n\n", tag);
        for note in self.notes(tag) {
            out.push_str("- ");
            out.push_str(&note.wikilink());
            out.push('\n');
        }
        out
    }
}

/// File name of the index page for a tag.
///
/// Nested tags (`a/b`) are flattened with `__`. A normalized tag never holds
/// `__` nor a `_` next to `/`, so distinct tags get distinct names.
pub fn index_file_name(tag: &str) -> String {
    format!("_{}.md", tag.replace('/', "__"))
}

/// Writes a [`TagIndex`] into the index folder.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    dir: PathBuf,
    dry_run: bool,
}

impl IndexBuilder {
    pub fn new(vault_root: &Path, index_folder: &str, dry_run: bool) -> Self {
        Self {
            dir: vault_root.join(index_folder),
            dry_run,
        }
    }

    /// Write one page per tag and delete pages of tags no longer in use.
    pub fn build(&self, index: &TagIndex) -> Result<IndexReport> {
        let mut report = IndexReport::default();
        let mut current: BTreeSet<String> = BTreeSet::new();

        if !self.dry_run && !index.is_empty() {
            std::fs::create_dir_all(&self.dir)?;
        }

        for tag in index.tags() {
            let file_name = index_file_name(tag);
            let path = self.dir.join(&file_name);
            let content = index.render(tag);
            current.insert(file_name);

            let existing = std::fs::read_to_string(&path).ok();
            if existing.as_deref() == Some(content.as_str()) {
                report.unchanged.push(tag.to_string());
                continue;
            }

            log::info!("Writing index for '{}'", tag);
            if !self.dry_run {
                std::fs::write(&path, content)?;
            }
            report.written.push(tag.to_string());
        }

        for stale in self.stale_files(&current)? {
            log::info!("Removing stale index {}", stale);
            if !self.dry_run {
                std::fs::remove_file(self.dir.join(&stale))?;
            }
            report.removed.push(stale);
        }

        Ok(report)
    }

    /// Markdown files in the index folder that do not belong to a current tag.
    fn stale_files(&self, current: &BTreeSet<String>) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut stale = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(".md") && !current.contains(&name) {
                stale.push(name);
            }
        }
        stale.sort();
        Ok(stale)
    }
}
