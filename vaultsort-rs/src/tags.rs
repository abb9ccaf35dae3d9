//! Tag normalization and consolidation.
//!
//! Every tag that enters the engine, from note frontmatter or from the rule
//! configuration, goes through [`normalize_tag`] so that matching is
//! insensitive to casing, whitespace and the `#` prefix Obsidian uses for
//! inline tags.

use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a raw tag string.
///
/// NFC-composes, trims, strips leading `#`, lowercases and collapses every run
/// of whitespace or underscores into a single `_`. Hyphens and `/` (nested
/// tags) are kept, without separators on either side of a `/`. Returns `None`
/// when nothing is left.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let composed: String = raw.nfc().collect();
    let stripped = composed.trim().trim_start_matches('#');

    let mut out = String::with_capacity(stripped.len());
    let mut pending_separator = false;

    for c in stripped.chars() {
        if c.is_whitespace() || c == '_' {
            pending_separator = true;
            continue;
        }
        // no separator at either end of a nesting level
        if pending_separator && c != '/' && !out.is_empty() && !out.ends_with('/') {
            out.push('_');
        }
        pending_separator = false;
        out.extend(c.to_lowercase());
    }

    if out.is_empty() { None } else { Some(out) }
}

/// Many-to-one replacement of normalized tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Consolidation {
    /// original tag -> replacement tag, both normalized.
    replacements: HashMap<String, String>,
}

impl Consolidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `original` to be replaced by `replacement`.
    ///
    /// Returns the previously registered replacement when `original` was
    /// already claimed by a different one.
    pub fn insert(&mut self, original: String, replacement: String) -> Option<String> {
        match self.replacements.get(&original) {
            Some(existing) if *existing != replacement => Some(existing.clone()),
            _ => {
                self.replacements.insert(original, replacement);
                None
            }
        }
    }

    /// Whether `tag` is replaced by something else.
    pub fn is_original(&self, tag: &str) -> bool {
        self.replacements
            .get(tag)
            .is_some_and(|replacement| replacement != tag)
    }

    /// Apply the map to an already-normalized tag.
    pub fn apply<'a>(&'a self, tag: &'a str) -> &'a str {
        self.replacements.get(tag).map(String::as_str).unwrap_or(tag)
    }
}

/// Normalize then consolidate a raw tag.
pub fn canonical_tag(raw: &str, consolidation: &Consolidation) -> Option<String> {
    let normalized = normalize_tag(raw)?;
    Some(consolidation.apply(&normalized).to_string())
}
