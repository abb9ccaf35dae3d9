//! Destination folder derivation.

use crate::resolve::Selection;
use crate::rules::RuleSet;
use std::path::{Path, PathBuf};

/// Folder for a selection, relative to the vault root.
///
/// Category and default folders are used exactly as configured. Subcategory
/// segments are derived from tags and title-cased, so `fighting_pits`
/// becomes `Fighting Pits` no matter how the note spelled the tag.
pub fn relative_destination(selection: Option<&Selection>, rules: &RuleSet) -> PathBuf {
    let Some(selection) = selection else {
        return PathBuf::from(&rules.default_folder);
    };

    let mut path = PathBuf::from(&selection.folder);
    if let Some(ref sub) = selection.subcategory {
        path.push(folder_name(&sub.group));
        path.push(folder_name(&sub.leaf));
    }
    path
}

/// Absolute destination folder under `vault_root`.
pub fn build_destination(vault_root: &Path, selection: Option<&Selection>, rules: &RuleSet) -> PathBuf {
    vault_root.join(relative_destination(selection, rules))
}

/// Turn a normalized tag into a folder segment.
///
/// Underscores become spaces, words are capitalized, and characters that
/// would split or escape the path are replaced with `-`.
pub fn folder_name(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut capitalize = true;

    for c in tag.chars() {
        match c {
            '_' => {
                out.push(' ');
                capitalize = true;
            }
            '/' | '\\' | ':' | '-' => {
                out.push('-');
                capitalize = true;
            }
            c if capitalize => {
                out.extend(c.to_uppercase());
                capitalize = false;
            }
            c => out.push(c),
        }
    }

    match out.trim_matches('.') {
        "" => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}
