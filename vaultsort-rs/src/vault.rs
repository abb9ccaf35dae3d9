//! Vault representation and file enumeration.

use crate::error::{Result, VaultError};
use crate::note::Note;
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};

/// Represents an Obsidian vault.
#[derive(Debug, Clone)]
pub struct Vault {
    /// Root path of the vault.
    pub root: PathBuf,
}

impl Vault {
    /// Open a vault rooted at an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.is_dir() {
            return Err(VaultError::VaultNotFound(root));
        }

        Ok(Self { root })
    }

    /// Get the full path to a note.
    pub fn note_path(&self, relative_path: &Path) -> PathBuf {
        self.root.join(relative_path)
    }

    /// Load a note from the vault.
    pub fn load_note(&self, relative_path: &Path) -> Result<Note> {
        Note::load(&self.root, relative_path)
    }

    /// Delete a note.
    pub fn delete_note(&self, relative_path: &Path) -> Result<()> {
        std::fs::remove_file(self.note_path(relative_path))?;
        Ok(())
    }

    /// List all markdown files in the vault, sorted.
    ///
    /// Hidden files and directories are skipped, as is anything under a
    /// top-level folder named in `excluded`.
    pub fn list_notes(&self, excluded: &[&str]) -> Result<Vec<PathBuf>> {
        let root = Pattern::escape(&self.root.to_string_lossy());
        let pattern = format!("{}/**/*.md", root.trim_end_matches('/'));

        let mut notes = Vec::new();

        for entry in glob(&pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };

            if !path.is_file() {
                continue;
            }

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };

            let hidden = relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
            let in_excluded = relative
                .components()
                .next()
                .is_some_and(|first| excluded.iter().any(|ex| first.as_os_str() == *ex));

            if !hidden && !in_excluded {
                notes.push(relative.to_path_buf());
            }
        }

        notes.sort();
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_vault() -> (TempDir, Vault) {
        let dir = TempDir::new().unwrap();
        let vault = Vault::new(dir.path()).unwrap();
        (dir, vault)
    }

    fn touch(vault: &Vault, rel: &str) {
        Note::new(rel, "x").save(&vault.root).unwrap();
    }

    #[test]
    fn test_missing_vault() {
        let result = Vault::new("/definitely/not/a/vault");
        assert!(matches!(result, Err(VaultError::VaultNotFound(_))));
    }

    #[test]
    fn test_list_notes_recursive_and_sorted() {
        let (_dir, vault) = setup_test_vault();
        touch(&vault, "b.md");
        touch(&vault, "a.md");
        touch(&vault, "sub/c.md");
        std::fs::write(vault.root.join("image.png"), "png").unwrap();

        let notes = vault.list_notes(&[]).unwrap();
        assert_eq!(
            notes,
            vec![
                PathBuf::from("a.md"),
                PathBuf::from("b.md"),
                PathBuf::from("sub/c.md"),
            ]
        );
    }

    #[test]
    fn test_list_notes_skips_hidden_and_excluded() {
        let (_dir, vault) = setup_test_vault();
        touch(&vault, "note.md");
        touch(&vault, ".obsidian/workspace.md");
        touch(&vault, "_indexes/_lore.md");
        touch(&vault, "Lore/_indexes/kept.md");

        let notes = vault.list_notes(&["_indexes"]).unwrap();
        assert_eq!(
            notes,
            vec![PathBuf::from("Lore/_indexes/kept.md"), PathBuf::from("note.md")]
        );
    }

    #[test]
    fn test_root_with_glob_metacharacters() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("vault [wiki]");
        std::fs::create_dir_all(&root).unwrap();
        let vault = Vault::new(&root).unwrap();
        touch(&vault, "Note.md");

        assert_eq!(vault.list_notes(&[]).unwrap(), vec![PathBuf::from("Note.md")]);
    }

    #[test]
    fn test_delete_note() {
        let (_dir, vault) = setup_test_vault();
        touch(&vault, "gone.md");
        vault.delete_note(Path::new("gone.md")).unwrap();
        assert!(!vault.note_path(Path::new("gone.md")).exists());
    }
}
