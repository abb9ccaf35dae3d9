//! Moving notes into their destination folder and rewriting their tags.

use crate::error::{Result, VaultError};
use crate::note::Note;
use crate::types::ResolvedTags;
use std::path::{Path, PathBuf};

/// Where a note ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    /// Already in place.
    Unchanged,
    /// Moved to the contained path.
    Moved(PathBuf),
    /// The contained path is taken by another file; the note was not moved.
    Collision(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationOutcome {
    /// Path of the note relative to the vault root after relocation.
    pub path: PathBuf,
    pub relocation: Relocation,
    /// Whether the frontmatter `tags` field was (or would be) rewritten.
    pub retagged: bool,
}

/// Applies relocations inside a vault.
///
/// With `dry_run` set, every decision is made against the vault as it is on
/// disk but nothing is written.
#[derive(Debug, Clone)]
pub struct Relocator<'a> {
    vault_root: &'a Path,
    dry_run: bool,
}

impl<'a> Relocator<'a> {
    pub fn new(vault_root: &'a Path, dry_run: bool) -> Self {
        Self { vault_root, dry_run }
    }

    /// Rewrite `note`'s tags and move it into `destination_dir`.
    ///
    /// `tags` is `None` when the note's frontmatter could not be parsed, in
    /// which case its content is left alone. An occupied destination is never
    /// overwritten: the note stays where it is (with its tags still
    /// rewritten) and [`Relocation::Collision`] is returned.
    pub fn relocate(
        &self,
        note: &Note,
        tags: Option<&ResolvedTags>,
        destination_dir: &Path,
    ) -> Result<RelocationOutcome> {
        let target = destination_dir.join(note.file_name());

        let rewritten = match tags {
            Some(tags) => note.with_tags(&tags.to_vec())?,
            None => None,
        };
        let retagged = rewritten.is_some();

        if target == note.path {
            if let Some(ref updated) = rewritten {
                self.write(updated)?;
            }
            return Ok(RelocationOutcome {
                path: note.path.clone(),
                relocation: Relocation::Unchanged,
                retagged,
            });
        }

        let target_full = self.vault_root.join(&target);
        if target_full.exists() {
            log::warn!(
                "{}",
                VaultError::Collision {
                    note: note.path.clone(),
                    destination: target.clone(),
                }
            );
            if let Some(ref updated) = rewritten {
                self.write(updated)?;
            }
            return Ok(RelocationOutcome {
                path: note.path.clone(),
                relocation: Relocation::Collision(target),
                retagged,
            });
        }

        if let Some(ref updated) = rewritten {
            self.write(updated)?;
        }
        self.move_file(&note.path, &target)?;

        Ok(RelocationOutcome {
            path: target.clone(),
            relocation: Relocation::Moved(target),
            retagged,
        })
    }

    fn write(&self, note: &Note) -> Result<()> {
        log::debug!("Rewriting tags in {}", note.path.display());
        if self.dry_run {
            return Ok(());
        }
        note.save(self.vault_root)
    }

    fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        log::info!("Moving {} -> {}", from.display(), to.display());
        if self.dry_run {
            return Ok(());
        }

        let to_full = self.vault_root.join(to);
        if let Some(parent) = to_full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(self.vault_root.join(from), to_full)?;
        Ok(())
    }
}
