//! The vault walk: purge, resolve, relocate, then rebuild indexes.

use crate::config::Config;
use crate::destination::relative_destination;
use crate::error::{Result, VaultError};
use crate::index::{IndexBuilder, TagIndex};
use crate::purge::PurgeRules;
use crate::relocate::{Relocation, Relocator};
use crate::resolve::resolve;
use crate::rules::RuleSet;
use crate::types::{NoteOutcome, NoteReport, RawTags, RunReport};
use crate::vault::Vault;
use std::path::Path;

/// Drives one full organization pass over a vault.
#[derive(Debug)]
pub struct Organizer<'a> {
    vault: &'a Vault,
    rules: &'a RuleSet,
    purge: &'a PurgeRules,
    dry_run: bool,
}

impl<'a> Organizer<'a> {
    pub fn new(vault: &'a Vault, rules: &'a RuleSet, purge: &'a PurgeRules) -> Self {
        Self {
            vault,
            rules,
            purge,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every note, then rebuild the index folder.
    ///
    /// Per-note filesystem failures are recorded in the report and do not
    /// stop the walk. Errors from the index rebuild are returned.
    pub fn run(&self) -> Result<RunReport> {
        log::info!("Scanning vault: {}", self.vault.root.display());

        let paths = self.vault.list_notes(&[self.rules.index_folder.as_str()])?;
        let relocator = Relocator::new(&self.vault.root, self.dry_run);
        let mut index = TagIndex::new();
        let mut report = RunReport {
            dry_run: self.dry_run,
            ..RunReport::default()
        };

        for path in paths {
            let entry = match self.process(&path, &relocator, &mut index) {
                Ok(entry) => entry,
                Err(e) => {
                    log::error!("{}: {}", path.display(), e);
                    let mut entry = NoteReport::new(path.to_string_lossy(), NoteOutcome::Failed);
                    entry.message = Some(e.to_string());
                    entry
                }
            };
            report.notes.push(entry);
        }

        let builder = IndexBuilder::new(&self.vault.root, &self.rules.index_folder, self.dry_run);
        report.indexes = builder.build(&index)?;
        report.tally();

        log::info!(
            "Done: {} moved, {} unchanged, {} collisions, {} purged, {} failed",
            report.summary.moved,
            report.summary.unchanged,
            report.summary.collisions,
            report.summary.purged,
            report.summary.failed
        );
        Ok(report)
    }

    fn process(&self, path: &Path, relocator: &Relocator<'_>, index: &mut TagIndex) -> Result<NoteReport> {
        let display = path.to_string_lossy();
        let note = self.vault.load_note(path)?;

        if let Some(reason) = self.purge.classify(note.file_name(), &note.content) {
            log::info!("Deleting {} page {}", reason, display);
            if !self.dry_run {
                self.vault.delete_note(path)?;
            }
            let mut entry = NoteReport::new(display, NoteOutcome::Purged);
            entry.message = Some(reason.to_string());
            return Ok(entry);
        }

        let (raw, parse_error) = match note.raw_tags() {
            Ok(raw) => (raw, None),
            Err(e @ VaultError::InvalidFrontmatter { .. }) => {
                log::warn!("{}; treating the note as untagged", e);
                (RawTags::default(), Some(e.to_string()))
            }
            Err(e) => return Err(e),
        };

        let resolution = resolve(&raw, self.rules);
        let destination = relative_destination(resolution.selection.as_ref(), self.rules);
        let tags = parse_error.is_none().then_some(&resolution.tags);
        let outcome = match relocator.relocate(&note, tags, &destination) {
            Ok(outcome) => outcome,
            Err(e) => {
                // still on disk where it was
                index.record(&note.path, &resolution.tags);
                return Err(e);
            }
        };

        index.record(&outcome.path, &resolution.tags);

        let (kind, target) = match outcome.relocation {
            Relocation::Unchanged => (NoteOutcome::Unchanged, outcome.path),
            Relocation::Moved(to) => (NoteOutcome::Moved, to),
            Relocation::Collision(blocked) => (NoteOutcome::Collision, blocked),
        };

        let mut entry = NoteReport::new(display, kind);
        entry.destination = Some(target.to_string_lossy().to_string());
        entry.tags = resolution.tags.to_vec();
        entry.retagged = outcome.retagged;
        entry.parse_error = parse_error.is_some();
        entry.message = parse_error;
        Ok(entry)
    }
}

/// Load rules from `config` and organize the vault.
///
/// The rule set and purge predicate are validated before any file is
/// touched; configuration errors abort the run.
pub fn organize_vault(config: &Config, vault_override: Option<&Path>, dry_run: bool) -> Result<RunReport> {
    let rules = RuleSet::from_config(config)?;
    let purge = PurgeRules::from_settings(&config.purge)?;
    let vault = Vault::new(config.resolve_vault_root(vault_override)?)?;

    Organizer::new(&vault, &rules, &purge).dry_run(dry_run).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Note;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
default_folder: 9_Miscellaneous
category_rules:
  characters: 1_People
  locations: 2_Locations
  lore: 6_Lore
subcategory_rules:
  locations:
    wilderness: [forests, mountains]
tag_consolidation:
  locations: [place]
"#;

    fn setup(files: &[(&str, &str)]) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            Note::new(*rel, *content).save(dir.path()).unwrap();
        }
        let mut config = Config::from_yaml_str(CONFIG).unwrap();
        config.vault_root = Some(dir.path().to_path_buf());
        (dir, config)
    }

    fn read(dir: &TempDir, rel: &str) -> String {
        std::fs::read_to_string(dir.path().join(rel)).unwrap()
    }

    fn snapshot(dir: &TempDir) -> Vec<(PathBuf, String)> {
        let vault = Vault::new(dir.path()).unwrap();
        vault
            .list_notes(&[])
            .unwrap()
            .into_iter()
            .map(|p| {
                let content = std::fs::read_to_string(dir.path().join(&p)).unwrap();
                (p, content)
            })
            .collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let (dir, config) = setup(&[(
            "Greenwood.md",
            "---\ntags: [place, forests]\n---\nAn old forest.\n",
        )]);

        let report = organize_vault(&config, None, false).unwrap();
        assert_eq!(report.summary.moved, 1);
        assert_eq!(report.summary.retagged, 1);

        assert!(!dir.path().join("Greenwood.md").exists());
        assert_eq!(
            read(&dir, "2_Locations/Wilderness/Forests/Greenwood.md"),
            "---\ntags:\n- forests\n- locations\n---\nAn old forest.\n"
        );

        let link = "- [[2_Locations/Wilderness/Forests/Greenwood|Greenwood]]";
        assert!(read(&dir, "_indexes/_forests.md").contains(link));
        assert!(read(&dir, "_indexes/_locations.md").contains(link));
        assert!(!dir.path().join("_indexes/_place.md").exists());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let (dir, config) = setup(&[
            ("Greenwood.md", "---\ntags: [place, forests]\n---\nAn old forest.\n"),
            ("Aldric.md", "---\ntags: [Characters]\n---\nA knight.\n"),
            ("Scratch.md", "Loose thoughts.\n"),
        ]);

        organize_vault(&config, None, false).unwrap();
        let after_first = snapshot(&dir);

        let report = organize_vault(&config, None, false).unwrap();
        assert_eq!(report.summary.moved, 0);
        assert_eq!(report.summary.retagged, 0);
        assert_eq!(report.summary.unchanged, 3);
        assert!(report.indexes.written.is_empty());
        assert!(report.indexes.removed.is_empty());
        assert_eq!(snapshot(&dir), after_first);
    }

    #[test]
    fn test_default_folder_and_no_index() {
        let (dir, config) = setup(&[
            ("Scratch.md", "Loose thoughts.\n"),
            ("Recipe.md", "---\ntags: [cooking]\n---\n"),
        ]);

        organize_vault(&config, None, false).unwrap();
        assert!(dir.path().join("9_Miscellaneous/Scratch.md").exists());
        assert!(dir.path().join("9_Miscellaneous/Recipe.md").exists());
        assert_eq!(read(&dir, "9_Miscellaneous/Scratch.md"), "Loose thoughts.\n");

        // Untagged notes appear in no index; unmatched tags still get one.
        let cooking = read(&dir, "_indexes/_cooking.md");
        assert!(cooking.contains("Recipe"));
        assert!(!cooking.contains("Scratch"));
        let index_files: Vec<_> = std::fs::read_dir(dir.path().join("_indexes"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(index_files, vec!["_cooking.md"]);
    }

    #[test]
    fn test_stale_index_removed_after_retag() {
        let (dir, config) = setup(&[("Aldric.md", "---\ntags: [characters, lore]\n---\n")]);
        organize_vault(&config, None, false).unwrap();
        assert!(dir.path().join("_indexes/_lore.md").exists());

        std::fs::write(
            dir.path().join("1_People/Aldric.md"),
            "---\ntags: [characters]\n---\n",
        )
        .unwrap();
        let report = organize_vault(&config, None, false).unwrap();

        assert_eq!(report.indexes.removed, vec!["_lore.md"]);
        assert!(!dir.path().join("_indexes/_lore.md").exists());
        assert!(dir.path().join("_indexes/_characters.md").exists());
    }

    #[test]
    fn test_purged_notes_are_excluded() {
        let (dir, config) = setup(&[
            ("Old Greenwood.md", "---\ntags: [forests]\n---\n1.  REDIRECT [[Greenwood]]\n"),
            ("Template_Infobox.md", "---\ntags: [lore]\n---\n{{infobox}}\n"),
        ]);

        let report = organize_vault(&config, None, false).unwrap();
        assert_eq!(report.summary.purged, 2);
        assert!(!dir.path().join("Old Greenwood.md").exists());
        assert!(!dir.path().join("Template_Infobox.md").exists());
        assert!(!dir.path().join("_indexes/_forests.md").exists());
        assert!(!dir.path().join("_indexes/_lore.md").exists());
    }

    #[test]
    fn test_parse_error_routes_to_default() {
        let content = "---\ntags: [unclosed\n---\nBody\n";
        let (dir, config) = setup(&[("Broken.md", content)]);

        let report = organize_vault(&config, None, false).unwrap();
        assert_eq!(report.summary.parse_errors, 1);
        assert_eq!(report.notes[0].outcome, NoteOutcome::Moved);
        assert!(report.notes[0].message.is_some());
        assert_eq!(read(&dir, "9_Miscellaneous/Broken.md"), content);
    }

    #[test]
    fn test_collision_is_reported_not_fatal() {
        let (dir, config) = setup(&[
            ("1_People/Aldric.md", "---\ntags:\n- characters\n---\nThe real one.\n"),
            ("inbox/Aldric.md", "---\ntags: [characters]\n---\nA copy.\n"),
        ]);

        let report = organize_vault(&config, None, false).unwrap();
        assert_eq!(report.summary.collisions, 1);
        assert_eq!(read(&dir, "1_People/Aldric.md"), "---\ntags:\n- characters\n---\nThe real one.\n");
        assert!(dir.path().join("inbox/Aldric.md").exists());

        let index = read(&dir, "_indexes/_characters.md");
        assert!(index.contains("[[1_People/Aldric|Aldric]]"));
        assert!(index.contains("[[inbox/Aldric|Aldric]]"));
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let (dir, config) = setup(&[
            ("Greenwood.md", "---\ntags: [place, forests]\n---\n"),
            ("Old.md", "#REDIRECT [[Greenwood]]"),
        ]);
        let before = snapshot(&dir);

        let report = organize_vault(&config, None, true).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.summary.moved, 1);
        assert_eq!(report.summary.purged, 1);
        assert_eq!(report.indexes.written, vec!["forests", "locations"]);
        assert_eq!(snapshot(&dir), before);
        assert!(!dir.path().join("_indexes").exists());
    }

    #[test]
    fn test_filesystem_failure_is_per_note() {
        let (dir, config) = setup(&[
            ("Greenwood.md", "---\ntags: [forests]\n---\n"),
            ("Aldric.md", "---\ntags: [characters]\n---\n"),
        ]);
        // a plain file where the category folder should be
        std::fs::write(dir.path().join("2_Locations"), "not a folder").unwrap();

        let report = organize_vault(&config, None, false).unwrap();
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.moved, 1);
        assert!(report.is_partial_failure());

        let failed = report
            .notes
            .iter()
            .find(|n| n.outcome == NoteOutcome::Failed)
            .unwrap();
        assert_eq!(failed.path, "Greenwood.md");
        assert!(failed.message.is_some());

        assert!(dir.path().join("Greenwood.md").exists());
        assert!(dir.path().join("1_People/Aldric.md").exists());
        assert!(read(&dir, "_indexes/_forests.md").contains("[[Greenwood|Greenwood]]"));
    }

    #[test]
    fn test_nested_categories_settle_in_one_run() {
        let (dir, mut config) = setup(&[("Yule.md", "---\ntags: [festivals]\n---\n")]);
        let nested = Config::from_yaml_str(
            r#"
category_rules:
  lore: 6_Lore
  events: 7_Events
subcategory_rules:
  lore:
    happenings: [events]
  events:
    holidays: [festivals]
"#,
        )
        .unwrap();
        config.category_rules = nested.category_rules;
        config.subcategory_rules = nested.subcategory_rules;

        organize_vault(&config, None, false).unwrap();
        let path = "6_Lore/Happenings/Events/Yule.md";
        assert_eq!(read(&dir, path), "---\ntags:\n- events\n- festivals\n- lore\n---\n");
        let after_first = snapshot(&dir);

        let report = organize_vault(&config, None, false).unwrap();
        assert_eq!(report.summary.moved, 0);
        assert_eq!(report.summary.retagged, 0);
        assert_eq!(snapshot(&dir), after_first);
    }

    #[test]
    fn test_config_error_touches_nothing() {
        let (dir, mut config) = setup(&[("Greenwood.md", "---\ntags: [forests]\n---\n")]);
        config.subcategory_rules = Config::from_yaml_str("subcategory_rules:\n  items:\n    weapons: [swords]\n")
            .unwrap()
            .subcategory_rules;

        let result = organize_vault(&config, None, false);
        assert!(matches!(result, Err(VaultError::Config(_))));
        assert!(dir.path().join("Greenwood.md").exists());
        assert!(!dir.path().join("_indexes").exists());
    }
}
