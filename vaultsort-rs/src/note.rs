//! Note representation and frontmatter tag access.

use crate::error::{Result, VaultError};
use crate::parser;
use crate::types::RawTags;
use serde_yaml::{Mapping, Value as YamlValue};
use std::path::{Path, PathBuf};

const TAGS_KEY: &str = "tags";
const INFOBOX_KEY: &str = "infobox";

/// Represents a note in the vault.
#[derive(Debug, Clone)]
pub struct Note {
    /// Path relative to vault root (e.g., "2_Locations/Greenwood.md").
    pub path: PathBuf,

    /// Raw content of the note.
    pub content: String,
}

impl Note {
    /// Create a new note from path and content.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Load a note from disk.
    pub fn load(vault_root: &Path, relative_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(vault_root.join(relative_path))?;
        Ok(Self::new(relative_path, content))
    }

    /// Write the note to disk.
    pub fn save(&self, vault_root: &Path) -> Result<()> {
        let full_path = vault_root.join(&self.path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, &self.content)?;
        Ok(())
    }

    /// The file name including extension.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// Parse frontmatter as a YAML value.
    pub fn frontmatter(&self) -> Result<Option<YamlValue>> {
        parser::parse_frontmatter(&self.content, &self.path)
    }

    /// Read the `tags` and `infobox` fields.
    ///
    /// `tags` may be a list or a comma-separated string. Non-string entries
    /// are skipped. A frontmatter block that is not a mapping is an error.
    pub fn raw_tags(&self) -> Result<RawTags> {
        let map = match self.frontmatter()? {
            None | Some(YamlValue::Null) => return Ok(RawTags::default()),
            Some(YamlValue::Mapping(map)) => map,
            Some(_) => return Err(self.not_a_mapping()),
        };

        let tags = match map.get(TAGS_KEY) {
            Some(YamlValue::Sequence(seq)) => seq
                .iter()
                .filter_map(|item| match item {
                    YamlValue::String(s) => Some(s.clone()),
                    other => {
                        log::debug!("{}: ignoring non-string tag {:?}", self.path.display(), other);
                        None
                    }
                })
                .collect(),
            Some(YamlValue::String(s)) => s.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        };

        let infobox = map
            .get(INFOBOX_KEY)
            .and_then(YamlValue::as_str)
            .map(str::to_string);

        Ok(RawTags { tags, infobox })
    }

    /// Replace the frontmatter block.
    pub fn with_frontmatter(&self, new_frontmatter: &YamlValue) -> Result<Self> {
        let content = parser::update_frontmatter(&self.content, new_frontmatter)?;
        Ok(Self::new(self.path.clone(), content))
    }

    /// Set the `tags` field to `tags`, keeping every other key in place.
    ///
    /// Returns `None` when the stored field already equals `tags`, or when
    /// `tags` is empty and the note has no tags field to clear.
    pub fn with_tags(&self, tags: &[String]) -> Result<Option<Self>> {
        let mut map = match self.frontmatter()? {
            Some(YamlValue::Mapping(map)) => map,
            None | Some(YamlValue::Null) => Mapping::new(),
            Some(_) => return Err(self.not_a_mapping()),
        };

        let new_value = YamlValue::Sequence(tags.iter().cloned().map(YamlValue::String).collect());
        match map.get(TAGS_KEY) {
            Some(existing) if *existing == new_value => return Ok(None),
            None | Some(YamlValue::Null) if tags.is_empty() => return Ok(None),
            _ => {}
        }

        map.insert(YamlValue::String(TAGS_KEY.to_string()), new_value);
        self.with_frontmatter(&YamlValue::Mapping(map)).map(Some)
    }

    fn not_a_mapping(&self) -> VaultError {
        VaultError::InvalidFrontmatter {
            path: self.path.clone(),
            message: "frontmatter is not a mapping".to_string(),
        }
    }
}
