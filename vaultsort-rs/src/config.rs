//! Configuration file loading.
//!
//! The config is a YAML or TOML document. Rule mappings are read into
//! [`OrderedMap`]s so that declaration order, which decides category
//! priority, is captured explicitly instead of depending on a hash map's
//! iteration order.

use crate::error::{Result, VaultError};
use crate::purge::PurgeSettings;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// File names looked up in the working directory when no `--config` is given.
pub const LOCAL_CONFIG_NAMES: &[&str] = &["vaultsort.yaml", "vaultsort.yml", "vaultsort.toml"];

pub const DEFAULT_FOLDER: &str = "9_Miscellaneous";
pub const DEFAULT_INDEX_FOLDER: &str = "_indexes";

/// A mapping that remembers the order its keys were declared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// A value written either as a single string or as a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn as_slice(&self) -> &[String] {
        match self {
            OneOrMany::One(s) => std::slice::from_ref(s),
            OneOrMany::Many(v) => v,
        }
    }
}

/// Raw configuration as written by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the vault. Relative paths resolve against the config file.
    pub vault_root: Option<PathBuf>,

    /// Folder for notes that match no category.
    #[serde(default = "default_folder")]
    pub default_folder: String,

    /// Folder holding the generated tag indexes.
    #[serde(default = "default_index_folder")]
    pub index_folder: String,

    /// Top-level tag -> destination folder, in priority order.
    #[serde(default)]
    pub category_rules: OrderedMap<String>,

    /// Top-level tag -> subcategory group -> leaf tags.
    #[serde(default)]
    pub subcategory_rules: OrderedMap<OrderedMap<OneOrMany>>,

    /// Replacement tag -> original tags it replaces.
    #[serde(default)]
    pub tag_consolidation: OrderedMap<OneOrMany>,

    /// `infobox` frontmatter value -> category tag.
    #[serde(default)]
    pub infobox_rules: OrderedMap<String>,

    /// Redirect/template detection.
    #[serde(default)]
    pub purge: PurgeSettings,

    /// Directory the config was loaded from, used to resolve `vault_root`.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

fn default_index_folder() -> String {
    DEFAULT_INDEX_FOLDER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_root: None,
            default_folder: default_folder(),
            index_folder: default_index_folder(),
            category_rules: OrderedMap::default(),
            subcategory_rules: OrderedMap::default(),
            tag_consolidation: OrderedMap::default(),
            infobox_rules: OrderedMap::default(),
            purge: PurgeSettings::default(),
            base_dir: None,
        }
    }
}

impl Config {
    /// Parse a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a config file; `.toml` files are read as TOML, anything else as YAML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(VaultError::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let mut config = if is_toml {
            Self::from_toml_str(&content)?
        } else {
            Self::from_yaml_str(&content).map_err(|e| {
                VaultError::config(format!("{}: {}", path.display(), e))
            })?
        };

        config.base_dir = path.parent().map(Path::to_path_buf);
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Locate and load the config.
    ///
    /// An explicit path wins. Otherwise the working directory is searched for
    /// one of [`LOCAL_CONFIG_NAMES`], then `<config_dir>/vaultsort/config.yaml`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        for name in LOCAL_CONFIG_NAMES {
            let candidate = PathBuf::from(name);
            if candidate.is_file() {
                return Self::load_from(&candidate);
            }
        }

        if let Some(dir) = dirs::config_dir() {
            for name in ["config.yaml", "config.toml"] {
                let candidate = dir.join("vaultsort").join(name);
                if candidate.is_file() {
                    return Self::load_from(&candidate);
                }
            }
        }

        Err(VaultError::NoConfig)
    }

    /// Resolve the vault root, preferring the CLI override.
    pub fn resolve_vault_root(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }

        let root = self
            .vault_root
            .as_ref()
            .ok_or_else(|| VaultError::config("vault_root is not set and no --vault was given"))?;

        if root.is_absolute() {
            return Ok(root.clone());
        }

        Ok(match &self.base_dir {
            Some(base) => base.join(root),
            None => root.clone(),
        })
    }
}
