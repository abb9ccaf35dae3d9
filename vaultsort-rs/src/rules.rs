//! Validated, immutable rule set.
//!
//! [`RuleSet::from_config`] normalizes every tag in the configuration and
//! rejects contradictory rules before any note is touched. The result is
//! passed by reference into the resolver and path builder.

use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::tags::{normalize_tag, Consolidation};
use std::collections::HashMap;
use std::path::{Component, Path};

/// A subcategory group within a category, with its leaf tags in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryGroup {
    pub name: String,
    pub leaves: Vec<String>,
}

/// A top-level category rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    /// Normalized top-level tag.
    pub tag: String,
    /// Destination folder relative to the vault root.
    pub folder: String,
    pub groups: Vec<SubcategoryGroup>,
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    pub default_folder: String,
    pub index_folder: String,
    /// Categories in priority (declaration) order.
    categories: Vec<CategoryRule>,
    consolidation: Consolidation,
    /// Normalized infobox value -> category tag.
    infobox: HashMap<String, String>,
    /// Leaf tag -> indices into `categories` of the categories declaring it.
    leaf_parents: HashMap<String, Vec<usize>>,
}

impl RuleSet {
    /// Build and validate the rule set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let index_folder = validate_folder("index_folder", &config.index_folder, None)?;
        let default_folder =
            validate_folder("default_folder", &config.default_folder, Some(index_folder.as_str()))?;

        let consolidation = build_consolidation(config)?;

        let mut categories: Vec<CategoryRule> = Vec::with_capacity(config.category_rules.len());
        for (raw_tag, folder) in config.category_rules.iter() {
            let tag = rule_tag("category_rules", raw_tag, &consolidation)?;
            if let Some(existing) = categories.iter().find(|c| c.tag == tag) {
                return Err(VaultError::config(format!(
                    "category_rules: '{}' and '{}' both normalize to '{}'",
                    existing.tag, raw_tag, tag
                )));
            }
            let folder = validate_folder(
                &format!("category_rules.{}", raw_tag),
                folder,
                Some(index_folder.as_str()),
            )?;
            categories.push(CategoryRule {
                tag,
                folder,
                groups: Vec::new(),
            });
        }

        let mut leaf_parents: HashMap<String, Vec<usize>> = HashMap::new();
        for (raw_category, groups) in config.subcategory_rules.iter() {
            let category_tag = rule_tag("subcategory_rules", raw_category, &consolidation)?;
            let idx = categories
                .iter()
                .position(|c| c.tag == category_tag)
                .ok_or_else(|| {
                    VaultError::config(format!(
                        "subcategory_rules references category '{}' which is not declared in category_rules",
                        raw_category
                    ))
                })?;
            if !categories[idx].groups.is_empty() {
                return Err(VaultError::config(format!(
                    "subcategory_rules: category '{}' declared twice",
                    raw_category
                )));
            }

            let mut parsed_groups: Vec<SubcategoryGroup> = Vec::new();
            for (raw_group, leaves) in groups.iter() {
                let name = normalize_tag(raw_group).ok_or_else(|| {
                    VaultError::config(format!(
                        "subcategory_rules.{}: empty subcategory name",
                        raw_category
                    ))
                })?;
                if parsed_groups.iter().any(|g| g.name == name) {
                    return Err(VaultError::config(format!(
                        "subcategory_rules.{}: subcategory '{}' declared twice",
                        raw_category, name
                    )));
                }

                let mut group = SubcategoryGroup {
                    name,
                    leaves: Vec::new(),
                };
                for raw_leaf in leaves.as_slice() {
                    let context = format!("subcategory_rules.{}.{}", raw_category, raw_group);
                    let leaf = rule_tag(&context, raw_leaf, &consolidation)?;
                    if group.leaves.contains(&leaf) {
                        continue;
                    }
                    if let Some(other) = parsed_groups.iter().find(|g| g.leaves.contains(&leaf)) {
                        return Err(VaultError::config(format!(
                            "subcategory_rules.{}: leaf tag '{}' is claimed by both '{}' and '{}'",
                            raw_category, leaf, other.name, group.name
                        )));
                    }
                    let parents = leaf_parents.entry(leaf.clone()).or_default();
                    if !parents.contains(&idx) {
                        parents.push(idx);
                    }
                    group.leaves.push(leaf);
                }
                parsed_groups.push(group);
            }
            categories[idx].groups.extend(parsed_groups);
        }

        for parents in leaf_parents.values_mut() {
            parents.sort_unstable();
        }

        let mut infobox = HashMap::new();
        for (raw_value, raw_target) in config.infobox_rules.iter() {
            let Some(value) = normalize_tag(raw_value) else {
                continue;
            };
            let target = rule_tag("infobox_rules", raw_target, &consolidation)?;
            if !categories.iter().any(|c| c.tag == target) {
                return Err(VaultError::config(format!(
                    "infobox_rules.{}: '{}' is not a category tag",
                    raw_value, raw_target
                )));
            }
            infobox.insert(value, target);
        }

        Ok(Self {
            default_folder,
            index_folder,
            categories,
            consolidation,
            infobox,
            leaf_parents,
        })
    }

    /// Categories in priority order.
    pub fn categories(&self) -> &[CategoryRule] {
        &self.categories
    }

    pub fn category(&self, tag: &str) -> Option<&CategoryRule> {
        self.categories.iter().find(|c| c.tag == tag)
    }

    pub fn consolidation(&self) -> &Consolidation {
        &self.consolidation
    }

    /// Category tags a leaf tag inherits, in priority order.
    pub fn parents_of(&self, leaf: &str) -> impl Iterator<Item = &str> {
        self.leaf_parents
            .get(leaf)
            .into_iter()
            .flatten()
            .map(|&idx| self.categories[idx].tag.as_str())
    }

    /// Category tag hinted by an `infobox` frontmatter value.
    pub fn infobox_category(&self, infobox: &str) -> Option<&str> {
        let key = normalize_tag(infobox)?;
        self.infobox.get(&key).map(String::as_str)
    }
}

fn build_consolidation(config: &Config) -> Result<Consolidation> {
    let mut consolidation = Consolidation::new();
    let mut replacements = Vec::new();

    for (raw_replacement, originals) in config.tag_consolidation.iter() {
        let replacement = normalize_tag(raw_replacement).ok_or_else(|| {
            VaultError::config("tag_consolidation: empty replacement tag")
        })?;
        for raw_original in originals.as_slice() {
            let Some(original) = normalize_tag(raw_original) else {
                continue;
            };
            if original == replacement {
                continue;
            }
            if let Some(existing) = consolidation.insert(original.clone(), replacement.clone()) {
                return Err(VaultError::config(format!(
                    "tag_consolidation: '{}' is replaced by both '{}' and '{}'",
                    original, existing, replacement
                )));
            }
        }
        replacements.push(replacement);
    }

    for replacement in &replacements {
        if consolidation.is_original(replacement) {
            return Err(VaultError::config(format!(
                "tag_consolidation: '{}' is a replacement and is itself replaced by '{}'",
                replacement,
                consolidation.apply(replacement)
            )));
        }
    }

    Ok(consolidation)
}

/// Normalize a tag named by a rule, rejecting tags that consolidation would rewrite away.
fn rule_tag(context: &str, raw: &str, consolidation: &Consolidation) -> Result<String> {
    let tag = normalize_tag(raw)
        .ok_or_else(|| VaultError::config(format!("{}: empty tag", context)))?;
    if consolidation.is_original(&tag) {
        return Err(VaultError::config(format!(
            "{}: '{}' is consolidated into '{}' and can never match; use the replacement tag",
            context,
            tag,
            consolidation.apply(&tag)
        )));
    }
    Ok(tag)
}

/// Check that a folder name is a non-empty relative path inside the vault.
fn validate_folder(context: &str, folder: &str, index_folder: Option<&str>) -> Result<String> {
    let trimmed = folder.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(VaultError::config(format!("{}: folder name is empty", context)));
    }

    let path = Path::new(trimmed);
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(VaultError::config(format!(
            "{}: folder '{}' must be a relative path inside the vault",
            context, folder
        )));
    }

    if let Some(index) = index_folder {
        let first = path.components().next().map(|c| c.as_os_str());
        if first == Some(std::ffi::OsStr::new(index)) {
            return Err(VaultError::config(format!(
                "{}: folder '{}' lies inside the index folder '{}'",
                context, folder, index
            )));
        }
    }

    Ok(trimmed.to_string())
}
