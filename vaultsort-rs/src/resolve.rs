//! Tag resolution: canonical tag set plus category/subcategory selection.

use crate::rules::RuleSet;
use crate::tags::canonical_tag;
use crate::types::{RawTags, ResolvedTags};

/// The subcategory a note falls into within its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcategory {
    /// Normalized subcategory group name.
    pub group: String,
    /// The leaf tag that selected the group.
    pub leaf: String,
}

/// The category chosen for a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Normalized category tag.
    pub category: String,
    /// Folder configured for the category.
    pub folder: String,
    pub subcategory: Option<Subcategory>,
}

/// Result of resolving one note's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub tags: ResolvedTags,
    /// `None` when the note goes to the default folder.
    pub selection: Option<Selection>,
}

/// Resolve a note's raw tags against the rule set.
///
/// Category ties are broken by declaration order in `category_rules`, except
/// that a category hinted by the note's `infobox` field always wins. Within
/// the category the first configured subcategory group (and within it the
/// first configured leaf) that the note carries is selected.
pub fn resolve(raw: &RawTags, rules: &RuleSet) -> Resolution {
    let consolidation = rules.consolidation();

    let mut tags: ResolvedTags = raw
        .tags
        .iter()
        .filter_map(|t| canonical_tag(t, consolidation))
        .collect();

    let infobox_category = raw
        .infobox
        .as_deref()
        .and_then(|value| rules.infobox_category(value));
    if let Some(category) = infobox_category {
        tags.insert(category.to_string());
    }

    // A parent may itself be a leaf of another category; expand until stable.
    let mut pending: Vec<String> = tags.iter().map(str::to_string).collect();
    while let Some(tag) = pending.pop() {
        for parent in rules.parents_of(&tag) {
            if tags.insert(parent.to_string()) {
                log::debug!("Inheriting category tag '{}' from '{}'", parent, tag);
                pending.push(parent.to_string());
            }
        }
    }

    let category = infobox_category
        .and_then(|tag| rules.category(tag))
        .or_else(|| rules.categories().iter().find(|c| tags.contains(&c.tag)));

    let selection = category.map(|category| {
        let mut matches = category.groups.iter().filter_map(|group| {
            group
                .leaves
                .iter()
                .find(|leaf| tags.contains(leaf.as_str()))
                .map(|leaf| Subcategory {
                    group: group.name.clone(),
                    leaf: leaf.clone(),
                })
        });

        let subcategory = matches.next();
        if let Some(ref chosen) = subcategory {
            let others: Vec<String> = matches.map(|s| s.group).collect();
            if !others.is_empty() {
                log::debug!(
                    "Tags match several subcategories of '{}'; using '{}' over {:?}",
                    category.tag,
                    chosen.group,
                    others
                );
            }
        }

        Selection {
            category: category.tag.clone(),
            folder: category.folder.clone(),
            subcategory,
        }
    });

    Resolution { tags, selection }
}
