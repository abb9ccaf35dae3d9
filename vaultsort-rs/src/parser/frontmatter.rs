//! YAML frontmatter parsing.

use crate::error::{Result, VaultError};
use serde_yaml::Value;
use std::path::Path;

/// A note split at its frontmatter delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterSplit<'a> {
    /// The raw YAML between the `---` lines, if the note has a frontmatter block.
    pub yaml: Option<&'a str>,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
}

/// Split content into frontmatter and body.
///
/// A frontmatter block starts with `---` on the very first line and ends at
/// the next line consisting of `---`. Anything else is all body.
pub fn split_frontmatter(content: &str) -> FrontmatterSplit<'_> {
    let no_frontmatter = FrontmatterSplit {
        yaml: None,
        body: content,
    };

    let yaml_start = if content.starts_with("---\n") {
        4
    } else if content.starts_with("---\r\n") {
        5
    } else {
        return no_frontmatter;
    };

    let rest = &content[yaml_start..];

    // Closing delimiter, either at the start of `rest` (empty block) or on a later line.
    let (yaml_end, after_delimiter) = if rest.starts_with("---") {
        (yaml_start, yaml_start + 3)
    } else {
        let closing = rest
            .match_indices("\n---")
            .map(|(pos, _)| pos)
            .find(|&pos| {
                let tail = &rest[pos + 4..];
                tail.is_empty() || tail.starts_with('\n') || tail.starts_with("\r\n")
            });
        match closing {
            Some(pos) => (yaml_start + pos, yaml_start + pos + 4),
            None => return no_frontmatter,
        }
    };

    let tail = &content[after_delimiter..];
    if !(tail.is_empty() || tail.starts_with('\n') || tail.starts_with("\r\n")) {
        return no_frontmatter;
    }
    let body = tail
        .strip_prefix("\r\n")
        .or_else(|| tail.strip_prefix('\n'))
        .unwrap_or(tail);

    let yaml = content[yaml_start..yaml_end].trim_end_matches('\r');

    FrontmatterSplit {
        yaml: Some(yaml),
        body,
    }
}

/// Parse frontmatter into a YAML value, with the note path for error messages.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<Option<Value>> {
    match split_frontmatter(content).yaml {
        Some(yaml) => {
            let value: Value =
                serde_yaml::from_str(yaml).map_err(|e| VaultError::InvalidFrontmatter {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serialize a value as a delimited frontmatter block.
pub fn serialize_frontmatter(value: &Value) -> Result<String> {
    let yaml = serde_yaml::to_string(value)?;
    Ok(format!("---\n{}---\n", yaml))
}

/// Replace (or add) the frontmatter block, keeping the body byte for byte.
pub fn update_frontmatter(content: &str, new_frontmatter: &Value) -> Result<String> {
    let split = split_frontmatter(content);
    let block = serialize_frontmatter(new_frontmatter)?;

    if split.yaml.is_none() && !split.body.is_empty() {
        return Ok(format!("{}\n{}", block, split.body));
    }
    Ok(format!("{}{}", block, split.body))
}
