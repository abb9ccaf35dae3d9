//! Detection of MediaWiki redirect and template pages.
//!
//! Wiki exports leave behind stub notes whose body is just `#REDIRECT [[X]]`
//! (often rendered as a numbered list item, `1.  REDIRECT X`) and template
//! pages named `Template_*`. These carry no content worth organizing.

use crate::error::Result;
use crate::parser::split_frontmatter;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REDIRECT_PATTERN: &str = r"\A\s*(?:\d+\.\s+)?#?REDIRECT\b";

/// `purge` section of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeSettings {
    pub enabled: bool,
    /// File name prefixes marking template pages.
    pub template_prefixes: Vec<String>,
    /// Case-insensitive regex matched against the note body.
    pub redirect_pattern: String,
}

impl Default for PurgeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            template_prefixes: vec!["Template_".to_string()],
            redirect_pattern: DEFAULT_REDIRECT_PATTERN.to_string(),
        }
    }
}

/// Why a note is purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeReason {
    Template,
    Redirect,
}

impl std::fmt::Display for PurgeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurgeReason::Template => f.write_str("template"),
            PurgeReason::Redirect => f.write_str("redirect"),
        }
    }
}

/// Compiled purge predicate.
#[derive(Debug, Clone)]
pub struct PurgeRules {
    template_prefixes: Vec<String>,
    redirect: Option<Regex>,
}

impl PurgeRules {
    pub fn from_settings(settings: &PurgeSettings) -> Result<Self> {
        if !settings.enabled {
            return Ok(Self::disabled());
        }

        let redirect = if settings.redirect_pattern.trim().is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&settings.redirect_pattern)
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self {
            template_prefixes: settings
                .template_prefixes
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
            redirect,
        })
    }

    /// A predicate that never matches.
    pub fn disabled() -> Self {
        Self {
            template_prefixes: Vec::new(),
            redirect: None,
        }
    }

    /// Classify a note by file name and raw content.
    pub fn classify(&self, file_name: &str, content: &str) -> Option<PurgeReason> {
        if self
            .template_prefixes
            .iter()
            .any(|prefix| file_name.starts_with(prefix.as_str()))
        {
            return Some(PurgeReason::Template);
        }

        let redirect = self.redirect.as_ref()?;
        let body = split_frontmatter(content).body;
        redirect.is_match(body).then_some(PurgeReason::Redirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PurgeRules {
        PurgeRules::from_settings(&PurgeSettings::default()).unwrap()
    }

    #[test]
    fn test_template_by_file_name() {
        assert_eq!(rules().classify("Template_Infobox.md", "anything"), Some(PurgeReason::Template));
        assert_eq!(rules().classify("Templates of old.md", "anything"), None);
    }

    #[test]
    fn test_default_and_custom_template_prefixes() {
        assert_eq!(PurgeSettings::default().template_prefixes, vec!["Template_".to_string()]);
        assert_eq!(rules().classify("Template:Box.md", "anything"), None);

        let settings = PurgeSettings {
            template_prefixes: vec!["Template:".to_string(), String::new()],
            ..PurgeSettings::default()
        };
        let custom = PurgeRules::from_settings(&settings).unwrap();
        assert_eq!(custom.classify("Template:Box.md", "anything"), Some(PurgeReason::Template));
        assert_eq!(custom.classify("Template_Box.md", "anything"), None);
    }

    #[test]
    fn test_redirect_variants() {
        let rules = rules();
        for body in [
            "1.  REDIRECT [[Greenwood]]",
            "#REDIRECT [[Greenwood]]",
            "  #redirect [[Greenwood]]",
            "---\ntags: [x]\n---\n\n1. REDIRECT Greenwood",
        ] {
            assert_eq!(rules.classify("Old Name.md", body), Some(PurgeReason::Redirect), "{body:?}");
        }
    }

    #[test]
    fn test_regular_notes_survive() {
        let rules = rules();
        assert_eq!(rules.classify("Greenwood.md", "A forest. #REDIRECT later"), None);
        assert_eq!(rules.classify("Redirects.md", "REDIRECTED traffic"), None);
        assert_eq!(rules.classify("Empty.md", ""), None);
    }

    #[test]
    fn test_disabled() {
        let settings = PurgeSettings {
            enabled: false,
            ..PurgeSettings::default()
        };
        let rules = PurgeRules::from_settings(&settings).unwrap();
        assert_eq!(rules.classify("Template_X.md", "#REDIRECT [[Y]]"), None);
    }

    #[test]
    fn test_invalid_pattern() {
        let settings = PurgeSettings {
            redirect_pattern: "(unclosed".to_string(),
            ..PurgeSettings::default()
        };
        assert!(PurgeRules::from_settings(&settings).is_err());
    }
}
