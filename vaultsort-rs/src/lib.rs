//! vaultsort - reorganize an Obsidian-style vault by its frontmatter tags.
//!
//! # Overview
//!
//! Each note's `tags` field is normalized, consolidated and extended with
//! inherited category tags. The resolved tags pick a destination folder from
//! configurable category/subcategory rules, the note is moved there with its
//! tag list rewritten, and one `_indexes/_<tag>.md` listing page is rebuilt
//! per tag. MediaWiki redirect and template stubs are deleted first.
//!
//! The tag and path logic ([`tags`], [`resolve`], [`destination`]) is pure
//! and works on an immutable [`RuleSet`]; filesystem effects live in
//! [`relocate`], [`index`] and [`organize`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vaultsort::{organize_vault, Config};
//!
//! let config = Config::load(Some(Path::new("vaultsort.yaml"))).unwrap();
//! let report = organize_vault(&config, None, false).unwrap();
//! println!("{} notes moved", report.summary.moved);
//! ```

pub mod cli;
pub mod config;
pub mod destination;
pub mod error;
pub mod index;
pub mod note;
pub mod organize;
pub mod parser;
pub mod purge;
pub mod relocate;
pub mod resolve;
pub mod rules;
pub mod tags;
pub mod types;
pub mod vault;

// Re-export main types at crate root
pub use config::Config;
pub use error::{Result, VaultError};
pub use note::Note;
pub use organize::{organize_vault, Organizer};
pub use rules::RuleSet;
pub use types::*;
pub use vault::Vault;
