//! Note metadata parsing.

pub mod frontmatter;

pub use frontmatter::{parse_frontmatter, split_frontmatter, update_frontmatter};
