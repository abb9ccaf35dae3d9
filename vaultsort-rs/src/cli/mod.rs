//! Command-line front end.

pub mod args;
pub mod output;

pub use args::{Cli, OutputFormat};
pub use output::Output;
