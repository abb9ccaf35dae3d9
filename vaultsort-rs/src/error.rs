//! Error types and exit codes for vaultsort.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const PARTIAL_FAILURE: i32 = 3;
}

/// Main error type for vaultsort operations.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("No config file given and none found in the working directory or user config dir")]
    NoConfig,

    #[error("Vault not found at: {0}")]
    VaultNotFound(PathBuf),

    #[error("Invalid frontmatter in {path}: {message}")]
    InvalidFrontmatter { path: PathBuf, message: String },

    #[error("Cannot move {note} to {destination}: destination is occupied by another file")]
    Collision {
        note: PathBuf,
        destination: PathBuf,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),
}

impl VaultError {
    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            VaultError::Config(_)
            | VaultError::ConfigNotFound(_)
            | VaultError::NoConfig
            | VaultError::TomlParse(_)
            | VaultError::RegexError(_) => exit_code::CONFIG_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        VaultError::Config(message.into())
    }
}

/// Result type alias for vaultsort operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Exit status of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    GeneralError,
    ConfigError,
    PartialFailure,
}

impl ExitCode {
    /// Convert to exit code integer.
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => exit_code::SUCCESS,
            ExitCode::GeneralError => exit_code::GENERAL_ERROR,
            ExitCode::ConfigError => exit_code::CONFIG_ERROR,
            ExitCode::PartialFailure => exit_code::PARTIAL_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_map_to_config_exit_code() {
        assert_eq!(VaultError::config("bad").exit_code(), exit_code::CONFIG_ERROR);
        assert_eq!(VaultError::NoConfig.exit_code(), exit_code::CONFIG_ERROR);
        assert_eq!(
            VaultError::ConfigNotFound(PathBuf::from("x.yaml")).exit_code(),
            exit_code::CONFIG_ERROR
        );
    }

    #[test]
    fn test_io_error_is_general() {
        let err = VaultError::from(std::io::Error::other("boom"));
        assert_eq!(err.exit_code(), exit_code::GENERAL_ERROR);
    }

    #[test]
    fn test_collision_message_names_both_paths() {
        let err = VaultError::Collision {
            note: PathBuf::from("a/Note.md"),
            destination: PathBuf::from("b/Note.md"),
        };
        let msg = err.to_string();
        assert!(msg.contains("a/Note.md"));
        assert!(msg.contains("b/Note.md"));
    }
}
