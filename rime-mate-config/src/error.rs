//! Typed error variants for the rime-mate-config crate.
//!
//! Provides structured error types for document I/O, decoding and Rime
//! directory discovery so callers can match on specific failure modes
//! instead of opaque `anyhow` strings.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when locating, loading or saving a Rime custom
/// configuration document.
///
/// # Example
///
/// ```rust,no_run
/// use rime_mate_config::ConfigError;
///
/// fn describe(e: &ConfigError) -> &'static str {
///     match e {
///         ConfigError::Io { .. } => "filesystem",
///         ConfigError::Decode { .. } => "malformed YAML",
///         ConfigError::Encode(_) => "serialization",
///         ConfigError::NotASection { .. } => "unexpected patch value",
///         ConfigError::DuplicateKey { .. } => "repeated patch key",
///         ConfigError::DirectoryNotFound { .. } => "no Rime directory",
///         ConfigError::UnsupportedPlatform(_) => "unsupported platform",
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing a file.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// Path of the file that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document contained YAML that could not be parsed, or a top level
    /// that is not a key/value mapping. The file is left untouched.
    #[error("YAML parse error in '{}': {source}", path.display())]
    Decode {
        /// Path of the offending document.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// The in-memory document could not be rendered back to YAML.
    #[error("YAML serialization failed: {0}")]
    Encode(#[source] serde_yaml_ng::Error),

    /// The named section holds a value that cannot be read as a list of
    /// key/value pairs (for example a plain string).
    #[error("section '{section}' is not a mapping (found {found})")]
    NotASection {
        /// Name of the section that was expected to be a mapping.
        section: String,
        /// Short description of the value actually found.
        found: &'static str,
    },

    /// The named section lists the same key more than once, so it cannot be
    /// turned into a mapping without losing an entry.
    #[error("section '{section}' lists key '{key}' more than once")]
    DuplicateKey {
        /// Name of the section being read.
        section: String,
        /// Textual form of the repeated key.
        key: String,
    },

    /// None of the platform-specific Rime directories exist.
    #[error(
        "Rime configuration directory not found on {platform}; probed: {}. \
         Is IBus-Rime, Fcitx5-Rime, Squirrel or Weasel installed?",
        format_probed(probed)
    )]
    DirectoryNotFound {
        /// Platform name as reported by `std::env::consts::OS`.
        platform: String,
        /// Every location that was checked, in probe order.
        probed: Vec<PathBuf>,
    },

    /// The current platform has no known Rime frontend.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_probed(probed: &[PathBuf]) -> String {
    if probed.is_empty() {
        return "(nothing)".to_string();
    }
    probed
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
