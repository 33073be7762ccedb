//! Configuration layer for rime-mate.
//!
//! This crate owns everything that touches a Rime custom YAML file:
//!
//! - Order-preserving document model (`document`)
//! - Loading and atomic saving (`persistence`)
//! - Idempotent merging into the `patch` section (`patch`)
//! - Rime user-directory discovery (`paths`)
//! - Fixed language-model settings and download sources (`defaults`)
//! - The progress reporting sink shared with the fetcher (`report`)

pub mod defaults;
pub mod document;
mod error;
pub mod patch;
pub mod paths;
pub mod persistence;
pub mod report;

// Re-export main types for convenience
pub use document::{Document, Scalar, Value};
pub use error::ConfigError;
pub use patch::{RemoveOutcome, UpsertOutcome, present_leaves, remove_leaves, upsert_leaves};
pub use paths::{FixedRimeDir, PlatformRimeDir, RimeDirProvider, RimePaths, expand_tilde};
pub use persistence::{load_document, save_document};
pub use report::{LogReporter, RecordingReporter, Reporter};
