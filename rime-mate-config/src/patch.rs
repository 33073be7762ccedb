//! Idempotent set-if-absent / remove-if-present merging into a patch section.
//!
//! Rime reads overrides from the `patch` mapping of a `*.custom.yaml` file,
//! where each key is a slash-separated path such as `grammar/language`.
//! The two operations here only ever touch the leaf keys they are given,
//! inside the one section they are given:
//!
//! - [`upsert_leaves`] appends missing keys and never overwrites a key the
//!   user already set, so running it twice is a no-op the second time.
//! - [`remove_leaves`] drops the given keys and removes the section itself
//!   once it is empty.
//!
//! Everything outside the section, and every pre-existing key inside it,
//! keeps its value and position.
//!
//! A section written by another tool may not be a plain string-keyed
//! mapping. `null`, mappings with non-string keys and sequences of
//! single-pair mappings are coerced into an ordered section; every key and
//! value survives, but the relative order of such coerced keys is not
//! guaranteed to match the original file. A sequence that lists the same key
//! twice cannot be coerced without dropping one of them, so it is refused.

use crate::document::{Document, Scalar, Value, key_to_string};
use crate::error::ConfigError;
use crate::report::Reporter;
use serde_yaml_ng::Value as Yaml;

/// What [`upsert_leaves`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Keys appended to the section, in the order they were appended.
    pub added: Vec<String>,
    /// Keys that were already present and left untouched.
    pub kept: Vec<String>,
    /// The section did not exist and was appended to the document.
    pub created_section: bool,
}

impl UpsertOutcome {
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// What [`remove_leaves`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The document has no such section; nothing was touched.
    SectionAbsent,
    /// The section exists but holds none of the requested keys.
    NothingRemoved,
    /// Some keys were removed.
    Removed {
        keys: Vec<String>,
        /// The section became empty and was removed from the document.
        section_dropped: bool,
    },
}

impl RemoveOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, RemoveOutcome::Removed { .. })
    }
}

/// Append every `(key, value)` entry whose key is missing from `section`.
///
/// The section is created at the end of the document if absent. Existing
/// keys are never overwritten or moved. When nothing needs adding the
/// document is left exactly as it was, including the representation of a
/// coerced section.
///
/// # Errors
///
/// Returns [`ConfigError::NotASection`] if the section holds a value that
/// cannot be read as key/value pairs, such as a plain string.
pub fn upsert_leaves(
    doc: &mut Document,
    section: &str,
    entries: &[(&str, Scalar)],
    reporter: &dyn Reporter,
) -> Result<UpsertOutcome, ConfigError> {
    let mut outcome = UpsertOutcome::default();

    let mut leaves = match doc.get(section) {
        Some(value) => coerce_section(section, value, reporter)?,
        None => {
            outcome.created_section = true;
            Document::new()
        }
    };

    for (key, value) in entries {
        if leaves.contains_key(key) {
            log::debug!("patch key {key} already set, keeping user value");
            outcome.kept.push((*key).to_string());
            continue;
        }
        leaves.insert(*key, Value::Scalar(value.clone()));
        reporter.info(&format!("Added setting: {key} = {value}"));
        outcome.added.push((*key).to_string());
    }

    if outcome.changed() || outcome.created_section {
        doc.insert(section, Value::Section(leaves));
    }

    Ok(outcome)
}

/// Remove every key in `keys` from `section`.
///
/// Remaining keys keep their order. If the section ends up empty it is
/// removed from the document entirely. An absent section, or one holding
/// none of the keys, leaves the document untouched.
pub fn remove_leaves(
    doc: &mut Document,
    section: &str,
    keys: &[&str],
    reporter: &dyn Reporter,
) -> RemoveOutcome {
    let Some(value) = doc.get(section) else {
        return RemoveOutcome::SectionAbsent;
    };

    let mut leaves = match coerce_section(section, value, reporter) {
        Ok(leaves) => leaves,
        Err(e) => {
            reporter.warn(&format!("Leaving '{section}' untouched: {e}"));
            return RemoveOutcome::NothingRemoved;
        }
    };

    let mut removed = Vec::new();
    leaves.retain(|key, _| {
        if keys.contains(&key) {
            removed.push(key.to_string());
            false
        } else {
            true
        }
    });

    if removed.is_empty() {
        return RemoveOutcome::NothingRemoved;
    }
    for key in &removed {
        reporter.info(&format!("Removed setting: {key}"));
    }

    let section_dropped = leaves.is_empty();
    if section_dropped {
        doc.remove(section);
    } else {
        doc.insert(section, Value::Section(leaves));
    }

    RemoveOutcome::Removed {
        keys: removed,
        section_dropped,
    }
}

/// Keys from `keys` that are currently set in `section`, in section order.
pub fn present_leaves(doc: &Document, section: &str, keys: &[&str]) -> Vec<String> {
    let Some(value) = doc.get(section) else {
        return Vec::new();
    };
    let Ok(leaves) = coerce_foreign(section, value) else {
        return Vec::new();
    };
    leaves
        .string_keys()
        .filter(|k| keys.contains(k))
        .map(str::to_string)
        .collect()
}

fn coerce_section(
    section: &str,
    value: &Value,
    reporter: &dyn Reporter,
) -> Result<Document, ConfigError> {
    if let Value::Section(leaves) = value {
        return Ok(leaves.clone());
    }
    let leaves = coerce_foreign(section, value)?;
    if !leaves.is_empty() {
        reporter.warn(&format!(
            "'{section}' is {}; converted it to an ordered mapping \
             (key order may change)",
            value.kind()
        ));
    }
    Ok(leaves)
}

fn coerce_foreign(section: &str, value: &Value) -> Result<Document, ConfigError> {
    let not_a_section = || ConfigError::NotASection {
        section: section.to_string(),
        found: value.kind(),
    };
    match value {
        Value::Section(leaves) => Ok(leaves.clone()),
        Value::Opaque(Yaml::Null) => Ok(Document::new()),
        Value::Opaque(Yaml::Mapping(m)) => Ok(Document::from_mapping(m.clone())),
        Value::Opaque(Yaml::Sequence(items)) => {
            let mut leaves = Document::new();
            for item in items {
                let Yaml::Mapping(pair) = item else {
                    return Err(not_a_section());
                };
                if pair.len() != 1 {
                    return Err(not_a_section());
                }
                for (key, value) in pair.clone() {
                    if leaves.contains_node(&key) {
                        return Err(ConfigError::DuplicateKey {
                            section: section.to_string(),
                            key: key_to_string(&key),
                        });
                    }
                    leaves.insert_node(key, Value::from_yaml(value));
                }
            }
            Ok(leaves)
        }
        _ => Err(not_a_section()),
    }
}
