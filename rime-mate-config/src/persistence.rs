//! Loading and saving custom YAML documents.
//!
//! - `load_document`: missing file yields an empty document
//! - `save_document`: creates the parent directory and writes atomically
//!   (temp file then rename) so a crash never leaves a half-written config.
//!   A symlinked config is written through to the file it points at, and
//!   the existing file's permissions are kept.

use crate::document::Document;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Load the document at `path`, or an empty one if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read and
/// [`ConfigError::Decode`] if it is not a valid YAML mapping.
pub fn load_document(path: &Path) -> Result<Document, ConfigError> {
    if !path.exists() {
        log::info!("Config file not found, starting from an empty document: {:?}", path);
        return Ok(Document::new());
    }

    let bytes = fs::read(path).map_err(|e| ConfigError::io(path, e))?;
    log::info!("Loaded config file {:?}", path);

    let doc = Document::parse(&bytes).map_err(|source| ConfigError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Parsed {} top-level keys from {:?}", doc.len(), path);
    Ok(doc)
}

/// Save `doc` to `path`.
pub fn save_document(path: &Path, doc: &Document) -> Result<(), ConfigError> {
    let target = write_target(path)?;
    if target != path {
        log::debug!("{:?} is a symlink, writing to {:?}", path, target);
    }

    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }

    let yaml = doc.to_yaml().map_err(ConfigError::Encode)?;

    let temp_path = target.with_extension("yaml.tmp");
    fs::write(&temp_path, &yaml).map_err(|e| ConfigError::io(&temp_path, e))?;
    if let Ok(existing) = fs::metadata(&target) {
        fs::set_permissions(&temp_path, existing.permissions())
            .map_err(|e| ConfigError::io(&temp_path, e))?;
    }
    fs::rename(&temp_path, &target).map_err(|e| ConfigError::io(&target, e))?;

    log::info!("Saved config file {:?}", path);
    Ok(())
}

/// The file a save should replace: `path` itself, or the file it links to.
fn write_target(path: &Path) -> Result<PathBuf, ConfigError> {
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return Ok(path.to_path_buf());
    }

    match fs::canonicalize(path) {
        Ok(target) => Ok(target),
        // Dangling link: create the file it names
        Err(_) => {
            let link = fs::read_link(path).map_err(|e| ConfigError::io(path, e))?;
            Ok(match path.parent() {
                Some(parent) if link.is_relative() => parent.join(link),
                _ => link,
            })
        }
    }
}
