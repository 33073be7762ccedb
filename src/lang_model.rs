//! Install and remove the Wanxiang language model for the rime_mint schema.
//!
//! Installing downloads `wanxiang-lts-zh-hans.gram` into the Rime user
//! directory and adds the grammar settings to the `patch` section of
//! `rime_mint.custom.yaml`. Removing deletes the model and takes exactly
//! those settings back out. Both are safe to re-run: settings the user has
//! already changed are never overwritten, and removing twice is a no-op.
//!
//! A failed step aborts the rest. An already-downloaded model is not rolled
//! back; running install again is the recovery path.

use rime_mate_config::defaults::{
    PATCH_SECTION, lang_model_keys, lang_model_settings, lang_model_sources,
};
use rime_mate_config::{
    ConfigError, LogReporter, PlatformRimeDir, RemoveOutcome, Reporter, RimeDirProvider, RimePaths,
    UpsertOutcome, load_document, present_leaves, remove_leaves, save_document, upsert_leaves,
};
use rime_mate_fetch::{FetchError, Fetched, Fetcher};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by [`LangModel`] operations.
#[derive(Debug, Error)]
pub enum LangModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("language model download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to delete '{}': {source}", path.display())]
    RemoveResource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a successful install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub paths: RimePaths,
    pub fetched: Fetched,
    pub settings: UpsertOutcome,
    /// False when every setting was already present and the file was left
    /// as it was.
    pub config_saved: bool,
}

/// Result of a successful remove.
#[derive(Debug, Clone)]
pub struct RemoveReport {
    pub paths: RimePaths,
    pub resource_deleted: bool,
    pub settings: RemoveOutcome,
    pub config_saved: bool,
}

impl RemoveReport {
    /// Nothing was installed to begin with.
    pub fn nothing_to_do(&self) -> bool {
        !self.resource_deleted && !self.config_saved
    }
}

/// Read-only view of what is currently installed.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub paths: RimePaths,
    /// Size of the model file, if present.
    pub resource_bytes: Option<u64>,
    /// Owned settings currently present in the patch section.
    pub present_settings: Vec<String>,
    pub total_settings: usize,
}

impl StatusReport {
    pub fn is_installed(&self) -> bool {
        self.resource_bytes.is_some() && self.present_settings.len() == self.total_settings
    }

    pub fn is_absent(&self) -> bool {
        self.resource_bytes.is_none() && self.present_settings.is_empty()
    }
}

/// Sequences download, configuration load, patch merge and save.
pub struct LangModel {
    dirs: Box<dyn RimeDirProvider>,
    fetcher: Fetcher,
    sources: Vec<String>,
    reporter: Arc<dyn Reporter>,
}

impl Default for LangModel {
    fn default() -> Self {
        Self::new(PlatformRimeDir::new())
    }
}

impl LangModel {
    /// Use `dirs` to locate the Rime directory, with the built-in mirrors,
    /// a default fetcher and log-backed reporting.
    pub fn new(dirs: impl RimeDirProvider + 'static) -> Self {
        Self {
            dirs: Box::new(dirs),
            fetcher: Fetcher::default(),
            sources: lang_model_sources(),
            reporter: Arc::new(LogReporter),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the download sources (highest priority first).
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    fn paths(&self) -> Result<RimePaths, LangModelError> {
        let paths = RimePaths::resolve(self.dirs.as_ref())?;
        log::debug!("Rime directory: {:?}", paths.dir);
        Ok(paths)
    }

    /// Download the model and enable it in `rime_mint.custom.yaml`.
    pub fn install(&self) -> Result<InstallReport, LangModelError> {
        let reporter = self.reporter.as_ref();
        let paths = self.paths()?;

        reporter.info("Downloading the language model, this may take a while...");
        let fetched = self
            .fetcher
            .fetch(&self.sources, &paths.lang_model, reporter)?;
        reporter.info("Language model downloaded.");

        reporter.info("Updating Rime configuration...");
        let mut doc = load_document(&paths.custom_yaml)?;
        let settings = upsert_leaves(&mut doc, PATCH_SECTION, &lang_model_settings(), reporter)?;

        let config_saved = settings.changed();
        if config_saved {
            save_document(&paths.custom_yaml, &doc)?;
            reporter.info("Configuration updated.");
        } else {
            reporter.info("All language model settings already present, configuration left as is.");
        }

        Ok(InstallReport {
            paths,
            fetched,
            settings,
            config_saved,
        })
    }

    /// Delete the model and take its settings back out of the patch section.
    pub fn remove(&self) -> Result<RemoveReport, LangModelError> {
        let reporter = self.reporter.as_ref();
        let paths = self.paths()?;

        reporter.info("Deleting the language model file...");
        let resource_deleted = match fs::remove_file(&paths.lang_model) {
            Ok(()) => {
                reporter.info(&format!("Deleted {}", paths.lang_model.display()));
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                reporter.info("Language model file not found, skipping.");
                false
            }
            Err(source) => {
                return Err(LangModelError::RemoveResource {
                    path: paths.lang_model.clone(),
                    source,
                });
            }
        };

        reporter.info("Cleaning up Rime configuration...");
        let mut doc = load_document(&paths.custom_yaml)?;
        let settings = remove_leaves(&mut doc, PATCH_SECTION, &lang_model_keys(), reporter);

        let config_saved = match &settings {
            RemoveOutcome::SectionAbsent => {
                reporter.info("No patch section found, nothing to clean up.");
                false
            }
            RemoveOutcome::NothingRemoved => {
                reporter.info("No language model settings found, configuration left as is.");
                false
            }
            RemoveOutcome::Removed { .. } => {
                save_document(&paths.custom_yaml, &doc)?;
                reporter.info("Configuration cleaned up.");
                true
            }
        };

        Ok(RemoveReport {
            paths,
            resource_deleted,
            settings,
            config_saved,
        })
    }

    /// Inspect the Rime directory without changing anything.
    pub fn status(&self) -> Result<StatusReport, LangModelError> {
        let paths = self.paths()?;
        let resource_bytes = fs::metadata(&paths.lang_model)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len());
        let doc = load_document(&paths.custom_yaml)?;
        let keys = lang_model_keys();
        let present_settings = present_leaves(&doc, PATCH_SECTION, &keys);

        Ok(StatusReport {
            paths,
            resource_bytes,
            present_settings,
            total_settings: keys.len(),
        })
    }
}
