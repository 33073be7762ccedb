//! Rime user-directory discovery.
//!
//! Each Rime frontend keeps its user data somewhere different:
//! - macOS (Squirrel): `~/Library/Rime`
//! - Linux: `~/.config/ibus/rime` (IBus) or `~/.config/fcitx5/rime` (Fcitx5),
//!   whichever exists first
//! - Windows (Weasel): `%APPDATA%\Rime`
//!
//! [`RimeDirProvider`] is the seam the installer uses, so tests and the
//! `--rime-dir` flag can substitute a fixed directory.

use crate::defaults::{CUSTOM_YAML_FILE_NAME, LANG_MODEL_FILE_NAME};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Resolves the directory holding the Rime user configuration.
pub trait RimeDirProvider: Send + Sync {
    /// Return an existing directory, or
    /// [`ConfigError::DirectoryNotFound`] naming every location probed.
    fn rime_dir(&self) -> Result<PathBuf, ConfigError>;
}

/// Probes the well-known per-platform locations.
#[derive(Debug, Clone, Default)]
pub struct PlatformRimeDir {
    home_override: Option<PathBuf>,
}

impl PlatformRimeDir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe relative to `home` instead of the user's real home directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home_override: Some(home.into()),
        }
    }

    fn home(&self) -> Option<PathBuf> {
        self.home_override.clone().or_else(dirs::home_dir)
    }

    /// Candidate directories for `os`, in probe order.
    pub fn candidates(&self, os: &str) -> Result<Vec<PathBuf>, ConfigError> {
        let home = self.home();
        let under_home = |rel: &[&str]| {
            home.as_ref().map(|h| rel.iter().fold(h.clone(), |p, c| p.join(c)))
        };
        let candidates = match os {
            "macos" => vec![under_home(&["Library", "Rime"])],
            "linux" => vec![
                under_home(&[".config", "ibus", "rime"]),
                under_home(&[".config", "fcitx5", "rime"]),
            ],
            "windows" => {
                let appdata = match &self.home_override {
                    Some(h) => Some(h.join("AppData").join("Roaming")),
                    None => dirs::config_dir(),
                };
                vec![appdata.map(|d| d.join("Rime"))]
            }
            other => return Err(ConfigError::UnsupportedPlatform(other.to_string())),
        };
        Ok(candidates.into_iter().flatten().collect())
    }

    fn probe(&self, os: &str) -> Result<PathBuf, ConfigError> {
        let candidates = self.candidates(os)?;
        for candidate in &candidates {
            log::debug!("Probing Rime directory {:?}", candidate);
            if candidate.is_dir() {
                return Ok(candidate.clone());
            }
        }
        Err(ConfigError::DirectoryNotFound {
            platform: os.to_string(),
            probed: candidates,
        })
    }
}

impl RimeDirProvider for PlatformRimeDir {
    fn rime_dir(&self) -> Result<PathBuf, ConfigError> {
        self.probe(std::env::consts::OS)
    }
}

/// A directory chosen by the user (or a test).
#[derive(Debug, Clone)]
pub struct FixedRimeDir {
    dir: PathBuf,
}

impl FixedRimeDir {
    /// A leading `~/` is expanded to the home directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: expand_tilde(dir.as_ref()),
        }
    }
}

impl RimeDirProvider for FixedRimeDir {
    fn rime_dir(&self) -> Result<PathBuf, ConfigError> {
        if self.dir.is_dir() {
            Ok(self.dir.clone())
        } else {
            Err(ConfigError::DirectoryNotFound {
                platform: std::env::consts::OS.to_string(),
                probed: vec![self.dir.clone()],
            })
        }
    }
}

/// Expand a leading `~/` to the user's home directory. Paths without the
/// prefix, or when the home directory is unknown, are returned unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Files the add-on manages inside a Rime directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RimePaths {
    pub dir: PathBuf,
    /// `rime_mint.custom.yaml`
    pub custom_yaml: PathBuf,
    /// `wanxiang-lts-zh-hans.gram`
    pub lang_model: PathBuf,
}

impl RimePaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            custom_yaml: dir.join(CUSTOM_YAML_FILE_NAME),
            lang_model: dir.join(LANG_MODEL_FILE_NAME),
            dir,
        }
    }

    pub fn resolve(provider: &dyn RimeDirProvider) -> Result<Self, ConfigError> {
        provider.rime_dir().map(Self::in_dir)
    }
}
