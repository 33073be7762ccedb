//! Download a file from an ordered list of mirrors.
//!
//! Sources are tried strictly in the order given. A connection error, a
//! non-success status or a failure while streaming the body moves on to the
//! next source; the first complete download wins. Each attempt truncates the
//! destination, and a failed attempt deletes whatever it wrote, so a partial
//! file is never left behind looking like a finished download.

use crate::http;
use rime_mate_config::Reporter;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use ureq::Agent;

/// Why a single source failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("{0}")]
    InvalidUrl(String),

    /// Connection, TLS, DNS or timeout failure.
    #[error("request failed: {0}")]
    Request(#[source] ureq::Error),

    #[error("bad status: HTTP {0}")]
    Status(u16),

    /// The body could not be streamed into the destination file.
    #[error("download to '{}' failed: {source}", path.display())]
    Transfer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<ureq::Error> for AttemptError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(code) => AttemptError::Status(code),
            other => AttemptError::Request(other),
        }
    }
}

/// Every source failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no download sources configured")]
    NoSources,

    #[error("all {attempts} download source(s) failed; last error from {url}: {cause}")]
    AllSourcesFailed {
        attempts: usize,
        /// The last source tried.
        url: String,
        /// Why the last source failed.
        #[source]
        cause: AttemptError,
    },
}

/// A successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub url: String,
    pub bytes: u64,
}

/// Streams a resource to disk with ordered mirror fallback.
#[derive(Clone)]
pub struct Fetcher {
    agent: Agent,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Fetcher {
    /// `timeout` bounds each attempt as a whole, body included. With `None`
    /// only the connect timeout applies.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            agent: http::agent(timeout),
        }
    }

    /// Download the first source that succeeds into `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NoSources`] for an empty list, otherwise
    /// [`FetchError::AllSourcesFailed`] carrying the most recent failure.
    pub fn fetch(
        &self,
        sources: &[String],
        dest: &Path,
        reporter: &dyn Reporter,
    ) -> Result<Fetched, FetchError> {
        let mut last: Option<(String, AttemptError)> = None;

        for (i, url) in sources.iter().enumerate() {
            log::debug!("Download attempt {}/{} from {}", i + 1, sources.len(), url);
            match self.try_source(url, dest) {
                Ok(bytes) => {
                    reporter.info(&format!(
                        "Downloaded {} from {}",
                        format_size(bytes),
                        url
                    ));
                    return Ok(Fetched {
                        url: url.clone(),
                        bytes,
                    });
                }
                Err(e) => {
                    if i + 1 < sources.len() {
                        reporter.warn(&format!(
                            "Download from {url} failed: {e}. Trying next source..."
                        ));
                    } else {
                        reporter.error(&format!("Download from {url} failed: {e}"));
                    }
                    last = Some((url.clone(), e));
                }
            }
        }

        match last {
            Some((url, cause)) => Err(FetchError::AllSourcesFailed {
                attempts: sources.len(),
                url,
                cause,
            }),
            None => Err(FetchError::NoSources),
        }
    }

    fn try_source(&self, url: &str, dest: &Path) -> Result<u64, AttemptError> {
        http::validate_source_url(url).map_err(AttemptError::InvalidUrl)?;

        let response = self
            .agent
            .get(url)
            .header("User-Agent", http::USER_AGENT)
            .call()?;

        let mut reader = response.into_body().into_reader();
        let transfer = |source| AttemptError::Transfer {
            path: dest.to_path_buf(),
            source,
        };

        let result = File::create(dest).and_then(|mut file| {
            let bytes = io::copy(&mut reader, &mut file)?;
            file.flush()?;
            Ok(bytes)
        });

        match result {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                if let Err(rm) = fs::remove_file(dest)
                    && rm.kind() != io::ErrorKind::NotFound
                {
                    log::warn!("Could not remove partial download {:?}: {}", dest, rm);
                }
                Err(transfer(e))
            }
        }
    }
}

fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
