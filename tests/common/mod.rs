//! Shared integration test helpers for rime-mate.
//!
//! - `TestServer`/`Route`: re-exported from `rime_mate_fetch::test_support`
//! - `TestContext`: a temporary Rime directory plus a `LangModel` wired to
//!   it, the test server and a recording reporter
//!
//! Include with `mod common;` at the top of each test file.

#![allow(dead_code)]

use rime_mate::LangModel;
use rime_mate_config::{FixedRimeDir, RecordingReporter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub use rime_mate_fetch::test_support::{Route, TestServer};

/// Model bytes served by [`TestContext::new`].
pub const MODEL_BYTES: &[u8] = b"gram model payload";

/// A temporary Rime directory with a `LangModel` pointed at it.
///
/// The mirror answers 503 and the origin serves [`MODEL_BYTES`], so every
/// install exercises the fallback path.
pub struct TestContext {
    pub dir: TempDir,
    pub server: TestServer,
    pub reporter: Arc<RecordingReporter>,
}

impl TestContext {
    pub fn new() -> Self {
        let server = TestServer::start(vec![
            ("/mirror.gram", Route::Respond(503, b"busy".to_vec())),
            ("/origin.gram", Route::Respond(200, MODEL_BYTES.to_vec())),
        ]);
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            server,
            reporter: Arc::new(RecordingReporter::new()),
        }
    }

    pub fn lang_model(&self) -> LangModel {
        self.lang_model_with_sources(vec![
            self.server.url("/mirror.gram"),
            self.server.url("/origin.gram"),
        ])
    }

    pub fn lang_model_with_sources(&self, sources: Vec<String>) -> LangModel {
        LangModel::new(FixedRimeDir::new(self.dir.path()))
            .with_sources(sources)
            .with_fetcher(rime_mate_fetch::Fetcher::new(Some(Duration::from_secs(10))))
            .with_reporter(self.reporter.clone())
    }

    pub fn custom_yaml(&self) -> PathBuf {
        self.dir.path().join("rime_mint.custom.yaml")
    }

    pub fn model_file(&self) -> PathBuf {
        self.dir.path().join("wanxiang-lts-zh-hans.gram")
    }

    pub fn read_yaml(&self) -> String {
        std::fs::read_to_string(self.custom_yaml()).expect("read custom yaml")
    }

    pub fn write_yaml(&self, contents: &str) {
        std::fs::write(self.custom_yaml(), contents).expect("write custom yaml");
    }
}
