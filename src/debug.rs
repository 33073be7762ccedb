//! Console logging for rime-mate.
//!
//! Installs a `log::Log` implementation that renders records for a person
//! watching the terminal:
//! - info: gray, stdout
//! - warn: yellow, stderr
//! - error: bold red with a cross mark, stderr
//! - debug/trace: dimmed and prefixed with the record target, stderr
//!
//! The level comes from the `--log-level` flag, then the `RIME_MATE_LOG`
//! environment variable, then defaults to `info`. Records from other crates
//! (the HTTP stack) are only shown at warn and above unless the level is
//! debug or more verbose. Setting `NO_COLOR` disables ANSI colors.

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::OnceLock;

/// Environment variable consulted when no `--log-level` flag is given.
pub const LOG_ENV_VAR: &str = "RIME_MATE_LOG";

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";

struct ConsoleLogger {
    level: LevelFilter,
    color: bool,
    // Serializes writes so interleaved stdout/stderr lines stay whole
    lock: Mutex<()>,
}

impl ConsoleLogger {
    fn is_own_target(target: &str) -> bool {
        target.starts_with("rime_mate")
    }

    fn paint(&self, text: &str, style: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn render(&self, record: &Record) -> String {
        let msg = record.args().to_string();
        match record.level() {
            Level::Error => self.paint(&format!("❌  {msg}"), &format!("{RED}{BOLD}")),
            Level::Warn => self.paint(&msg, YELLOW),
            Level::Info => self.paint(&msg, GRAY),
            Level::Debug | Level::Trace => {
                self.paint(&format!("[{}] {}", record.target(), msg), GRAY)
            }
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        Self::is_own_target(metadata.target())
            || metadata.level() <= Level::Warn
            || self.level >= LevelFilter::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.render(record);
        let _guard = self.lock.lock();
        if record.level() == Level::Info {
            let _ = writeln!(std::io::stdout(), "{line}");
        } else {
            let _ = writeln!(std::io::stderr(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

/// Pick the effective level: explicit flag, then environment, then `info`.
pub fn resolve_level(flag: Option<LevelFilter>, env_value: Option<&str>) -> LevelFilter {
    flag.or_else(|| env_value.and_then(|v| v.trim().parse().ok()))
        .unwrap_or(LevelFilter::Info)
}

/// Install the console logger. Calling this more than once is harmless;
/// only the first call takes effect.
pub fn init_logger(flag: Option<LevelFilter>) {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(flag, env_value.as_deref());
    let logger = LOGGER.get_or_init(|| ConsoleLogger {
        level,
        color: std::env::var_os("NO_COLOR").is_none(),
        lock: Mutex::new(()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

/// Print a success line in bold green. Success is not a log level, so this
/// bypasses the logger and always goes to stdout.
pub fn success(message: &str) {
    if std::env::var_os("NO_COLOR").is_none() {
        println!("{GREEN}{BOLD}{message}{RESET}");
    } else {
        println!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger(level: LevelFilter) -> ConsoleLogger {
        ConsoleLogger {
            level,
            color: false,
            lock: Mutex::new(()),
        }
    }

    fn meta(level: Level, target: &str) -> Metadata<'_> {
        Metadata::builder().level(level).target(target).build()
    }

    #[test]
    fn test_resolve_level_precedence() {
        assert_eq!(
            resolve_level(Some(LevelFilter::Warn), Some("trace")),
            LevelFilter::Warn
        );
        assert_eq!(resolve_level(None, Some("debug")), LevelFilter::Debug);
        assert_eq!(resolve_level(None, Some("nonsense")), LevelFilter::Info);
        assert_eq!(resolve_level(None, None), LevelFilter::Info);
    }

    #[test]
    fn test_foreign_targets_hidden_at_info() {
        let l = logger(LevelFilter::Info);
        assert!(l.enabled(&meta(Level::Info, "rime_mate")));
        assert!(l.enabled(&meta(Level::Info, "rime_mate_config::persistence")));
        assert!(!l.enabled(&meta(Level::Info, "ureq::unversioned")));
        assert!(l.enabled(&meta(Level::Warn, "ureq::unversioned")));
        assert!(!l.enabled(&meta(Level::Debug, "rime_mate")));
    }

    #[test]
    fn test_foreign_targets_shown_at_debug() {
        let l = logger(LevelFilter::Debug);
        assert!(l.enabled(&meta(Level::Debug, "ureq::unversioned")));
        assert!(!l.enabled(&meta(Level::Trace, "rime_mate")));
    }

    #[test]
    fn test_render_marks_errors() {
        let l = logger(LevelFilter::Info);
        assert_eq!(
            l.render(
                &Record::builder()
                    .level(Level::Error)
                    .target("rime_mate")
                    .args(format_args!("download failed"))
                    .build()
            ),
            "❌  download failed"
        );
    }
}
