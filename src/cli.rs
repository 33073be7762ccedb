//! Command-line interface for rime-mate.
//!
//! Each subcommand maps to one [`LangModel`] operation. Without a subcommand
//! an interactive menu offers the same choices.

use crate::debug;
use crate::lang_model::{InstallReport, LangModel, RemoveReport, StatusReport};
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use rime_mate_config::{FixedRimeDir, PlatformRimeDir};
use rime_mate_fetch::Fetcher;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

/// rime-mate - manage add-ons for the Rime input method engine
#[derive(Parser)]
#[command(name = "rime-mate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Rime user directory (default: detected for the current platform)
    #[arg(long, value_name = "DIR", env = "RIME_MATE_DIR")]
    pub rime_dir: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace (overrides RIME_MATE_LOG)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LevelFilter>,

    /// Overall timeout for each download attempt, body included (default: none)
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Download the Wanxiang language model and enable it for rime_mint
    Install,
    /// Delete the language model and remove its settings
    Remove,
    /// Show whether the language model is installed
    Status,
}

/// Runtime options passed from the CLI to the operations.
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    /// Explicit Rime directory instead of platform detection
    pub rime_dir: Option<PathBuf>,
    /// Per-attempt download timeout; `None` waits as long as data keeps coming
    pub timeout: Option<Duration>,
}

impl RuntimeOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            rime_dir: cli.rime_dir.clone(),
            timeout: cli.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Build the operation runner these options describe.
    pub fn lang_model(&self) -> LangModel {
        let model = match &self.rime_dir {
            Some(dir) => LangModel::new(FixedRimeDir::new(dir)),
            None => LangModel::new(PlatformRimeDir::new()),
        };
        model.with_fetcher(Fetcher::new(self.timeout))
    }
}

/// Parse arguments, run the chosen intent and return the process exit code.
pub fn process_cli() -> i32 {
    let cli = Cli::parse();
    debug::init_logger(cli.log_level);

    let options = RuntimeOptions::from_cli(&cli);
    let command = match cli.command {
        Some(command) => command,
        None => {
            let stdin = io::stdin();
            match prompt_menu(&mut stdin.lock(), &mut io::stdout()) {
                Ok(Some(command)) => command,
                Ok(None) => return 0,
                Err(e) => {
                    log::error!("Failed to read menu choice: {e}");
                    return 1;
                }
            }
        }
    };

    match run(command, &options.lang_model()) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{e:#}");
            1
        }
    }
}

/// Run one intent to completion.
pub fn run(command: Commands, model: &LangModel) -> anyhow::Result<()> {
    match command {
        Commands::Install => {
            println!("\n🚀 Preparing to install the Wanxiang language model...");
            let report = model
                .install()
                .context("Language model installation failed")?;
            print_install(&report);
        }
        Commands::Remove => {
            let report = model.remove().context("Language model removal failed")?;
            print_remove(&report);
        }
        Commands::Status => {
            let report = model.status().context("Could not read language model status")?;
            print_status(&report);
        }
    }
    Ok(())
}

const MENU: &[(&str, Option<Commands>)] = &[
    ("Install the Wanxiang language model", Some(Commands::Install)),
    ("Remove the Wanxiang language model", Some(Commands::Remove)),
    ("Show language model status", Some(Commands::Status)),
    ("Quit", None),
];

/// Show the rime_mint menu and read a choice. Returns `None` for quit or
/// end of input.
pub fn prompt_menu(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<Option<Commands>> {
    writeln!(output, "\nRime Mate · rime_mint")?;
    for (i, (title, _)) in MENU.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, title)?;
    }

    loop {
        write!(output, "Choose [1-{}, q]: ", MENU.len())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(None);
        }
        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match choice.parse::<usize>() {
            Ok(n) if (1..=MENU.len()).contains(&n) => return Ok(MENU[n - 1].1),
            _ => writeln!(output, "Please enter a number between 1 and {}.", MENU.len())?,
        }
    }
}

fn print_install(report: &InstallReport) {
    debug::success(&format!(
        "✅ Language model installed to {}.",
        report.paths.lang_model.display()
    ));
    if !report.settings.kept.is_empty() {
        println!(
            "Kept your existing values for: {}",
            report.settings.kept.join(", ")
        );
    }
    println!("Please redeploy Rime to apply the changes.");
}

fn print_remove(report: &RemoveReport) {
    if report.nothing_to_do() {
        debug::success("Language model is not installed, nothing to do.");
        return;
    }
    debug::success("✅ Language model removed.");
    println!("Please redeploy Rime to apply the changes.");
}

fn print_status(report: &StatusReport) {
    println!("Rime directory: {}", report.paths.dir.display());
    match report.resource_bytes {
        Some(bytes) => println!("Model file:     present ({bytes} bytes)"),
        None => println!("Model file:     missing"),
    }
    println!(
        "Settings:       {}/{} present in {}",
        report.present_settings.len(),
        report.total_settings,
        report.paths.custom_yaml.display()
    );
    if report.is_installed() {
        debug::success("Language model is installed.");
    } else if report.is_absent() {
        println!("Language model is not installed.");
    } else {
        println!("Language model is partially installed; run `rime-mate install` to repair.");
    }
}
