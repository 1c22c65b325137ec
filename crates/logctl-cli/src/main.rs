#![deny(unsafe_code)]

//! logctl: inspect and change logging-context levels from the command line.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use logctl_config::{AppConfig, DEFAULT_CONFIG_FILE};
use logctl_core::build_info;
use logctl_core::{Command, ContextRegistry, Dispatcher, MemoryRegistry, Reporter, Settings};

/// Control logging contexts: show and set levels, emit test records.
#[derive(Parser)]
#[command(
    name = "logctl",
    version,
    long_version = build_info::LONG_VERSION,
    about,
    long_about = None,
    disable_help_subcommand = true
)]
struct Cli {
    /// Suppress informational output. Errors are still shown.
    #[arg(short, long)]
    silent: bool,

    /// Path to configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Increase diagnostic verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Show the level of every context, or of those matching PATTERN.
    Show {
        /// Context name, `.` for the global context, or `prefix*`.
        pattern: Option<String>,
    },

    /// Set the level of the contexts matching PATTERN.
    Set { pattern: String, level: String },

    /// Log a message: `log <message>` or `log <context> <level> <message>`.
    Log {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Log a message with a message ID and key=value pairs:
    /// `logkv <context> <level> <msgID> [key=value ...] [message]`.
    Logkv {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Write a message to the kernel log.
    Klog {
        /// Priority level (default from config, normally `notice`).
        #[arg(short = 'p', long = "priority", value_name = "LEVEL")]
        level: Option<String>,

        /// Syslog facility combined into the priority.
        #[arg(short = 'f', long)]
        facility: Option<String>,

        #[arg(allow_hyphen_values = true)]
        message: String,
    },

    /// Define a context, optionally with a level.
    Def {
        context: String,
        level: Option<String>,
    },

    /// Make the logging library reload its configuration.
    Reconf,

    /// Flush all ring buffers.
    Flush,

    /// Show usage, the context alias, and the level table.
    Help,
}

impl Commands {
    fn into_command(self) -> Command {
        match self {
            Commands::Show { pattern } => Command::Show { pattern },
            Commands::Set { pattern, level } => Command::Set { pattern, level },
            Commands::Log { args } => Command::Log { args },
            Commands::Logkv { args } => Command::LogKv { args },
            Commands::Klog {
                level,
                facility,
                message,
            } => Command::KLog {
                level,
                facility,
                message,
            },
            Commands::Def { context, level } => Command::Def { context, level },
            Commands::Reconf => Command::Reconf,
            Commands::Flush => Command::Flush,
            Commands::Help => Command::Help,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                clap::error::ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("logctl: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli.config)?;
    init_tracing(cli.verbose, &config.logging.level)?;
    info!(version = %build_info::version_string(), "logctl starting");

    let mut reporter = Reporter::stdio(is_silent(cli.silent, &config));
    let command = cli.command.map_or(Command::Help, Commands::into_command);
    let ok = execute(command, &config, &mut reporter)?;
    reporter.flush();
    Ok(ok)
}

/// `-s` or `[output] silent` suppresses informational output.
fn is_silent(flag: bool, config: &AppConfig) -> bool {
    flag || config.output.silent
}

/// Build the registry and settings from `config` and run one command.
fn execute(command: Command, config: &AppConfig, reporter: &mut Reporter) -> Result<bool> {
    let mut registry =
        MemoryRegistry::from_config(config).context("failed to set up the context registry")?;
    let settings = Settings::from_config(config).context("invalid configuration")?;
    debug!(
        command = command.name(),
        contexts = registry.context_count().unwrap_or(0),
        "Dispatching"
    );
    Ok(Dispatcher::new(&mut registry, reporter, &settings).run(command))
}

/// `RUST_LOG` wins, then `-v`, then `logging.level` from the config.
fn init_tracing(verbose: u8, configured: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => EnvFilter::try_new(configured)
                .with_context(|| format!("invalid logging.level {configured:?}"))?,
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn load_config(path: &Path) -> Result<AppConfig> {
    AppConfig::load_or_default(path)
        .with_context(|| format!("failed to load configuration from '{}'", path.display()))
}
