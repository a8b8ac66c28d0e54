// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use qrayti::app_config::{self, Config};
use qrayti::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default command)
    Serve,

    /// Extract text from a PDF and print it as JSON
    Extract {
        /// PDF file to extract
        #[arg(value_name = "PDF_FILE")]
        path: PathBuf,
    },

    /// Generate shell completions for qrayti
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Qrayti - study aids from course material
///
/// Turns PDFs and pasted text into multiple-choice quizzes and structured
/// summaries in French, with explanations transliterated into Darija.
#[derive(Parser, Debug)]
#[command(name = "qrayti")]
#[command(version)]
#[command(about = "AI-powered quiz and summary generation API")]
#[command(long_about = "Qrayti serves an HTTP API that extracts text from PDFs and generates quizzes and summaries with a local model.

EXAMPLES:
    qrayti                                  # Serve with defaults and environment overrides
    qrayti --port 9000 --model gemma:2b     # Serve on another port with another model
    qrayti -c qrayti.json serve             # Serve with a config file
    qrayti extract cours.pdf                # Print the extracted document as JSON
    qrayti completions bash > qrayti.bash   # Generate bash completions

CONFIGURATION:
    Settings come from defaults, then the optional JSON config file, then
    environment variables (LOCAL_MODEL_NAME, MODEL_ENDPOINT, DEVICE, PORT, ...),
    then the flags below.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bind host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Model name to serve
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Dependencies (hyper, reqwest) only surface warnings and errors
        let own_crate = metadata.target().starts_with("qrayti");
        metadata.level() <= self.level && (own_crate || metadata.level() <= Level::Warn)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration says otherwise
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "qrayti", &mut std::io::stdout());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    match cli.command {
        Some(Commands::Extract { path }) => run_extract(&controller, &path),
        Some(Commands::Serve) | None => controller.run_server().await,
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

/// Defaults, then config file, then environment, then flags
fn resolve_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) if path.exists() => Config::from_file(path)?,
        Some(path) => {
            warn!("Config file not found at '{}', using defaults.", path.display());
            Config::default()
        }
        None => Config::default(),
    };

    config
        .apply_env()
        .context("Invalid environment configuration")?;

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

fn run_extract(controller: &Controller, path: &Path) -> Result<()> {
    let document = controller.extract_file(path)?;
    info!(
        "Extracted {} characters (~{} pages) from {}",
        document.content.chars().count(),
        document.page_count,
        document.file_name
    );
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
