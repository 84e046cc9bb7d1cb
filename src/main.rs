// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::{Config, LogLevel};
use crate::capabilities::RewriteStyle;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod capabilities;
mod errors;
mod file_utils;
mod history;
mod language_utils;
mod pipeline;
mod prompts;
mod providers;
mod sanitize;

/// CLI Wrapper for RewriteStyle to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliRewriteStyle {
    Formal,
    Casual,
    Simple,
    Concise,
}

impl From<CliRewriteStyle> for RewriteStyle {
    fn from(cli_style: CliRewriteStyle) -> Self {
        match cli_style {
            CliRewriteStyle::Formal => RewriteStyle::Formal,
            CliRewriteStyle::Casual => RewriteStyle::Casual,
            CliRewriteStyle::Simple => RewriteStyle::Simple,
            CliRewriteStyle::Concise => RewriteStyle::Concise,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze an image of foreign-language text (default command)
    #[command(alias = "analyse")]
    Analyze(AnalyzeArgs),

    /// Check which capabilities the configured models provide
    Probe {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// List recent analysis runs
    History {
        /// Maximum number of runs to list
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for lenslate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Input image file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Analyze already-extracted text instead of an image
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// Force overwrite of existing report files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Multimodal model used to read text out of images
    #[arg(long)]
    vision_model: Option<String>,

    /// Text model used for translation, summaries and rewrites
    #[arg(short, long)]
    model: Option<String>,

    /// Ollama endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Skip the summary stage
    #[arg(long)]
    no_summary: bool,

    /// Append a rewrite stage with the given style
    #[arg(short, long, value_enum)]
    rewrite: Option<CliRewriteStyle>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// lenslate - Point a local model at a photo of another language
///
/// A travel companion that reads signs, menus and documents out of photos
/// and turns them into text you can actually use.
#[derive(Parser, Debug)]
#[command(name = "lenslate")]
#[command(version = "0.1.0")]
#[command(about = "AI-powered image text analysis and translation tool")]
#[command(long_about = "lenslate points a local Ollama model at photos of signs, menus and
documents, reads the text out of them and walks it through translation,
an optional summary and an optional style rewrite.

EXAMPLES:
    lenslate menu.jpg                          # Analyze using default config
    lenslate -f menu.jpg                       # Force overwrite an existing report
    lenslate -t fr menu.jpg                    # Translate into French
    lenslate --vision-model llava:13b sign.png # Use a specific vision model
    lenslate --no-summary receipt.webp         # Skip the summary stage
    lenslate -r simple letter.jpg              # Append a simplifying rewrite
    lenslate --text \"Hola mundo\" -t en         # Analyze already-extracted text
    lenslate photos/                           # Analyze every image in a folder
    lenslate probe                             # Check model availability
    lenslate history                           # List recent analysis runs
    lenslate completions bash > lenslate.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

STAGES:
    extract    - Read the text out of the image (multimodal model)
    translate  - Detect the source language and translate into the target
    summarize  - Optional summary of the translation
    rewrite    - Optional style rewrite of the final text")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input image file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Analyze already-extracted text instead of an image
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// Force overwrite of existing report files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Multimodal model used to read text out of images
    #[arg(long)]
    vision_model: Option<String>,

    /// Text model used for translation, summaries and rewrites
    #[arg(short, long)]
    model: Option<String>,

    /// Ollama endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Skip the summary stage
    #[arg(long)]
    no_summary: bool,

    /// Append a rewrite stage with the given style
    #[arg(short, long, value_enum)]
    rewrite: Option<CliRewriteStyle>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");

            let mut stderr = std::io::stderr();
            let emoji = Self::get_emoji_for_level(record.level());
            let _ = match record.level() {
                Level::Error => {
                    writeln!(stderr, "\x1B[1;31m{} {} {}\x1B[0m", now, emoji, record.args())
                }
                Level::Warn => {
                    writeln!(stderr, "\x1B[1;33m{} {} {}\x1B[0m", now, emoji, record.args())
                }
                Level::Info => {
                    writeln!(stderr, "\x1B[1;32m{} {} {}\x1B[0m", now, emoji, record.args())
                }
                Level::Debug => {
                    writeln!(stderr, "\x1B[1;36m{} {} {}\x1B[0m", now, emoji, record.args())
                }
                Level::Trace => {
                    writeln!(stderr, "\x1B[1;35m{} {} {}\x1B[0m", now, emoji, record.args())
                }
            };
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lenslate", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Probe { config_path }) => run_probe(&config_path).await,
        Some(Commands::History { limit, config_path }) => run_history(limit, &config_path).await,
        Some(Commands::Analyze(args)) => run_analyze(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let analyze_args = AnalyzeArgs {
                input_path: cli.input_path,
                text: cli.text,
                force_overwrite: cli.force_overwrite,
                target_language: cli.target_language,
                vision_model: cli.vision_model,
                model: cli.model,
                endpoint: cli.endpoint,
                no_summary: cli.no_summary,
                rewrite: cli.rewrite,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_analyze(analyze_args).await
        }
    }
}

/// Load the configuration file, creating a default one when it does not exist
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        Ok(config)
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
    }
}

async fn run_analyze(options: AnalyzeArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let mut config = load_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(endpoint) = &options.endpoint {
        config.provider.endpoint = endpoint.clone();
    }

    if let Some(vision_model) = &options.vision_model {
        config.provider.vision_model = vision_model.clone();
    }

    if let Some(model) = &options.model {
        config.provider.text_model = model.clone();
    }

    if options.no_summary {
        config.summary.enabled = false;
    }

    if let Some(style) = &options.rewrite {
        config.rewrite.enabled = true;
        config.rewrite.style = style.clone().into();
    }

    // Update log level in config if specified via command line
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    // Text input skips extraction and goes straight through the rest of the pipeline
    if let Some(text) = &options.text {
        if options.input_path.is_some() {
            return Err(anyhow!("Cannot combine INPUT_PATH with --text"));
        }
        return controller.run_text(text).await;
    }

    let input_path = options
        .input_path
        .ok_or_else(|| anyhow!("INPUT_PATH is required when --text is not given"))?;

    // Run the controller with the input file or folder
    if input_path.is_file() {
        controller.run(input_path, options.force_overwrite).await?;
    } else if input_path.is_dir() {
        controller
            .run_folder(input_path, options.force_overwrite)
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}

async fn run_probe(config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    controller.probe().await
}

async fn run_history(limit: usize, config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    controller.show_history(limit).await
}
