/*!
 Application configuration for lenslate.

 The configuration is stored as JSON and drives every part of an analysis
 run: the target language, the Ollama endpoint and models, whether the
 summary and rewrite stages run, and the logging level. Missing fields
 fall back to defaults so a minimal config file stays valid.
*/

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::capabilities::{RewriteStyle, SummaryFormat, SummaryKind, SummaryLength, SummaryOptions};
use crate::pipeline::runner::RunnerOptions;
use crate::pipeline::stage::{StageDescriptor, StageKind, StagePlan};
use crate::providers::DEFAULT_OLLAMA_ENDPOINT;

/// Log level for application logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl LogLevel {
    /// Get the lowercase string representation
    pub fn to_lowercase_string(&self) -> String {
        match self {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }

    /// Convert to the level filter used by the log facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(anyhow!("Unknown log level: {}", s)),
        }
    }
}

/// Main configuration for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target language code for translation (ISO 639-1 or 639-2)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Fallback source language code used when detection fails
    #[serde(default = "default_source_language")]
    pub default_source_language: String,

    /// Connection and model settings for the Ollama backend
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Settings for the optional summary stage
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Settings for the optional rewrite stage
    #[serde(default)]
    pub rewrite: RewriteConfig,

    /// Log level for application logging
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Connection and model settings for the Ollama backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Multimodal model used to read text out of images
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Text model used for detection, translation, summaries and rewrites
    #[serde(default = "default_text_model")]
    pub text_model: String,
}

/// Settings for the optional summary stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Whether a summary stage is part of the pipeline
    #[serde(default = "default_summary_enabled")]
    pub enabled: bool,

    /// Kind of summary to request
    #[serde(default = "default_summary_kind")]
    pub kind: SummaryKind,

    /// Output format for the summary
    #[serde(default = "default_summary_format")]
    pub format: SummaryFormat,

    /// Requested summary length
    #[serde(default = "default_summary_length")]
    pub length: SummaryLength,

    /// Extra context steering what the summary focuses on
    #[serde(default = "default_summary_context")]
    pub context: Option<String>,
}

/// Settings for the optional rewrite stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Whether a rewrite stage is appended to the pipeline
    #[serde(default)]
    pub enabled: bool,

    /// Style the rewrite should target
    #[serde(default = "default_rewrite_style")]
    pub style: RewriteStyle,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Both language codes must resolve to a known language
        let _target_name = crate::language_utils::get_language_name(&self.target_language)
            .context(format!("Invalid target language code: {}", self.target_language))?;
        let _source_name = crate::language_utils::get_language_name(&self.default_source_language)
            .context(format!(
                "Invalid default source language code: {}",
                self.default_source_language
            ))?;

        url::Url::parse(&self.provider.endpoint)
            .context(format!("Invalid provider endpoint: {}", self.provider.endpoint))?;

        if self.provider.vision_model.trim().is_empty() {
            return Err(anyhow!("Vision model cannot be empty"));
        }

        if self.provider.text_model.trim().is_empty() {
            return Err(anyhow!("Text model cannot be empty"));
        }

        Ok(())
    }

    /// Build the summary options requested by this configuration
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            kind: self.summary.kind,
            format: self.summary.format,
            length: self.summary.length,
            context: self.summary.context.clone(),
        }
    }

    /// Build the runner options derived from this configuration
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions::new()
            .with_summary(self.summary_options())
            .with_rewrite_style(self.rewrite.style)
            .with_default_source_language(&self.default_source_language)
    }

    /// Build the stage plan requested by this configuration.
    /// Extraction and translation always run; summary and rewrite are
    /// appended as optional stages when enabled.
    pub fn stage_plan(&self) -> Result<StagePlan> {
        let mut stages = vec![
            StageDescriptor::required(StageKind::Extract),
            StageDescriptor::required(StageKind::Translate),
        ];

        if self.summary.enabled {
            stages.push(StageDescriptor::optional(StageKind::Summarize));
        }

        if self.rewrite.enabled {
            stages.push(StageDescriptor::optional(StageKind::Rewrite));
        }

        Ok(StagePlan::new(stages)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            default_source_language: default_source_language(),
            provider: ProviderConfig::default(),
            summary: SummaryConfig::default(),
            rewrite: RewriteConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            endpoint: default_endpoint(),
            vision_model: default_vision_model(),
            text_model: default_text_model(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        SummaryConfig {
            enabled: default_summary_enabled(),
            kind: default_summary_kind(),
            format: default_summary_format(),
            length: default_summary_length(),
            context: default_summary_context(),
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        RewriteConfig {
            enabled: false,
            style: default_rewrite_style(),
        }
    }
}

// Default configuration values

fn default_target_language() -> String {
    "en".to_string()
}

fn default_source_language() -> String {
    crate::language_utils::DEFAULT_SOURCE_LANGUAGE.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_OLLAMA_ENDPOINT.to_string()
}

fn default_vision_model() -> String {
    "llava".to_string()
}

fn default_text_model() -> String {
    "llama3.1".to_string()
}

fn default_summary_enabled() -> bool {
    true
}

fn default_summary_kind() -> SummaryKind {
    SummaryKind::KeyPoints
}

fn default_summary_format() -> SummaryFormat {
    SummaryFormat::PlainText
}

fn default_summary_length() -> SummaryLength {
    SummaryLength::Short
}

fn default_summary_context() -> Option<String> {
    Some("Make this concise and actionable for a traveler.".to_string())
}

fn default_rewrite_style() -> RewriteStyle {
    RewriteStyle::Simple
}
