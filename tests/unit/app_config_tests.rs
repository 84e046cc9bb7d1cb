/*!
 * Tests for application configuration functionality
 */

use std::str::FromStr;

use lenslate::app_config::{Config, LogLevel};
use lenslate::capabilities::{RewriteStyle, SummaryFormat, SummaryKind, SummaryLength};
use lenslate::pipeline::StageKind;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    // Test default values
    assert_eq!(config.target_language, "en");
    assert_eq!(config.default_source_language, "en");
    assert_eq!(config.log_level, LogLevel::Info);

    // Provider defaults
    assert_eq!(config.provider.endpoint, "http://localhost:11434");
    assert_eq!(config.provider.vision_model, "llava");
    assert_eq!(config.provider.text_model, "llama3.1");

    // Summary defaults
    assert!(config.summary.enabled);
    assert_eq!(config.summary.kind, SummaryKind::KeyPoints);
    assert_eq!(config.summary.format, SummaryFormat::PlainText);
    assert_eq!(config.summary.length, SummaryLength::Short);
    assert_eq!(
        config.summary.context.as_deref(),
        Some("Make this concise and actionable for a traveler.")
    );

    // Rewrite is off by default
    assert!(!config.rewrite.enabled);
    assert_eq!(config.rewrite.style, RewriteStyle::Simple);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    // Start with a valid config
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Invalid target language
    config.target_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.target_language = "en".to_string();

    // Invalid fallback source language
    config.default_source_language = "".to_string();
    assert!(config.validate().is_err());
    config.default_source_language = "en".to_string();

    // Endpoint must parse as a URL
    config.provider.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.provider.endpoint = "http://localhost:11434".to_string();

    // Models cannot be blank
    config.provider.vision_model = "".to_string();
    assert!(config.validate().is_err());
    config.provider.vision_model = "llava".to_string();

    config.provider.text_model = "   ".to_string();
    assert!(config.validate().is_err());
    config.provider.text_model = "llama3.1".to_string();

    assert!(config.validate().is_ok());
}

/// Test that a partial config file falls back to defaults for missing fields
#[test]
fn test_config_parsing_withPartialJson_shouldApplyDefaults() {
    let config: Config =
        serde_json::from_str(r#"{"target_language": "fr"}"#).expect("partial config should parse");

    assert_eq!(config.target_language, "fr");
    assert_eq!(config.default_source_language, "en");
    assert_eq!(config.provider.endpoint, "http://localhost:11434");
    assert!(config.summary.enabled);
    assert!(!config.rewrite.enabled);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that the style enums use their kebab-case wire names in JSON
#[test]
fn test_config_parsing_withSummarySettings_shouldParseKebabCaseNames() {
    let config: Config = serde_json::from_str(
        r#"{
            "summary": {"kind": "tldr", "length": "medium", "format": "markdown"},
            "rewrite": {"enabled": true, "style": "concise"}
        }"#,
    )
    .expect("config with summary settings should parse");

    assert_eq!(config.summary.kind, SummaryKind::Tldr);
    assert_eq!(config.summary.length, SummaryLength::Medium);
    assert_eq!(config.summary.format, SummaryFormat::Markdown);
    assert!(config.rewrite.enabled);
    assert_eq!(config.rewrite.style, RewriteStyle::Concise);
}

/// Test the stage plan built from the default configuration
#[test]
fn test_stagePlan_withDefaultConfig_shouldIncludeSummarize() {
    let config = Config::default();
    let plan = config.stage_plan().expect("default plan should build");

    assert_eq!(plan.len(), 3);
    assert!(plan.contains(StageKind::Extract));
    assert!(plan.contains(StageKind::Translate));
    assert!(plan.contains(StageKind::Summarize));
    assert!(!plan.contains(StageKind::Rewrite));
}

/// Test the stage plan with the rewrite stage enabled
#[test]
fn test_stagePlan_withRewriteEnabled_shouldAppendRewrite() {
    let mut config = Config::default();
    config.rewrite.enabled = true;

    let plan = config.stage_plan().expect("plan with rewrite should build");

    assert_eq!(plan.len(), 4);
    assert!(plan.contains(StageKind::Rewrite));
}

/// Test the stage plan with the summary stage disabled
#[test]
fn test_stagePlan_withSummaryDisabled_shouldOmitSummarize() {
    let mut config = Config::default();
    config.summary.enabled = false;
    config.rewrite.enabled = true;

    let plan = config.stage_plan().expect("plan without summary should build");

    assert_eq!(plan.len(), 3);
    assert!(!plan.contains(StageKind::Summarize));
    assert!(plan.contains(StageKind::Rewrite));
}

/// Test that runner options carry the configured settings
#[test]
fn test_runnerOptions_withCustomConfig_shouldCarrySettings() {
    let mut config = Config::default();
    config.default_source_language = "fr".to_string();
    config.rewrite.style = RewriteStyle::Concise;
    config.summary.kind = SummaryKind::Headline;

    let options = config.runner_options();

    assert_eq!(options.default_source_language, "fr");
    assert_eq!(options.rewrite_style, RewriteStyle::Concise);
    assert_eq!(options.summary.kind, SummaryKind::Headline);
}

/// Test log level parsing from strings
#[test]
fn test_logLevel_fromStr_shouldParseKnownLevels() {
    assert_eq!(LogLevel::from_str("error").expect("should parse"), LogLevel::Error);
    assert_eq!(LogLevel::from_str("WARN").expect("should parse"), LogLevel::Warn);
    assert_eq!(LogLevel::from_str("Info").expect("should parse"), LogLevel::Info);
    assert_eq!(LogLevel::from_str("debug").expect("should parse"), LogLevel::Debug);
    assert_eq!(LogLevel::from_str("trace").expect("should parse"), LogLevel::Trace);
    assert!(LogLevel::from_str("verbose").is_err());
}

/// Test log level display and filter conversion
#[test]
fn test_logLevel_conversions_shouldMatchLogCrate() {
    assert_eq!(LogLevel::Warn.to_string(), "warn");
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Info.to_level_filter(), log::LevelFilter::Info);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
