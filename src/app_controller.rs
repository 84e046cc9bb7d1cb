use anyhow::{anyhow, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::capabilities::{CapabilityKind, CapabilityRegistry, ProbeOutcome};
use crate::file_utils::FileManager;
use crate::history::{HistoryStore, RunRow, StageRow};
use crate::language_utils;
use crate::pipeline::{PipelineInput, PipelineRunner, RunProgress, RunReport};
use crate::providers::{
    OllamaClient, OllamaDetector, OllamaExtractor, OllamaRewriter, OllamaSummarizer,
    OllamaTranslator,
};

// @module: Application controller for image analysis

/// Main application controller driving the analysis pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Pipeline runner holding the capability registry
    runner: PipelineRunner,
    // @field: Client shared by all Ollama-backed capabilities
    client: OllamaClient,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let client = OllamaClient::from_url(&config.provider.endpoint);
        let registry = Self::build_registry(&config, &client);
        let runner = PipelineRunner::new(registry, config.runner_options());

        Ok(Self {
            config,
            runner,
            client,
        })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.target_language.is_empty() && !self.config.default_source_language.is_empty()
    }

    /// Wire Ollama-backed capabilities into a registry. The vision model
    /// serves extraction; every text capability shares the text model.
    /// The rewriter is only registered when the rewrite stage is enabled.
    fn build_registry(config: &Config, client: &OllamaClient) -> CapabilityRegistry {
        let vision_model = &config.provider.vision_model;
        let text_model = &config.provider.text_model;

        let mut registry = CapabilityRegistry::new()
            .with_extractor(Arc::new(OllamaExtractor::new(client.clone(), vision_model)))
            .with_detector(Arc::new(OllamaDetector::new(client.clone(), text_model)))
            .with_translator(Arc::new(OllamaTranslator::new(client.clone(), text_model)))
            .with_summarizer(Arc::new(OllamaSummarizer::new(client.clone(), text_model)));

        if config.rewrite.enabled {
            registry =
                registry.with_rewriter(Arc::new(OllamaRewriter::new(client.clone(), text_model)));
        }

        registry
    }

    /// Run the main workflow for a single image file
    pub async fn run(&self, input_file: PathBuf, force_overwrite: bool) -> Result<()> {
        let multi_progress = MultiProgress::new();
        let report = self
            .run_with_progress(&input_file, &multi_progress, force_overwrite)
            .await?;

        if let Some(report) = report {
            if !report.succeeded() {
                return Err(anyhow!("Analysis did not complete successfully"));
            }
        }

        Ok(())
    }

    /// Run the workflow on text that was already extracted elsewhere.
    /// The extraction stage passes the text through untouched.
    pub async fn run_text(&self, text: &str) -> Result<()> {
        let input = PipelineInput::from_text(text, &self.config.target_language);
        let multi_progress = MultiProgress::new();

        let report = self.analyze(&input, &multi_progress).await?;

        if !report.succeeded() {
            error!(
                "Analysis failed: {}",
                report.error.as_deref().unwrap_or("unknown error")
            );
            return Err(anyhow!("Analysis did not complete successfully"));
        }

        self.display_report(&report);
        Ok(())
    }

    /// Run the controller for one file with progress reporting.
    /// Returns None when the file was skipped because a report already exists.
    async fn run_with_progress(
        &self,
        input_file: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<Option<RunReport>> {
        let start_time = std::time::Instant::now();

        // Check if the input file exists
        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        // Check if a report already exists
        let report_path = FileManager::report_path(input_file, &self.config.target_language);
        if report_path.exists() && !force_overwrite {
            warn!("Skipping file, report already exists (use -f to force overwrite)");
            return Ok(None);
        }

        let image = FileManager::load_image(input_file)?;
        let input = PipelineInput::from_image(image, &self.config.target_language);

        let report = self.analyze(&input, multi_progress).await?;

        if report.succeeded() {
            self.display_report(&report);

            let content = self.build_report_content(input_file, &report);
            FileManager::write_atomic(&report_path, &content)?;

            info!("Success: {}", report_path.display());
            info!(
                "Analysis completed in {}",
                Self::format_duration(start_time.elapsed())
            );
        } else {
            error!(
                "Analysis failed: {}",
                report.error.as_deref().unwrap_or("unknown error")
            );
            if report.failed_by_restriction() {
                warn!("The model declined to process this content");
            }
        }

        Ok(Some(report))
    }

    /// Run the pipeline for one input with a spinner fed by stage progress
    async fn analyze(
        &self,
        input: &PipelineInput,
        multi_progress: &MultiProgress,
    ) -> Result<RunReport> {
        info!(
            "lenslate: {} -> {}",
            self.config.provider.vision_model, self.config.target_language
        );

        let spinner = multi_progress.add(ProgressBar::new_spinner());
        let template_result = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(template_result);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message("Starting analysis");

        let pb = spinner.clone();
        let progress: Box<dyn Fn(RunProgress) + Send + Sync> = Box::new(move |update| {
            pb.set_message(format!(
                "[{}/{}] {}",
                update.stage_index, update.total_stages, update.status
            ));
        });

        let plan = self.config.stage_plan()?;
        let report = self.runner.run(input, &plan, Some(progress)).await?;

        spinner.finish_and_clear();

        self.record_history(input, &report).await;

        Ok(report)
    }

    /// Record a completed run in the local history database.
    /// History is an observation channel, failures only produce warnings.
    async fn record_history(&self, input: &PipelineInput, report: &RunReport) {
        let store = match HistoryStore::open_default() {
            Ok(store) => store,
            Err(e) => {
                warn!("Could not open run history database: {}", e);
                return;
            }
        };

        let run = RunRow::from_report(input, report);
        let stages = StageRow::rows_for(&run.id, report);

        if let Err(e) = store.record_run(run, stages).await {
            warn!("Could not record run history: {}", e);
        }
    }

    /// Print the stage outputs of a successful run
    fn display_report(&self, report: &RunReport) {
        if let Some(text) = report.extracted_text() {
            Self::print_section("Extracted text", text);
        }

        if let Some(text) = report.translated_text() {
            let title = match language_utils::get_language_name(&self.config.target_language) {
                Ok(name) => format!("Translation ({})", name),
                Err(_) => "Translation".to_string(),
            };
            Self::print_section(&title, text);
        }

        if let Some(text) = report.summary_text() {
            Self::print_section("Summary", text);
        }

        if let Some(text) = report.rewritten_text() {
            Self::print_section("Rewrite", text);
        }

        println!();
    }

    fn print_section(title: &str, body: &str) {
        println!();
        println!("=== {} ===", title);
        println!("{}", body);
    }

    /// Build the text content written next to the analyzed image
    fn build_report_content(&self, input_file: &Path, report: &RunReport) -> String {
        let mut content = String::new();

        content.push_str(&format!(
            "lenslate report - {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        content.push_str(&format!("Source: {}\n", input_file.display()));
        content.push_str(&format!(
            "Target language: {}\n",
            self.config.target_language
        ));

        if let Some(text) = report.extracted_text() {
            content.push_str("\n=== Extracted text ===\n");
            content.push_str(text);
            content.push('\n');
        }

        if let Some(text) = report.translated_text() {
            content.push_str("\n=== Translation ===\n");
            content.push_str(text);
            content.push('\n');
        }

        if let Some(text) = report.summary_text() {
            content.push_str("\n=== Summary ===\n");
            content.push_str(text);
            content.push('\n');
        }

        if let Some(text) = report.rewritten_text() {
            content.push_str("\n=== Rewrite ===\n");
            content.push_str(text);
            content.push('\n');
        }

        content
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Run the workflow in folder mode, analyzing all image files in a directory.
    /// Files that already have a report are skipped unless overwrite is forced.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        // Check if the input directory exists
        if !input_dir.exists() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let image_files = FileManager::find_image_files(&input_dir)?;

        if image_files.is_empty() {
            return Err(anyhow!("No image files found in directory: {:?}", input_dir));
        }

        // Create multi-progress instance for multiple file processing
        let multi_progress = MultiProgress::new();

        let folder_pb = multi_progress.add(ProgressBar::new(image_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        // Track success and failure counts
        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for image_file in image_files.iter() {
            let file_name = image_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            folder_pb.set_message(format!("Processing: {}", file_name));

            let report_path = FileManager::report_path(image_file, &self.config.target_language);
            if report_path.exists() && !force_overwrite {
                warn!("Skipping file, report already exists (use -f to force overwrite)");
                skip_count += 1;
                folder_pb.inc(1);
                continue;
            }

            match self
                .run_with_progress(image_file, &multi_progress, force_overwrite)
                .await
            {
                Ok(Some(report)) if report.succeeded() => {
                    success_count += 1;
                }
                Ok(Some(_)) => {
                    // Failure details were already logged by the single-file path
                    error_count += 1;
                }
                Ok(None) => {
                    skip_count += 1;
                }
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let duration = start_time.elapsed();

        info!(
            "Folder processing completed: {} analyzed, {} skipped, {} errors in {}",
            success_count,
            skip_count,
            error_count,
            Self::format_duration(duration)
        );

        Ok(())
    }

    /// Probe every capability and print its availability
    pub async fn probe(&self) -> Result<()> {
        info!("Probing capabilities at {}", self.config.provider.endpoint);

        match self.client.version().await {
            Ok(version) => info!("Ollama server version {}", version),
            Err(e) => warn!("Ollama server not reachable: {}", e),
        }

        let results = self.runner.registry().probe_all().await;

        println!();
        for (kind, outcome) in &results {
            println!("{:<12} {}", kind.display_name(), outcome);
        }
        println!();

        for (kind, outcome) in &results {
            if matches!(outcome, ProbeOutcome::Downloadable) {
                let model = match kind {
                    CapabilityKind::Extractor => &self.config.provider.vision_model,
                    _ => &self.config.provider.text_model,
                };
                info!("Model '{}' is not installed, run: ollama pull {}", model, model);
            }
        }

        Ok(())
    }

    /// Print the most recent analysis runs from the history database
    pub async fn show_history(&self, limit: usize) -> Result<()> {
        let store = HistoryStore::open_default()?;
        let runs = store.recent_runs(limit).await?;

        if runs.is_empty() {
            info!("No recorded runs yet");
            return Ok(());
        }

        println!();
        println!(
            "{:<20} {:<10} {:>9} {:<7} SOURCE",
            "WHEN", "OUTCOME", "TIME", "TARGET"
        );
        for run in runs {
            let when: String = run.created_at.chars().take(19).collect();
            println!(
                "{:<20} {:<10} {:>8.1}s {:<7} {}",
                when,
                run.outcome.to_string(),
                run.duration_ms as f64 / 1000.0,
                run.target_language,
                run.source
            );
            if let Some(error) = run.error {
                println!("{:<20} {}", "", error);
            }
        }
        println!();

        Ok(())
    }
}
