/*!
 * Ollama-backed capability implementations.
 *
 * One HTTP client speaks the Ollama REST API; each capability adapter binds
 * it to a model name. Availability is decided from `/api/tags`: an installed
 * model is available, a reachable daemon without the model is downloadable,
 * and an unreachable daemon surfaces as a connection error.
 */

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::capabilities::{
    CapabilityAvailability, ExtractionRequest, LanguageDetection, LanguageGuess, RewriteStyle,
    Rewriting, Summarization, SummaryOptions, TextExtractor, Translation,
};
use crate::errors::ProviderError;
use crate::pipeline::input::ImageArtifact;
use crate::prompts::{self, PromptTemplate};

/// Default endpoint of a locally running Ollama daemon
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Base64-encoded images attached to the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    /// Format to return a response in
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerateOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
    /// Number of prompt tokens
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    pub eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

impl GenerateRequest {
    /// Create a new non-streaming generate request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            images: None,
            format: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Attach base64-encoded images
    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }

    /// Set the format
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        match &mut self.options {
            Some(options) => options.temperature = Some(temperature),
            None => {
                self.options = Some(GenerateOptions {
                    temperature: Some(temperature),
                    num_predict: None,
                });
            }
        }
        self
    }
}

/// Client for the Ollama REST API
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

impl OllamaClient {
    /// Create a new client for the given host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_url(normalize_base_url(&host.into(), port))
    }

    /// Create a new client from a complete URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            base_url: url.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text and return the model reply
    pub async fn generate(&self, request: GenerateRequest) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::ConnectionError(format!(
                    "Failed to reach Ollama at {}: {}",
                    self.base_url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            error!("Ollama API error ({}): {}", status, truncate_for_log(&message));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::RequestFailed(format!("Failed to read Ollama response: {}", e))
        })?;

        match serde_json::from_str::<GenerateResponse>(&body) {
            Ok(parsed) => Ok(parsed.response),
            Err(parse_error) => {
                // Lenient fallback for replies missing expected fields
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
                    if let Some(text) = value.get("response").and_then(|v| v.as_str()) {
                        return Ok(text.to_string());
                    }
                }

                error!(
                    "Failed to parse Ollama response: {}. Raw response (first 200 chars): {}",
                    parse_error,
                    truncate_for_log(&body)
                );
                Err(ProviderError::ParseError(format!(
                    "Invalid Ollama response: {}",
                    parse_error
                )))
            }
        }
    }

    /// List the names of the models installed on the daemon
    pub async fn installed_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            ProviderError::ConnectionError(format!(
                "Failed to reach Ollama at {}: {}",
                self.base_url, e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            ProviderError::ParseError(format!("Invalid Ollama tags response: {}", e))
        })?;

        Ok(tags.models.into_iter().map(|model| model.name).collect())
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);

        let value: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                ProviderError::ConnectionError(format!(
                    "Failed to reach Ollama at {}: {}",
                    self.base_url, e
                ))
            })?
            .json()
            .await
            .map_err(|e| {
                ProviderError::ParseError(format!("Invalid Ollama version response: {}", e))
            })?;

        value["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::ParseError("Missing version field in Ollama response".to_string())
            })
    }

    /// Report whether a model can serve requests right now
    pub async fn model_availability(
        &self,
        model: &str,
    ) -> Result<CapabilityAvailability, ProviderError> {
        let installed = self.installed_models().await?;

        if installed.iter().any(|name| model_matches(name, model)) {
            Ok(CapabilityAvailability::Available)
        } else {
            debug!("Model {} not installed, reporting it as downloadable", model);
            Ok(CapabilityAvailability::Downloadable)
        }
    }
}

/// Match an installed tag against a configured model name.
///
/// A bare configured name matches any tag of that model ("llava" matches
/// "llava:latest"); a name carrying a tag must match exactly.
fn model_matches(installed: &str, wanted: &str) -> bool {
    if installed == wanted {
        return true;
    }
    if wanted.contains(':') {
        return false;
    }
    installed.split(':').next() == Some(wanted)
}

fn normalize_base_url(host: &str, port: u16) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        match host.split_once("://") {
            Some((scheme, rest)) if !rest.is_empty() => {
                if rest.contains(':') {
                    host.to_string()
                } else {
                    format!("{}://{}:{}", scheme, rest, port)
                }
            }
            _ => format!("http://localhost:{}", port),
        }
    } else {
        format!("http://{}:{}", host, port)
    }
}

fn truncate_for_log(text: &str) -> String {
    if text.chars().count() > 200 {
        text.chars().take(200).collect()
    } else {
        text.to_string()
    }
}

/// Parse a detector reply into language guesses.
///
/// Accepts a bare JSON array, and falls back to the first bracketed slice
/// for models that wrap the array in prose or an enclosing object.
fn parse_language_guesses(raw: &str) -> Result<Vec<LanguageGuess>, ProviderError> {
    let trimmed = raw.trim();

    if let Ok(guesses) = serde_json::from_str::<Vec<LanguageGuess>>(trimmed) {
        return Ok(guesses);
    }

    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            if let Ok(guesses) = serde_json::from_str::<Vec<LanguageGuess>>(&trimmed[start..=end])
            {
                return Ok(guesses);
            }
        }
    }

    Err(ProviderError::ParseError(format!(
        "Language detection reply is not a guess array: {}",
        truncate_for_log(trimmed)
    )))
}

/// Text extraction backed by a multimodal Ollama model
#[derive(Debug, Clone)]
pub struct OllamaExtractor {
    client: OllamaClient,
    model: String,
}

impl OllamaExtractor {
    /// Create a new extractor bound to a vision model
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextExtractor for OllamaExtractor {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.client.model_availability(&self.model).await
    }

    async fn extract(
        &self,
        image: &ImageArtifact,
        request: &ExtractionRequest,
    ) -> Result<String, ProviderError> {
        debug!(
            "Sending {} image ({} bytes) to model {}",
            image.format,
            image.bytes.len(),
            self.model
        );

        let encoded = BASE64.encode(&image.bytes);
        let generate = GenerateRequest::new(&self.model, &request.instruction)
            .system(PromptTemplate::EXTRACTOR_SYSTEM)
            .images(vec![encoded])
            .temperature(0.0);

        self.client.generate(generate).await
    }
}

/// Language detection backed by an Ollama model
#[derive(Debug, Clone)]
pub struct OllamaDetector {
    client: OllamaClient,
    model: String,
}

impl OllamaDetector {
    /// Create a new detector
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl LanguageDetection for OllamaDetector {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.client.model_availability(&self.model).await
    }

    async fn detect(&self, text: &str) -> Result<Vec<LanguageGuess>, ProviderError> {
        let generate = GenerateRequest::new(&self.model, &prompts::detection_prompt(text))
            .format("json")
            .temperature(0.0);

        let raw = self.client.generate(generate).await?;
        parse_language_guesses(&raw)
    }
}

/// Translation backed by an Ollama model
#[derive(Debug, Clone)]
pub struct OllamaTranslator {
    client: OllamaClient,
    model: String,
}

impl OllamaTranslator {
    /// Create a new translator
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Translation for OllamaTranslator {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.client.model_availability(&self.model).await
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let prompt = prompts::translation_prompt(text, source_language, target_language);
        let generate = GenerateRequest::new(&self.model, &prompt).temperature(0.3);

        self.client.generate(generate).await
    }
}

/// Summarization backed by an Ollama model
#[derive(Debug, Clone)]
pub struct OllamaSummarizer {
    client: OllamaClient,
    model: String,
}

impl OllamaSummarizer {
    /// Create a new summarizer
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Summarization for OllamaSummarizer {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.client.model_availability(&self.model).await
    }

    async fn summarize(
        &self,
        text: &str,
        options: &SummaryOptions,
    ) -> Result<String, ProviderError> {
        let prompt = prompts::summary_prompt(text, options);
        let generate = GenerateRequest::new(&self.model, &prompt).temperature(0.3);

        self.client.generate(generate).await
    }
}

/// Rewriting backed by an Ollama model
#[derive(Debug, Clone)]
pub struct OllamaRewriter {
    client: OllamaClient,
    model: String,
}

impl OllamaRewriter {
    /// Create a new rewriter
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Rewriting for OllamaRewriter {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.client.model_availability(&self.model).await
    }

    async fn rewrite(&self, text: &str, style: RewriteStyle) -> Result<String, ProviderError> {
        let prompt = prompts::rewrite_prompt(text, style);
        let generate = GenerateRequest::new(&self.model, &prompt).temperature(0.3);

        self.client.generate(generate).await
    }
}
