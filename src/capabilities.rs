/*!
 * Capability contracts for the external AI services the pipeline drives.
 *
 * Every hard capability (text extraction, language detection, translation,
 * summarization, rewriting) is an external model service behind a trait.
 * The registry holds whichever implementations the host wired in; stages
 * reach services only through it, so absence is a value, not a runtime
 * existence check.
 */

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::{ProviderError, StageError};
use crate::pipeline::input::ImageArtifact;

/// The capability kinds the pipeline can call on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// Multimodal text extraction from images
    Extractor,
    /// Source language detection
    Detector,
    /// Text translation
    Translator,
    /// Text summarization
    Summarizer,
    /// Stylistic rewriting
    Rewriter,
}

impl CapabilityKind {
    /// Every capability kind, in declaration order
    pub const ALL: [CapabilityKind; 5] = [
        CapabilityKind::Extractor,
        CapabilityKind::Detector,
        CapabilityKind::Translator,
        CapabilityKind::Summarizer,
        CapabilityKind::Rewriter,
    ];

    /// Get the kind as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Extractor => "extractor",
            CapabilityKind::Detector => "detector",
            CapabilityKind::Translator => "translator",
            CapabilityKind::Summarizer => "summarizer",
            CapabilityKind::Rewriter => "rewriter",
        }
    }

    /// Get a human-readable name for display purposes
    pub fn display_name(&self) -> &'static str {
        match self {
            CapabilityKind::Extractor => "Text extraction",
            CapabilityKind::Detector => "Language detection",
            CapabilityKind::Translator => "Translation",
            CapabilityKind::Summarizer => "Summarization",
            CapabilityKind::Rewriter => "Rewriting",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CapabilityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "extractor" => Ok(CapabilityKind::Extractor),
            "detector" => Ok(CapabilityKind::Detector),
            "translator" => Ok(CapabilityKind::Translator),
            "summarizer" => Ok(CapabilityKind::Summarizer),
            "rewriter" => Ok(CapabilityKind::Rewriter),
            _ => Err(format!("Unknown capability kind: {}", s)),
        }
    }
}

/// Availability as reported by a registered capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityAvailability {
    /// Ready to serve requests now
    Available,
    /// The backing model is not present locally but can be fetched
    Downloadable,
    /// The service cannot serve requests
    Unavailable,
}

/// Outcome of probing one capability slot in the registry.
///
/// Merges registry-level absence with the provider-reported availability so
/// callers handle a single enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// No implementation is registered for this kind
    NotRegistered,
    /// Registered and ready
    Available,
    /// Registered; the backing model still needs to be fetched
    Downloadable,
    /// Registered but unusable, with the reason
    Unavailable(String),
}

impl ProbeOutcome {
    /// Convert a blocking outcome into the stage error it implies for a
    /// required capability
    pub fn as_stage_error(&self, capability: CapabilityKind) -> Option<StageError> {
        match self {
            ProbeOutcome::NotRegistered => Some(StageError::CapabilityMissing(capability)),
            ProbeOutcome::Unavailable(reason) => Some(StageError::CapabilityUnavailable {
                capability,
                reason: reason.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::NotRegistered => write!(f, "not registered"),
            ProbeOutcome::Available => write!(f, "available"),
            ProbeOutcome::Downloadable => write!(f, "downloadable"),
            ProbeOutcome::Unavailable(reason) => write!(f, "unavailable ({})", reason),
        }
    }
}

/// One language guess from the detector, with its confidence in 0.0..=1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageGuess {
    /// ISO 639-1 language code
    pub language: String,
    /// Detector confidence, higher is more certain
    pub confidence: f32,
}

/// Request accompanying an extraction call
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Instruction sent alongside the attached image
    pub instruction: String,
    /// Language the caller will read the output in, as a hint for
    /// transliteration choices
    pub output_language: String,
}

/// Summary shape requested from the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryKind {
    /// Bulleted key points
    KeyPoints,
    /// One compact paragraph
    Tldr,
    /// A single-sentence teaser
    Teaser,
    /// A headline
    Headline,
}

impl SummaryKind {
    /// Get the kind as its configuration string
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::KeyPoints => "key-points",
            SummaryKind::Tldr => "tldr",
            SummaryKind::Teaser => "teaser",
            SummaryKind::Headline => "headline",
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SummaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "key-points" | "keypoints" => Ok(SummaryKind::KeyPoints),
            "tldr" | "tl;dr" => Ok(SummaryKind::Tldr),
            "teaser" => Ok(SummaryKind::Teaser),
            "headline" => Ok(SummaryKind::Headline),
            _ => Err(format!("Unknown summary kind: {}", s)),
        }
    }
}

/// Output format requested from the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryFormat {
    /// Plain text without markup
    PlainText,
    /// Markdown
    Markdown,
}

impl SummaryFormat {
    /// Get the format as its configuration string
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryFormat::PlainText => "plain-text",
            SummaryFormat::Markdown => "markdown",
        }
    }
}

impl fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain-text" | "plaintext" | "text" => Ok(SummaryFormat::PlainText),
            "markdown" | "md" => Ok(SummaryFormat::Markdown),
            _ => Err(format!("Unknown summary format: {}", s)),
        }
    }
}

/// Summary length requested from the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

impl SummaryLength {
    /// Get the length as its configuration string
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SummaryLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            _ => Err(format!("Unknown summary length: {}", s)),
        }
    }
}

/// Options shaping a summarization call
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Requested summary shape
    pub kind: SummaryKind,
    /// Requested output format
    pub format: SummaryFormat,
    /// Requested length
    pub length: SummaryLength,
    /// Extra context steering the summary, if any
    pub context: Option<String>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            kind: SummaryKind::KeyPoints,
            format: SummaryFormat::PlainText,
            length: SummaryLength::Short,
            context: None,
        }
    }
}

/// Style applied by the rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteStyle {
    /// A more formal register
    Formal,
    /// A relaxed, conversational register
    Casual,
    /// Plain language a newcomer can follow
    Simple,
    /// The same content with filler trimmed
    Concise,
}

impl RewriteStyle {
    /// Get the style as its configuration string
    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteStyle::Formal => "formal",
            RewriteStyle::Casual => "casual",
            RewriteStyle::Simple => "simple",
            RewriteStyle::Concise => "concise",
        }
    }
}

impl fmt::Display for RewriteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RewriteStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "formal" => Ok(RewriteStyle::Formal),
            "casual" => Ok(RewriteStyle::Casual),
            "simple" => Ok(RewriteStyle::Simple),
            "concise" => Ok(RewriteStyle::Concise),
            _ => Err(format!("Unknown rewrite style: {}", s)),
        }
    }
}

/// Multimodal text extraction from an image
#[async_trait]
pub trait TextExtractor: Send + Sync + Debug {
    /// Report whether the service can currently serve extraction requests
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError>;

    /// Extract the text visible in the image
    ///
    /// # Arguments
    /// * `image` - The image to read
    /// * `request` - Instruction and output-language hint for the call
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw extracted text or an error
    async fn extract(
        &self,
        image: &ImageArtifact,
        request: &ExtractionRequest,
    ) -> Result<String, ProviderError>;
}

/// Source language detection
#[async_trait]
pub trait LanguageDetection: Send + Sync + Debug {
    /// Report whether the service can currently serve detection requests
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        Ok(CapabilityAvailability::Available)
    }

    /// Guess the language of the text, ordered by descending confidence
    async fn detect(&self, text: &str) -> Result<Vec<LanguageGuess>, ProviderError>;
}

/// Text translation between explicit language codes
#[async_trait]
pub trait Translation: Send + Sync + Debug {
    /// Report whether the service can currently serve translation requests
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        Ok(CapabilityAvailability::Available)
    }

    /// Translate the text; both language codes are explicit, there is no
    /// auto-detect sentinel
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Text summarization
#[async_trait]
pub trait Summarization: Send + Sync + Debug {
    /// Report whether the service can currently serve summarization requests
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError>;

    /// Summarize the text according to the options
    async fn summarize(
        &self,
        text: &str,
        options: &SummaryOptions,
    ) -> Result<String, ProviderError>;
}

/// Stylistic rewriting
#[async_trait]
pub trait Rewriting: Send + Sync + Debug {
    /// Report whether the service can currently serve rewrite requests
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        Ok(CapabilityAvailability::Available)
    }

    /// Rewrite the text in the given style, preserving its meaning
    async fn rewrite(&self, text: &str, style: RewriteStyle) -> Result<String, ProviderError>;
}

/// Registry of the capability implementations the host wired in.
///
/// One slot per capability kind; an empty slot probes as `NotRegistered`.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    extractor: Option<Arc<dyn TextExtractor>>,
    detector: Option<Arc<dyn LanguageDetection>>,
    translator: Option<Arc<dyn Translation>>,
    summarizer: Option<Arc<dyn Summarization>>,
    rewriter: Option<Arc<dyn Rewriting>>,
}

impl CapabilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a text extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Register a language detector
    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetection>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Register a translator
    pub fn with_translator(mut self, translator: Arc<dyn Translation>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Register a summarizer
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarization>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Register a rewriter
    pub fn with_rewriter(mut self, rewriter: Arc<dyn Rewriting>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    /// Get the registered extractor, if any
    pub fn extractor(&self) -> Option<&Arc<dyn TextExtractor>> {
        self.extractor.as_ref()
    }

    /// Get the registered detector, if any
    pub fn detector(&self) -> Option<&Arc<dyn LanguageDetection>> {
        self.detector.as_ref()
    }

    /// Get the registered translator, if any
    pub fn translator(&self) -> Option<&Arc<dyn Translation>> {
        self.translator.as_ref()
    }

    /// Get the registered summarizer, if any
    pub fn summarizer(&self) -> Option<&Arc<dyn Summarization>> {
        self.summarizer.as_ref()
    }

    /// Get the registered rewriter, if any
    pub fn rewriter(&self) -> Option<&Arc<dyn Rewriting>> {
        self.rewriter.as_ref()
    }

    /// Check whether an implementation is registered for the kind
    pub fn is_registered(&self, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Extractor => self.extractor.is_some(),
            CapabilityKind::Detector => self.detector.is_some(),
            CapabilityKind::Translator => self.translator.is_some(),
            CapabilityKind::Summarizer => self.summarizer.is_some(),
            CapabilityKind::Rewriter => self.rewriter.is_some(),
        }
    }

    /// Probe one capability kind.
    ///
    /// Fails closed: a probe whose availability query itself errors reports
    /// `Unavailable` with the error as reason. Never returns an error and
    /// never panics.
    pub async fn probe(&self, kind: CapabilityKind) -> ProbeOutcome {
        let availability = match kind {
            CapabilityKind::Extractor => match &self.extractor {
                Some(provider) => Some(provider.availability().await),
                None => None,
            },
            CapabilityKind::Detector => match &self.detector {
                Some(provider) => Some(provider.availability().await),
                None => None,
            },
            CapabilityKind::Translator => match &self.translator {
                Some(provider) => Some(provider.availability().await),
                None => None,
            },
            CapabilityKind::Summarizer => match &self.summarizer {
                Some(provider) => Some(provider.availability().await),
                None => None,
            },
            CapabilityKind::Rewriter => match &self.rewriter {
                Some(provider) => Some(provider.availability().await),
                None => None,
            },
        };

        Self::outcome_from(availability)
    }

    /// Probe every capability kind concurrently, in declaration order
    pub async fn probe_all(&self) -> Vec<(CapabilityKind, ProbeOutcome)> {
        let outcomes = join_all(CapabilityKind::ALL.iter().map(|kind| self.probe(*kind))).await;

        CapabilityKind::ALL.iter().copied().zip(outcomes).collect()
    }

    fn outcome_from(probe: Option<Result<CapabilityAvailability, ProviderError>>) -> ProbeOutcome {
        match probe {
            None => ProbeOutcome::NotRegistered,
            Some(Ok(CapabilityAvailability::Available)) => ProbeOutcome::Available,
            Some(Ok(CapabilityAvailability::Downloadable)) => ProbeOutcome::Downloadable,
            Some(Ok(CapabilityAvailability::Unavailable)) => {
                ProbeOutcome::Unavailable("reported unavailable by the service".to_string())
            }
            Some(Err(error)) => ProbeOutcome::Unavailable(error.to_string()),
        }
    }
}
