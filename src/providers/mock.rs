/*!
 * Mock capability implementations for testing.
 *
 * Each capability has a mock that simulates different behaviors:
 * - `working()` - Always succeeds with a canned reply
 * - `failing()` - Always fails with a server error
 * - `empty()` - Succeeds but returns nothing
 * - `unavailable()` / `downloadable()` - Reports itself in that state
 * - `unreachable()` - Availability checks themselves error
 * - `restricted()` - Fails with a policy refusal
 * - `slow(ms)` - Succeeds after a delay
 *
 * Mocks count their invocations and availability checks; the translator
 * additionally records the language pair of every call.
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::capabilities::{
    CapabilityAvailability, ExtractionRequest, LanguageDetection, LanguageGuess, RewriteStyle,
    Rewriting, Summarization, SummaryOptions, TextExtractor, Translation,
};
use crate::errors::ProviderError;
use crate::pipeline::input::ImageArtifact;

/// Behavior mode for the mock capabilities
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with the configured reply
    Working,
    /// Always fails with a server error
    Failing,
    /// Succeeds but returns an empty reply
    Empty,
    /// Reports itself unavailable
    Unavailable,
    /// Reports itself downloadable
    Downloadable,
    /// Availability checks fail with a connection error
    Unreachable,
    /// Fails with a policy refusal
    Restricted,
    /// Succeeds after a delay (for concurrency testing)
    Slow { delay_ms: u64 },
}

/// Shared plumbing for the capability mocks
#[derive(Debug, Clone)]
struct MockCore {
    /// Behavior mode
    behavior: MockBehavior,
    /// Canned reply overriding the capability default
    reply: Option<String>,
    /// Invocation counter, shared across clones
    calls: Arc<AtomicUsize>,
    /// Availability check counter, shared across clones
    availability_checks: Arc<AtomicUsize>,
}

impl MockCore {
    fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            reply: None,
            calls: Arc::new(AtomicUsize::new(0)),
            availability_checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn note_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.availability_checks.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Unavailable => Ok(CapabilityAvailability::Unavailable),
            MockBehavior::Downloadable => Ok(CapabilityAvailability::Downloadable),
            MockBehavior::Unreachable => Err(ProviderError::ConnectionError(
                "simulated unreachable service".to_string(),
            )),
            _ => Ok(CapabilityAvailability::Available),
        }
    }

    async fn respond(&self, default_reply: &str) -> Result<String, ProviderError> {
        self.note_call();

        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::Empty => Ok(String::new()),
            MockBehavior::Restricted => Err(ProviderError::Restricted(
                "simulated policy refusal".to_string(),
            )),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.reply_or(default_reply))
            }
            _ => Ok(self.reply_or(default_reply)),
        }
    }

    fn reply_or(&self, default_reply: &str) -> String {
        match &self.reply {
            Some(reply) => reply.clone(),
            None => default_reply.to_string(),
        }
    }
}

macro_rules! mock_constructors {
    () => {
        /// Create a working mock
        pub fn working() -> Self {
            Self::new(MockBehavior::Working)
        }

        /// Create a mock that always fails
        pub fn failing() -> Self {
            Self::new(MockBehavior::Failing)
        }

        /// Create a mock that returns empty replies
        pub fn empty() -> Self {
            Self::new(MockBehavior::Empty)
        }

        /// Create a mock that reports itself unavailable
        pub fn unavailable() -> Self {
            Self::new(MockBehavior::Unavailable)
        }

        /// Create a mock that reports itself downloadable
        pub fn downloadable() -> Self {
            Self::new(MockBehavior::Downloadable)
        }

        /// Create a mock whose availability checks error
        pub fn unreachable() -> Self {
            Self::new(MockBehavior::Unreachable)
        }

        /// Create a mock that refuses with a policy error
        pub fn restricted() -> Self {
            Self::new(MockBehavior::Restricted)
        }

        /// Create a mock that replies after a delay
        pub fn slow(delay_ms: u64) -> Self {
            Self::new(MockBehavior::Slow { delay_ms })
        }

        /// Set a canned reply
        pub fn with_reply(mut self, reply: &str) -> Self {
            self.core.reply = Some(reply.to_string());
            self
        }

        /// Number of times the capability was invoked
        pub fn call_count(&self) -> usize {
            self.core.calls.load(Ordering::SeqCst)
        }

        /// Number of times availability was checked
        pub fn availability_check_count(&self) -> usize {
            self.core.availability_checks.load(Ordering::SeqCst)
        }
    };
}

/// Mock text extractor
#[derive(Debug, Clone)]
pub struct MockExtractor {
    core: MockCore,
}

impl MockExtractor {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            core: MockCore::new(behavior),
        }
    }

    mock_constructors!();
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.core.availability().await
    }

    async fn extract(
        &self,
        _image: &ImageArtifact,
        _request: &ExtractionRequest,
    ) -> Result<String, ProviderError> {
        self.core.respond("Extracted text from the image").await
    }
}

/// Mock language detector
#[derive(Debug, Clone)]
pub struct MockDetector {
    core: MockCore,
    guesses: Vec<LanguageGuess>,
}

impl MockDetector {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            core: MockCore::new(behavior),
            guesses: vec![LanguageGuess {
                language: "en".to_string(),
                confidence: 0.9,
            }],
        }
    }

    mock_constructors!();

    /// Create a working mock reporting the given language
    pub fn detecting(language: &str, confidence: f32) -> Self {
        Self {
            core: MockCore::new(MockBehavior::Working),
            guesses: vec![LanguageGuess {
                language: language.to_string(),
                confidence,
            }],
        }
    }

    /// Set the guesses a working mock reports
    pub fn with_guesses(mut self, guesses: Vec<LanguageGuess>) -> Self {
        self.guesses = guesses;
        self
    }
}

#[async_trait]
impl LanguageDetection for MockDetector {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.core.availability().await
    }

    async fn detect(&self, _text: &str) -> Result<Vec<LanguageGuess>, ProviderError> {
        self.core.note_call();

        match self.core.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated detector failure".to_string(),
            }),
            MockBehavior::Restricted => Err(ProviderError::Restricted(
                "simulated policy refusal".to_string(),
            )),
            MockBehavior::Empty => Ok(Vec::new()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.guesses.clone())
            }
            _ => Ok(self.guesses.clone()),
        }
    }
}

/// One recorded translator invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationCall {
    /// Text handed to the translator
    pub text: String,
    /// Source language code of the call
    pub source_language: String,
    /// Target language code of the call
    pub target_language: String,
}

/// Mock translator that records every call
#[derive(Debug, Clone)]
pub struct MockTranslator {
    core: MockCore,
    recorded: Arc<Mutex<Vec<TranslationCall>>>,
}

impl MockTranslator {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            core: MockCore::new(behavior),
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    mock_constructors!();

    /// Calls recorded so far, in order
    pub fn recorded_calls(&self) -> Vec<TranslationCall> {
        self.recorded.lock().clone()
    }
}

#[async_trait]
impl Translation for MockTranslator {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.core.availability().await
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.recorded.lock().push(TranslationCall {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        });

        let default_reply = format!("[translated to {}] {}", target_language, text);
        self.core.respond(&default_reply).await
    }
}

/// Mock summarizer
#[derive(Debug, Clone)]
pub struct MockSummarizer {
    core: MockCore,
}

impl MockSummarizer {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            core: MockCore::new(behavior),
        }
    }

    mock_constructors!();
}

#[async_trait]
impl Summarization for MockSummarizer {
    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.core.availability().await
    }

    async fn summarize(
        &self,
        text: &str,
        _options: &SummaryOptions,
    ) -> Result<String, ProviderError> {
        let default_reply = format!("Summary: {}", text);
        self.core.respond(&default_reply).await
    }
}

/// Mock rewriter
#[derive(Debug, Clone)]
pub struct MockRewriter {
    core: MockCore,
}

impl MockRewriter {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            core: MockCore::new(behavior),
        }
    }

    mock_constructors!();
}

#[async_trait]
impl Rewriting for MockRewriter {
    async fn rewrite(&self, text: &str, style: RewriteStyle) -> Result<String, ProviderError> {
        let default_reply = format!("[{}] {}", style, text);
        self.core.respond(&default_reply).await
    }

    async fn availability(&self) -> Result<CapabilityAvailability, ProviderError> {
        self.core.availability().await
    }
}
