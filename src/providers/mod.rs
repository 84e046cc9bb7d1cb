/*!
 * Capability implementations for different backing services.
 *
 * This module contains the concrete capability adapters:
 * - Ollama: Local LLM server driving all five capabilities
 * - Mock: Configurable simulations for testing
 */

pub mod mock;
pub mod ollama;

pub use ollama::{
    OllamaClient, OllamaDetector, OllamaExtractor, OllamaRewriter, OllamaSummarizer,
    OllamaTranslator, DEFAULT_OLLAMA_ENDPOINT,
};
