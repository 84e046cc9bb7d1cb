/*!
 * Prompt templates for the model-backed capabilities.
 *
 * Each stage talks to its model through a small instruction template. The
 * wording is kept stable so replies stay parseable after cleanup, and every
 * template asks for the bare answer without commentary.
 */

use crate::capabilities::{RewriteStyle, SummaryKind, SummaryLength, SummaryOptions, SummaryFormat};
use crate::language_utils;

/// A prompt template with `{placeholder}` variables
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// System instruction for the multimodal extraction session.
    pub const EXTRACTOR_SYSTEM: &'static str =
        "You are a helpful assistant that extracts and transcribes text from images accurately.";

    /// Instruction sent alongside the attached image.
    pub const EXTRACT_TEXT: &'static str = "Extract all text from this image. \
Keep the original language, wording and line breaks exactly as written, and reply \
with the extracted text only, without commentary. Transliterate into {output_language} \
script only where the original script cannot be reproduced. If the image contains no \
text, reply with an empty message.";

    /// Instruction for language detection with a strict JSON reply.
    pub const DETECT_LANGUAGE: &'static str = "Identify the language of the text below. \
Reply with only a JSON array of guesses ordered by descending confidence, each element \
shaped like [{\"language\": \"en\", \"confidence\": 0.9}]. Use ISO 639-1 codes.\n\n\
Text:\n{text}";

    /// Instruction for translation between explicit languages.
    pub const TRANSLATE_TEXT: &'static str = "Translate the following text from \
{source_language} to {target_language}. Preserve line breaks and keep names and \
numbers intact. Reply with the translation only, without commentary.\n\n{text}";

    /// Instruction for summarization, shaped by the configured options.
    pub const SUMMARIZE_TEXT: &'static str = "Summarize the following text as {shape}. \
Write {format} and keep the summary {length}.{context}\n\nText:\n{text}";

    /// Instruction for stylistic rewriting.
    pub const REWRITE_TEXT: &'static str = "Rewrite the following text {style}. \
Keep the meaning intact and reply with the rewritten text only, without \
commentary.\n\n{text}";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template, replacing each `{name}` placeholder.
    pub fn render(&self, variables: &[(&str, &str)]) -> String {
        let mut rendered = self.template.clone();
        for (name, value) in variables {
            rendered = rendered.replace(&format!("{{{}}}", name), value);
        }
        rendered
    }
}

/// Resolve a language code to its English name, keeping the code when the
/// name is unknown
fn language_label(code: &str) -> String {
    language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
}

/// Build the extraction instruction with the output-language hint
pub fn extraction_prompt(output_language: &str) -> String {
    PromptTemplate::new(PromptTemplate::EXTRACT_TEXT)
        .render(&[("output_language", language_label(output_language).as_str())])
}

/// Build the detection instruction for the given text
pub fn detection_prompt(text: &str) -> String {
    PromptTemplate::new(PromptTemplate::DETECT_LANGUAGE).render(&[("text", text)])
}

/// Build the translation instruction between two explicit language codes
pub fn translation_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    PromptTemplate::new(PromptTemplate::TRANSLATE_TEXT).render(&[
        ("source_language", language_label(source_language).as_str()),
        ("target_language", language_label(target_language).as_str()),
        ("text", text),
    ])
}

/// Build the summarization instruction from the configured options
pub fn summary_prompt(text: &str, options: &SummaryOptions) -> String {
    let shape = match options.kind {
        SummaryKind::KeyPoints => "a bulleted list of the key points",
        SummaryKind::Tldr => "one compact tl;dr paragraph",
        SummaryKind::Teaser => "a single-sentence teaser",
        SummaryKind::Headline => "a single headline",
    };

    let format = match options.format {
        SummaryFormat::PlainText => "plain text without any markup",
        SummaryFormat::Markdown => "markdown",
    };

    let length = match options.length {
        SummaryLength::Short => "short",
        SummaryLength::Medium => "of moderate length",
        SummaryLength::Long => "detailed",
    };

    let context = match &options.context {
        Some(context) if !context.trim().is_empty() => format!(" {}", context.trim()),
        _ => String::new(),
    };

    PromptTemplate::new(PromptTemplate::SUMMARIZE_TEXT).render(&[
        ("shape", shape),
        ("format", format),
        ("length", length),
        ("context", context.as_str()),
        ("text", text),
    ])
}

/// Build the rewrite instruction for the given style
pub fn rewrite_prompt(text: &str, style: RewriteStyle) -> String {
    let style_clause = match style {
        RewriteStyle::Formal => "in a more formal register",
        RewriteStyle::Casual => "in a relaxed, conversational register",
        RewriteStyle::Simple => "in plain language a newcomer can follow",
        RewriteStyle::Concise => "more concisely, trimming filler",
    };

    PromptTemplate::new(PromptTemplate::REWRITE_TEXT).render(&[("style", style_clause), ("text", text)])
}
