/*!
 * Cleanup for raw capability replies.
 *
 * Model-backed capabilities tend to wrap their answers in markdown fences,
 * lead-in phrases, or quotes even when instructed not to. This module strips
 * that chatter so stage payloads contain only the requested content.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown code fence wrapping the whole reply, with an optional language tag
static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z0-9_-]*\s*\n?(.*?)\n?```\s*$").unwrap()
});

/// Lead-in phrases models prepend despite instructions
static PREAMBLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:sure[,.!]?\s+)?(?:here(?:'s| is| are)|this is|the following is)\b[^:\n]{0,80}:\s*").unwrap()
});

/// Reply cleaner for model-backed capability output
pub struct ReplyCleaner;

impl ReplyCleaner {
    /// Strip markdown fences, lead-in phrases and wrapping quotes
    pub fn clean(raw: &str) -> String {
        let mut text = raw.trim().to_string();

        if let Some(captures) = CODE_FENCE_REGEX.captures(&text) {
            if let Some(inner) = captures.get(1) {
                text = inner.as_str().trim().to_string();
            }
        }

        text = PREAMBLE_REGEX.replace(&text, "").trim().to_string();

        Self::strip_wrapping_quotes(&text)
    }

    /// Remove one layer of symmetric quotes enclosing the whole reply
    fn strip_wrapping_quotes(text: &str) -> String {
        let trimmed = text.trim();

        let stripped = trimmed
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .or_else(|| {
                trimmed
                    .strip_prefix('\u{201c}')
                    .and_then(|t| t.strip_suffix('\u{201d}'))
            });

        match stripped {
            // Only unwrap when the quotes enclose the reply as a whole
            Some(inner) if !inner.contains('"') => inner.trim().to_string(),
            _ => trimmed.to_string(),
        }
    }

    /// True when the text carries no usable content
    pub fn is_blank(text: &str) -> bool {
        text.trim().is_empty()
    }
}
