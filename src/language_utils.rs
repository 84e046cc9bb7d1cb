use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating and normalizing the language
/// codes the capability contracts exchange. Capabilities speak ISO 639-1
/// (2-letter) codes; ISO 639-3 (3-letter) input is accepted and narrowed to
/// the 2-letter form where one exists.

/// Fallback source language used when detection is unavailable or inconclusive
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

/// Language code type
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-3 (3-letter) code
    Part3,
}

/// Parse a language code in either ISO 639-1 or ISO 639-3 form
fn parse_language(code: &str) -> Option<Language> {
    match code.len() {
        2 => Language::from_639_1(code),
        3 => Language::from_639_3(code),
        _ => None,
    }
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-3 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    // Check for ISO 639-1 (2-letter) code
    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    }
    // Check for ISO 639-3 (3-letter) code
    else if normalized_code.len() == 3 && Language::from_639_3(&normalized_code).is_some() {
        return Ok(LanguageCodeType::Part3);
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to the ISO 639-1 (2-letter) form the capability
/// contracts use, falling back to ISO 639-3 when no 2-letter code exists
pub fn normalize_for_capability(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    // If it's already a 2-letter code, validate it
    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    }
    // If it's a 3-letter code, try to find the corresponding 2-letter code
    else if normalized_code.len() == 3 {
        if let Some(lang) = Language::from_639_3(&normalized_code) {
            if let Some(code_639_1) = lang.to_639_1() {
                return Ok(code_639_1.to_string());
            }

            // No ISO 639-1 code exists, keep the ISO 639-3 code
            return Ok(normalized_code);
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let normalized1 = match normalize_for_capability(code1) {
        Ok(n) => n,
        Err(_) => return false,
    };

    let normalized2 = match normalize_for_capability(code2) {
        Ok(n) => n,
        Err(_) => return false,
    };

    normalized1 == normalized2
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    let lang = parse_language(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}
