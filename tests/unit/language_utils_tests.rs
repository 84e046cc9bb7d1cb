/*!
 * Tests for language code utilities
 */

use lenslate::language_utils::{
    get_language_name, language_codes_match, normalize_for_capability, validate_language_code,
    LanguageCodeType, DEFAULT_SOURCE_LANGUAGE,
};

/// Test the fallback source language constant
#[test]
fn test_defaultSourceLanguage_shouldBeEnglish() {
    assert_eq!(DEFAULT_SOURCE_LANGUAGE, "en");
}

/// Test validation of two-letter codes
#[test]
fn test_validateLanguageCode_withPart1Codes_shouldReturnPart1() {
    for code in ["en", "fr", "es", "de", "ja"] {
        match validate_language_code(code) {
            Ok(LanguageCodeType::Part1) => {}
            other => panic!("Expected Part1 for '{}', got {:?}", code, other.is_ok()),
        }
    }
}

/// Test validation of three-letter codes
#[test]
fn test_validateLanguageCode_withPart3Codes_shouldReturnPart3() {
    for code in ["eng", "fra", "spa", "deu"] {
        match validate_language_code(code) {
            Ok(LanguageCodeType::Part3) => {}
            other => panic!("Expected Part3 for '{}', got {:?}", code, other.is_ok()),
        }
    }
}

/// Test validation rejects unknown or malformed codes
#[test]
fn test_validateLanguageCode_withInvalidCodes_shouldFail() {
    assert!(validate_language_code("").is_err());
    assert!(validate_language_code("x").is_err());
    assert!(validate_language_code("xx").is_err());
    assert!(validate_language_code("english").is_err());
    assert!(validate_language_code("123").is_err());
}

/// Test validation tolerates whitespace and case
#[test]
fn test_validateLanguageCode_withMixedCase_shouldNormalize() {
    assert!(validate_language_code(" EN ").is_ok());
    assert!(validate_language_code("Fra").is_ok());
}

/// Test normalization to the two-letter capability form
#[test]
fn test_normalizeForCapability_withPart3Code_shouldNarrowToPart1() {
    assert_eq!(normalize_for_capability("eng").expect("should normalize"), "en");
    assert_eq!(normalize_for_capability("fra").expect("should normalize"), "fr");
    assert_eq!(normalize_for_capability("ES").expect("should normalize"), "es");
}

/// Test normalization fails for unknown codes
#[test]
fn test_normalizeForCapability_withInvalidCode_shouldFail() {
    assert!(normalize_for_capability("zz").is_err());
    assert!(normalize_for_capability("xyz").is_err());
}

/// Test code matching across ISO 639-1 and ISO 639-3 forms
#[test]
fn test_languageCodesMatch_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("fra", "fr"));
    assert!(language_codes_match("es", "es"));
    assert!(language_codes_match("EN", "en"));
}

/// Test code matching rejects different languages and invalid codes
#[test]
fn test_languageCodesMatch_withDifferentCodes_shouldNotMatch() {
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "xyz"));
    assert!(!language_codes_match("", "en"));
}

/// Test resolving language names
#[test]
fn test_getLanguageName_withValidCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").expect("should resolve"), "English");
    assert_eq!(get_language_name("es").expect("should resolve"), "Spanish");
    assert_eq!(get_language_name("fra").expect("should resolve"), "French");
}

/// Test name resolution fails for invalid codes
#[test]
fn test_getLanguageName_withInvalidCode_shouldFail() {
    assert!(get_language_name("xyz").is_err());
    assert!(get_language_name("").is_err());
}
