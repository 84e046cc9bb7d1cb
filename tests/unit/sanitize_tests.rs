/*!
 * Tests for model reply cleanup
 */

use lenslate::sanitize::ReplyCleaner;

/// Test plain replies pass through untouched
#[test]
fn test_clean_withPlainText_shouldReturnTrimmed() {
    assert_eq!(ReplyCleaner::clean("Fresh bread daily"), "Fresh bread daily");
    assert_eq!(ReplyCleaner::clean("  padded  "), "padded");
}

/// Test markdown fences around the whole reply are removed
#[test]
fn test_clean_withCodeFence_shouldUnwrapContent() {
    let fenced = "```\nMenu del dia\n```";
    assert_eq!(ReplyCleaner::clean(fenced), "Menu del dia");

    let tagged = "```text\nOpening hours: 9-17\n```";
    assert_eq!(ReplyCleaner::clean(tagged), "Opening hours: 9-17");
}

/// Test fences inside the reply are kept
#[test]
fn test_clean_withInnerFence_shouldKeepContent() {
    let text = "Use ``` to quote code";
    assert_eq!(ReplyCleaner::clean(text), text);
}

/// Test lead-in phrases are stripped
#[test]
fn test_clean_withPreamble_shouldDropLeadIn() {
    assert_eq!(
        ReplyCleaner::clean("Here is the translation: Fresh bread daily"),
        "Fresh bread daily"
    );
    assert_eq!(
        ReplyCleaner::clean("Sure, here's the extracted text: STOP"),
        "STOP"
    );
    assert_eq!(
        ReplyCleaner::clean("The following is a summary: Short and clear"),
        "Short and clear"
    );
}

/// Test wrapping quotes are removed when they enclose the whole reply
#[test]
fn test_clean_withWrappingQuotes_shouldUnwrap() {
    assert_eq!(ReplyCleaner::clean("\"Fresh bread daily\""), "Fresh bread daily");
    assert_eq!(ReplyCleaner::clean("\u{201c}Fresh bread daily\u{201d}"), "Fresh bread daily");
}

/// Test interior quotes keep the reply untouched
#[test]
fn test_clean_withInteriorQuotes_shouldKeepQuotes() {
    let text = "\"Hello\" means \"Hola\"";
    assert_eq!(ReplyCleaner::clean(text), text);
}

/// Test fence, preamble and quotes stack
#[test]
fn test_clean_withStackedWrappers_shouldStripAll() {
    let raw = "```\nHere is the result: \"Cerrado los lunes\"\n```";
    assert_eq!(ReplyCleaner::clean(raw), "Cerrado los lunes");
}

/// Test blank detection
#[test]
fn test_isBlank_withVariousInputs_shouldDetectEmptiness() {
    assert!(ReplyCleaner::is_blank(""));
    assert!(ReplyCleaner::is_blank("   \n\t  "));
    assert!(!ReplyCleaner::is_blank("x"));
}
