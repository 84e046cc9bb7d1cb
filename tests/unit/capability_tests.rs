/*!
 * Tests for capability kinds, the registry, and availability probing
 */

use std::sync::Arc;

use lenslate::capabilities::{
    CapabilityKind, CapabilityRegistry, ProbeOutcome, RewriteStyle, SummaryFormat, SummaryKind,
    SummaryLength,
};
use lenslate::errors::StageError;
use lenslate::providers::mock::{MockExtractor, MockSummarizer, MockTranslator};

/// Test that the capability kind list covers the pipeline in order
#[test]
fn test_capabilityKind_allList_shouldFollowPipelineOrder() {
    assert_eq!(CapabilityKind::ALL.len(), 5);
    assert_eq!(CapabilityKind::ALL[0], CapabilityKind::Extractor);
    assert_eq!(CapabilityKind::ALL[1], CapabilityKind::Detector);
    assert_eq!(CapabilityKind::ALL[2], CapabilityKind::Translator);
    assert_eq!(CapabilityKind::ALL[3], CapabilityKind::Summarizer);
    assert_eq!(CapabilityKind::ALL[4], CapabilityKind::Rewriter);
}

/// Test capability kind string conversions
#[test]
fn test_capabilityKind_stringConversions_shouldRoundTrip() {
    assert_eq!(CapabilityKind::Extractor.as_str(), "extractor");
    assert_eq!(CapabilityKind::Rewriter.as_str(), "rewriter");
    assert_eq!(CapabilityKind::Translator.to_string(), "translator");
    assert_eq!(CapabilityKind::Detector.display_name(), "Language detection");
    assert_eq!(CapabilityKind::Summarizer.display_name(), "Summarization");

    for kind in CapabilityKind::ALL {
        let parsed: CapabilityKind = kind.as_str().parse().expect("Should parse own as_str");
        assert_eq!(parsed, kind);
    }

    assert!(" Extractor ".parse::<CapabilityKind>().is_ok());
    assert!("ocr".parse::<CapabilityKind>().is_err());
}

/// Test registry registration checks
#[test]
fn test_registry_withPartialRegistration_shouldReportRegisteredKinds() {
    let registry = CapabilityRegistry::new()
        .with_extractor(Arc::new(MockExtractor::working()))
        .with_translator(Arc::new(MockTranslator::working()));

    assert!(registry.is_registered(CapabilityKind::Extractor));
    assert!(registry.is_registered(CapabilityKind::Translator));
    assert!(!registry.is_registered(CapabilityKind::Detector));
    assert!(!registry.is_registered(CapabilityKind::Summarizer));
    assert!(!registry.is_registered(CapabilityKind::Rewriter));
}

/// Test probing an empty registry slot
#[test]
fn test_probe_withEmptyRegistry_shouldReportNotRegistered() {
    tokio_test::block_on(async {
        let registry = CapabilityRegistry::new();

        let outcome = registry.probe(CapabilityKind::Extractor).await;

        assert_eq!(outcome, ProbeOutcome::NotRegistered);
    });
}

/// Test probing services in each reported state
#[test]
fn test_probe_withVariousAvailabilities_shouldMapToOutcomes() {
    tokio_test::block_on(async {
        let registry = CapabilityRegistry::new()
            .with_extractor(Arc::new(MockExtractor::working()))
            .with_translator(Arc::new(MockTranslator::downloadable()))
            .with_summarizer(Arc::new(MockSummarizer::unavailable()));

        assert_eq!(
            registry.probe(CapabilityKind::Extractor).await,
            ProbeOutcome::Available
        );
        assert_eq!(
            registry.probe(CapabilityKind::Translator).await,
            ProbeOutcome::Downloadable
        );
        assert!(matches!(
            registry.probe(CapabilityKind::Summarizer).await,
            ProbeOutcome::Unavailable(_)
        ));
    });
}

/// Test that a failing availability check probes as unavailable
#[test]
fn test_probe_withUnreachableService_shouldFailClosed() {
    tokio_test::block_on(async {
        let extractor = MockExtractor::unreachable();
        let registry = CapabilityRegistry::new().with_extractor(Arc::new(extractor.clone()));

        let outcome = registry.probe(CapabilityKind::Extractor).await;

        match outcome {
            ProbeOutcome::Unavailable(reason) => {
                assert!(reason.contains("unreachable"), "Unexpected reason: {}", reason);
            }
            other => panic!("Expected unavailable outcome, got {:?}", other),
        }
        assert_eq!(extractor.availability_check_count(), 1);
    });
}

/// Test that probing everything covers each kind in order
#[test]
fn test_probeAll_withPartialRegistry_shouldCoverEveryKindInOrder() {
    tokio_test::block_on(async {
        let registry = CapabilityRegistry::new()
            .with_extractor(Arc::new(MockExtractor::working()))
            .with_translator(Arc::new(MockTranslator::working()));

        let outcomes = registry.probe_all().await;

        assert_eq!(outcomes.len(), CapabilityKind::ALL.len());
        for (index, (kind, _)) in outcomes.iter().enumerate() {
            assert_eq!(*kind, CapabilityKind::ALL[index]);
        }
        assert_eq!(outcomes[0].1, ProbeOutcome::Available);
        assert_eq!(outcomes[1].1, ProbeOutcome::NotRegistered);
        assert_eq!(outcomes[2].1, ProbeOutcome::Available);
        assert_eq!(outcomes[3].1, ProbeOutcome::NotRegistered);
    });
}

/// Test mapping probe outcomes to stage errors
#[test]
fn test_probeOutcome_asStageError_shouldBlockOnlyMissingAndUnavailable() {
    let missing = ProbeOutcome::NotRegistered.as_stage_error(CapabilityKind::Translator);
    assert!(matches!(
        missing,
        Some(StageError::CapabilityMissing(CapabilityKind::Translator))
    ));

    let unavailable = ProbeOutcome::Unavailable("server down".to_string())
        .as_stage_error(CapabilityKind::Extractor);
    match unavailable {
        Some(StageError::CapabilityUnavailable { capability, reason }) => {
            assert_eq!(capability, CapabilityKind::Extractor);
            assert_eq!(reason, "server down");
        }
        other => panic!("Expected capability unavailable error, got {:?}", other),
    }

    assert!(ProbeOutcome::Available
        .as_stage_error(CapabilityKind::Extractor)
        .is_none());
    assert!(ProbeOutcome::Downloadable
        .as_stage_error(CapabilityKind::Extractor)
        .is_none());
}

/// Test probe outcome display strings
#[test]
fn test_probeOutcome_display_shouldDescribeState() {
    assert_eq!(ProbeOutcome::NotRegistered.to_string(), "not registered");
    assert_eq!(ProbeOutcome::Available.to_string(), "available");
    assert_eq!(ProbeOutcome::Downloadable.to_string(), "downloadable");
    assert_eq!(
        ProbeOutcome::Unavailable("no models".to_string()).to_string(),
        "unavailable (no models)"
    );
}

/// Test summary option enums parse from user-facing strings
#[test]
fn test_summaryEnums_fromStr_shouldAcceptAliases() {
    assert_eq!("key-points".parse::<SummaryKind>(), Ok(SummaryKind::KeyPoints));
    assert_eq!("tl;dr".parse::<SummaryKind>(), Ok(SummaryKind::Tldr));
    assert_eq!("HEADLINE".parse::<SummaryKind>(), Ok(SummaryKind::Headline));
    assert!("outline".parse::<SummaryKind>().is_err());

    assert_eq!("text".parse::<SummaryFormat>(), Ok(SummaryFormat::PlainText));
    assert_eq!("md".parse::<SummaryFormat>(), Ok(SummaryFormat::Markdown));
    assert!("html".parse::<SummaryFormat>().is_err());

    assert_eq!("medium".parse::<SummaryLength>(), Ok(SummaryLength::Medium));
    assert!("gigantic".parse::<SummaryLength>().is_err());
}

/// Test rewrite style parsing and display
#[test]
fn test_rewriteStyle_fromStr_shouldParseKnownStyles() {
    assert_eq!("formal".parse::<RewriteStyle>(), Ok(RewriteStyle::Formal));
    assert_eq!("Casual".parse::<RewriteStyle>(), Ok(RewriteStyle::Casual));
    assert_eq!(" simple ".parse::<RewriteStyle>(), Ok(RewriteStyle::Simple));
    assert_eq!("concise".parse::<RewriteStyle>(), Ok(RewriteStyle::Concise));
    assert!("poetic".parse::<RewriteStyle>().is_err());

    assert_eq!(RewriteStyle::Simple.to_string(), "simple");
}
