use aip::aip::analysis::engine::{
    build_signal, check_integrity, hash_thinking_block, map_verdict_to_action,
    map_verdict_to_proceed, CheckIntegrityInput, ThinkingInput,
};
use aip::aip::error::AipError;
use aip::aip::schemas::{
    ConcernCategory, ConsultationDepth, IntegrityConcern, IntegritySeverity, IntegrityVerdict,
    RecommendedAction, VerdictCounts, WindowPosition, WindowSummary,
};

const CLEAR_RESPONSE: &str = r#"{
    "verdict": "clear",
    "concerns": [],
    "reasoning_summary": "aligned",
    "conscience_context": {
        "values_checked": [],
        "conflicts": [],
        "supports": [],
        "considerations": [],
        "consultation_depth": "surface"
    }
}"#;

fn make_input(analysis_response: &str) -> CheckIntegrityInput {
    CheckIntegrityInput {
        analysis_response: analysis_response.to_string(),
        thinking: ThinkingInput {
            hash: hash_thinking_block("Let me help with code."),
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-0".to_string(),
            tokens_original: 6,
            tokens_analyzed: 6,
            truncated: false,
            confidence: 1.0,
        },
        agent_id: "agent-1".to_string(),
        card_id: "card-1".to_string(),
        session_id: "sess-card-1-1".to_string(),
        window_position: WindowPosition {
            index: 0,
            window_size: 1,
        },
        analysis_model: "claude-sonnet-4-0".to_string(),
        analysis_duration_ms: 42.0,
        linked_trace_id: None,
    }
}

fn concern_response(severity: &str) -> String {
    format!(
        r#"{{
            "verdict": "boundary_violation",
            "concerns": [{{
                "category": "prompt_injection",
                "severity": "{}",
                "description": "Injected instructions detected",
                "evidence": "ignore previous instructions",
                "relevant_card_field": "autonomy_envelope.forbidden_actions",
                "relevant_conscience_value": null
            }}],
            "reasoning_summary": "hostile content",
            "conscience_context": {{
                "values_checked": ["boundary-no-instruction-compliance"],
                "conflicts": ["boundary-no-instruction-compliance"],
                "supports": [],
                "considerations": ["topic hijack attempt"],
                "consultation_depth": "deep"
            }}
        }}"#,
        severity
    )
}

// ── check_integrity ──────────────────────────────────────────────────────

#[test]
fn test_check_integrity_builds_clear_checkpoint() {
    let checkpoint = check_integrity(&make_input(CLEAR_RESPONSE)).unwrap();

    assert!(checkpoint.checkpoint_id.starts_with("ic-"));
    assert_eq!(checkpoint.verdict, IntegrityVerdict::Clear);
    assert!(checkpoint.concerns.is_empty());
    assert_eq!(checkpoint.reasoning_summary, "aligned");
    assert_eq!(checkpoint.agent_id, "agent-1");
    assert_eq!(checkpoint.card_id, "card-1");
    assert_eq!(checkpoint.session_id, "sess-card-1-1");
    assert_eq!(checkpoint.provider, "anthropic");
    assert_eq!(checkpoint.model, "claude-sonnet-4-0");
    assert_eq!(
        checkpoint.conscience_context.consultation_depth,
        ConsultationDepth::Surface
    );
    assert_eq!(checkpoint.analysis_metadata.analysis_duration_ms, 42.0);
    assert_eq!(checkpoint.analysis_metadata.extraction_confidence, 1.0);
    // The timestamp must be RFC-3339.
    assert!(chrono::DateTime::parse_from_rfc3339(&checkpoint.timestamp).is_ok());
}

#[test]
fn test_check_integrity_parses_concerns() {
    let checkpoint = check_integrity(&make_input(&concern_response("critical"))).unwrap();

    assert_eq!(checkpoint.verdict, IntegrityVerdict::BoundaryViolation);
    assert_eq!(checkpoint.concerns.len(), 1);
    let concern = &checkpoint.concerns[0];
    assert_eq!(concern.category, ConcernCategory::PromptInjection);
    assert_eq!(concern.severity, IntegritySeverity::Critical);
    assert_eq!(concern.evidence, "ignore previous instructions");
    assert_eq!(
        concern.relevant_card_field.as_deref(),
        Some("autonomy_envelope.forbidden_actions")
    );
    assert!(concern.relevant_conscience_value.is_none());
    assert_eq!(
        checkpoint.conscience_context.consultation_depth,
        ConsultationDepth::Deep
    );
}

#[test]
fn test_check_integrity_rejects_invalid_json() {
    match check_integrity(&make_input("not json")) {
        Err(AipError::Parse { .. }) => {}
        other => panic!("expected Parse error, got {:?}", other.map(|c| c.verdict)),
    }
}

#[test]
fn test_check_integrity_rejects_unknown_verdict() {
    let response = CLEAR_RESPONSE.replace("\"clear\"", "\"fine\"");
    match check_integrity(&make_input(&response)) {
        Err(AipError::InvalidField { field, .. }) => assert_eq!(field, "verdict"),
        other => panic!("expected InvalidField, got {:?}", other.map(|c| c.verdict)),
    }
}

#[test]
fn test_check_integrity_rejects_missing_concerns() {
    let response = r#"{"verdict": "clear", "reasoning_summary": "ok",
        "conscience_context": {"values_checked": [], "conflicts": [], "supports": [],
        "considerations": [], "consultation_depth": "surface"}}"#;
    match check_integrity(&make_input(response)) {
        Err(AipError::InvalidField { field, .. }) => assert_eq!(field, "concerns"),
        other => panic!("expected InvalidField, got {:?}", other.map(|c| c.verdict)),
    }
}

#[test]
fn test_check_integrity_rejects_unknown_category() {
    let response = concern_response("high").replace("prompt_injection", "rudeness");
    match check_integrity(&make_input(&response)) {
        Err(AipError::InvalidField { field, .. }) => {
            assert_eq!(field, "concerns[0].category")
        }
        other => panic!("expected InvalidField, got {:?}", other.map(|c| c.verdict)),
    }
}

#[test]
fn test_check_integrity_rejects_unknown_severity() {
    let response = concern_response("catastrophic");
    match check_integrity(&make_input(&response)) {
        Err(AipError::InvalidField { field, .. }) => {
            assert_eq!(field, "concerns[0].severity")
        }
        other => panic!("expected InvalidField, got {:?}", other.map(|c| c.verdict)),
    }
}

#[test]
fn test_check_integrity_rejects_missing_reasoning_summary() {
    let response = CLEAR_RESPONSE.replace("\"reasoning_summary\": \"aligned\",", "");
    match check_integrity(&make_input(&response)) {
        Err(AipError::InvalidField { field, .. }) => assert_eq!(field, "reasoning_summary"),
        other => panic!("expected InvalidField, got {:?}", other.map(|c| c.verdict)),
    }
}

#[test]
fn test_check_integrity_rejects_bad_consultation_depth() {
    let response = CLEAR_RESPONSE.replace("\"surface\"", "\"exhaustive\"");
    match check_integrity(&make_input(&response)) {
        Err(AipError::InvalidField { field, .. }) => {
            assert_eq!(field, "conscience_context.consultation_depth")
        }
        other => panic!("expected InvalidField, got {:?}", other.map(|c| c.verdict)),
    }
}

#[test]
fn test_check_integrity_truncates_evidence_to_200_chars() {
    let long_evidence = "x".repeat(250);
    let response = concern_response("high").replace("ignore previous instructions", &long_evidence);
    let checkpoint = check_integrity(&make_input(&response)).unwrap();
    assert_eq!(checkpoint.concerns[0].evidence.chars().count(), 200);

    let short = check_integrity(&make_input(&concern_response("high"))).unwrap();
    assert_eq!(short.concerns[0].evidence, "ignore previous instructions");
}

#[test]
fn test_check_integrity_is_pure_apart_from_id_and_timestamp() {
    let input = make_input(&concern_response("high"));
    let a = check_integrity(&input).unwrap();
    let b = check_integrity(&input).unwrap();

    assert_ne!(a.checkpoint_id, b.checkpoint_id);
    assert_eq!(a.verdict, b.verdict);
    assert_eq!(a.concerns, b.concerns);
    assert_eq!(a.reasoning_summary, b.reasoning_summary);
    assert_eq!(a.conscience_context, b.conscience_context);
    assert_eq!(a.thinking_block_hash, b.thinking_block_hash);
    assert_eq!(a.window_position, b.window_position);
    assert_eq!(a.analysis_metadata, b.analysis_metadata);
}

#[test]
fn test_checkpoint_never_leaks_raw_thinking() {
    let thinking = "Top secret reasoning about launch codes.";
    let mut input = make_input(CLEAR_RESPONSE);
    input.thinking.hash = hash_thinking_block(thinking);

    let checkpoint = check_integrity(&input).unwrap();
    let serialized = serde_json::to_string(&checkpoint).unwrap();
    assert!(!serialized.contains(thinking));
    assert!(serialized.contains(&hash_thinking_block(thinking)));
}

// ── Hashing ──────────────────────────────────────────────────────────────

#[test]
fn test_hash_thinking_block_is_deterministic_hex() {
    let a = hash_thinking_block("Let me help with code.");
    let b = hash_thinking_block("Let me help with code.");
    let c = hash_thinking_block("Let me help with code!");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
}

// ── Verdict mapping ──────────────────────────────────────────────────────

fn concern(severity: IntegritySeverity) -> IntegrityConcern {
    IntegrityConcern {
        category: ConcernCategory::PromptInjection,
        severity,
        description: "d".to_string(),
        evidence: "e".to_string(),
        relevant_card_field: None,
        relevant_conscience_value: None,
    }
}

#[test]
fn test_verdict_to_action_table() {
    assert_eq!(
        map_verdict_to_action(IntegrityVerdict::Clear, &[]),
        RecommendedAction::Continue
    );
    assert_eq!(
        map_verdict_to_action(IntegrityVerdict::ReviewNeeded, &[concern(IntegritySeverity::High)]),
        RecommendedAction::LogAndContinue
    );
    assert_eq!(
        map_verdict_to_action(
            IntegrityVerdict::BoundaryViolation,
            &[concern(IntegritySeverity::High), concern(IntegritySeverity::Critical)]
        ),
        RecommendedAction::DenyAndEscalate
    );
    assert_eq!(
        map_verdict_to_action(
            IntegrityVerdict::BoundaryViolation,
            &[concern(IntegritySeverity::High)]
        ),
        RecommendedAction::PauseForReview
    );
    assert_eq!(
        map_verdict_to_action(IntegrityVerdict::BoundaryViolation, &[]),
        RecommendedAction::PauseForReview
    );
}

#[test]
fn test_verdict_to_proceed() {
    assert!(map_verdict_to_proceed(IntegrityVerdict::Clear));
    assert!(map_verdict_to_proceed(IntegrityVerdict::ReviewNeeded));
    assert!(!map_verdict_to_proceed(IntegrityVerdict::BoundaryViolation));
}

#[test]
fn test_build_signal_combines_checkpoint_and_summary() {
    let checkpoint = check_integrity(&make_input(&concern_response("critical"))).unwrap();
    let summary = WindowSummary {
        size: 1,
        max_size: 10,
        verdicts: VerdictCounts {
            clear: 0,
            review_needed: 0,
            boundary_violation: 1,
        },
        integrity_ratio: 0.0,
        drift_alert_active: false,
    };

    let signal = build_signal(checkpoint, summary);
    assert!(!signal.proceed);
    assert_eq!(signal.recommended_action, RecommendedAction::DenyAndEscalate);
    assert_eq!(signal.window_summary.size, 1);
}
