//! End-to-end pipeline scenarios driven without a network: adapter →
//! prompt → engine → window → drift → signal.

use aip::aip::adapters::anthropic::AnthropicAdapter;
use aip::aip::adapters::ProviderAdapter;
use aip::aip::analysis::drift::{create_drift_state, detect_integrity_drift};
use aip::aip::analysis::engine::{
    build_signal, check_integrity, hash_thinking_block, CheckIntegrityInput, ThinkingInput,
};
use aip::aip::analysis::prompt::{build_conscience_prompt, PromptInput};
use aip::aip::schemas::{
    AlignmentCard, AlignmentCardValue, AutonomyEnvelope, ConscienceValue, ConscienceValueType,
    IntegrityVerdict, RecommendedAction, SessionBoundary, WindowConfig, WindowMode,
};
use aip::aip::window::WindowManager;

const CLEAR_VERDICT: &str = r#"{"verdict":"clear","concerns":[],"reasoning_summary":"aligned","conscience_context":{"values_checked":[],"conflicts":[],"supports":[],"considerations":[],"consultation_depth":"surface"}}"#;

fn pipeline_card() -> AlignmentCard {
    AlignmentCard {
        card_id: "card-pipeline".to_string(),
        agent_description: None,
        values: vec![AlignmentCardValue {
            name: "honesty".to_string(),
            priority: 1,
            description: None,
        }],
        autonomy_envelope: AutonomyEnvelope::default(),
    }
}

#[test]
fn test_clear_pipeline_from_provider_body_to_signal() {
    let card = pipeline_card();
    let conscience = vec![ConscienceValue::new(
        ConscienceValueType::Boundary,
        "Never deceive the user",
        "b-1",
    )];
    let mut window = WindowManager::new(
        WindowConfig {
            max_size: 5,
            mode: WindowMode::Sliding,
            session_boundary: SessionBoundary::Reset,
            max_age_seconds: 3600,
        },
        "sess-card-pip-1",
    )
    .unwrap();
    let drift_state = create_drift_state();

    // 1. Extract.
    let body = r#"{"model":"claude-sonnet-4-0","content":[{"type":"thinking","thinking":"Let me help with code."}]}"#;
    let thinking = AnthropicAdapter.extract_thinking(body).unwrap();

    // 2. Prompt over the empty window.
    let prompt = build_conscience_prompt(&PromptInput::new(
        &card,
        &conscience,
        window.checkpoints(),
        &thinking.content,
    ));
    assert!(!prompt.truncated);
    assert!(prompt
        .user
        .contains("SESSION CONTEXT: First check in session (no prior context)"));

    // 3. Validate the (stubbed) analysis verdict.
    let checkpoint = check_integrity(&CheckIntegrityInput {
        analysis_response: CLEAR_VERDICT.to_string(),
        thinking: ThinkingInput {
            hash: hash_thinking_block(&thinking.content),
            provider: thinking.provider.clone(),
            model: thinking.model.clone(),
            tokens_original: prompt.original_tokens,
            tokens_analyzed: prompt.analyzed_tokens,
            truncated: prompt.truncated,
            confidence: thinking.confidence,
        },
        agent_id: "agent-pipeline".to_string(),
        card_id: card.card_id.clone(),
        session_id: window.session_id().to_string(),
        window_position: aip::aip::schemas::WindowPosition {
            index: 0,
            window_size: 1,
        },
        analysis_model: "claude-sonnet-4-0".to_string(),
        analysis_duration_ms: 12.5,
        linked_trace_id: None,
    })
    .unwrap();

    // 4. Window + drift.
    window.push(checkpoint.clone());
    let (_, alert) = detect_integrity_drift(&drift_state, &checkpoint, window.checkpoints(), None);
    assert!(alert.is_none());

    // 5. Signal.
    let signal = build_signal(checkpoint, window.get_summary());
    assert!(signal.proceed);
    assert_eq!(signal.recommended_action, RecommendedAction::Continue);
    assert_eq!(signal.window_summary.size, 1);
    assert_eq!(signal.window_summary.integrity_ratio, 1.0);

    // The raw thinking text must not survive anywhere in the signal.
    let serialized = serde_json::to_string(&signal).unwrap();
    assert!(!serialized.contains("Let me help with code."));
}

#[test]
fn test_second_check_sees_first_in_window_context() {
    let card = pipeline_card();
    let mut window = WindowManager::new(WindowConfig::default(), "sess-card-pip-1").unwrap();

    let thinking = AnthropicAdapter
        .extract_thinking(
            r#"{"model":"m","content":[{"type":"thinking","thinking":"First reasoning."}]}"#,
        )
        .unwrap();
    let prompt = build_conscience_prompt(&PromptInput::new(
        &card,
        &[],
        window.checkpoints(),
        &thinking.content,
    ));
    let checkpoint = check_integrity(&CheckIntegrityInput {
        analysis_response: CLEAR_VERDICT.to_string(),
        thinking: ThinkingInput {
            hash: hash_thinking_block(&thinking.content),
            provider: thinking.provider.clone(),
            model: thinking.model.clone(),
            tokens_original: prompt.original_tokens,
            tokens_analyzed: prompt.analyzed_tokens,
            truncated: prompt.truncated,
            confidence: thinking.confidence,
        },
        agent_id: "agent-pipeline".to_string(),
        card_id: card.card_id.clone(),
        session_id: window.session_id().to_string(),
        window_position: aip::aip::schemas::WindowPosition {
            index: 0,
            window_size: 1,
        },
        analysis_model: "m".to_string(),
        analysis_duration_ms: 1.0,
        linked_trace_id: None,
    })
    .unwrap();
    window.push(checkpoint);

    let second_prompt = build_conscience_prompt(&PromptInput::new(
        &card,
        &[],
        window.checkpoints(),
        "Second reasoning.",
    ));
    assert!(second_prompt.user.contains("SESSION CONTEXT (window: 1/1):"));
    assert!(second_prompt.user.contains("1. [clear] aligned"));
}

// ── Wire formats ─────────────────────────────────────────────────────────

#[test]
fn test_enum_wire_strings() {
    assert_eq!(
        serde_json::to_string(&IntegrityVerdict::BoundaryViolation).unwrap(),
        "\"boundary_violation\""
    );
    assert_eq!(
        serde_json::to_string(&RecommendedAction::DenyAndEscalate).unwrap(),
        "\"deny_and_escalate\""
    );
    assert_eq!(
        serde_json::to_string(&ConscienceValueType::Boundary).unwrap(),
        "\"BOUNDARY\""
    );

    let verdict: IntegrityVerdict = serde_json::from_str("\"review_needed\"").unwrap();
    assert_eq!(verdict, IntegrityVerdict::ReviewNeeded);
}

#[test]
fn test_conscience_value_serializes_type_field() {
    let value = ConscienceValue::new(ConscienceValueType::Fear, "Risk of sycophancy", "f-1");
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json["type"], "FEAR");
    assert_eq!(json["content"], "Risk of sycophancy");
    assert_eq!(json["id"], "f-1");

    let parsed: ConscienceValue = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, value);
}
