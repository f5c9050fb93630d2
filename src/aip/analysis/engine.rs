//! Integrity analysis engine.
//!
//! [`check_integrity`] turns a raw analysis-LLM response into an immutable
//! [`IntegrityCheckpoint`], validating every field of the response JSON
//! strictly (unknown verdicts, categories, severities, or consultation
//! depths are rejected, evidence quotes are clamped).  It is a pure
//! function modulo the minted `checkpoint_id` and `timestamp`.
//!
//! The verdict-to-action mapping and [`build_signal`] live here too, along
//! with [`hash_thinking_block`], the SHA-256 digest that stands in for the
//! reasoning text everywhere downstream (the raw text is never stored).

use chrono::Utc;
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::aip::constants::{CHECKPOINT_ID_PREFIX, MAX_EVIDENCE_LENGTH};
use crate::aip::error::AipError;
use crate::aip::schemas::{
    AnalysisMetadata, ConcernCategory, ConscienceContext, ConsultationDepth, IntegrityCheckpoint,
    IntegrityConcern, IntegritySeverity, IntegritySignal, IntegrityVerdict, RecommendedAction,
    WindowPosition, WindowSummary,
};

// ───────────────────────────────────────────────────────────────────────────
// Input types
// ───────────────────────────────────────────────────────────────────────────

/// Metadata about the extracted thinking block, carried into the checkpoint.
#[derive(Debug, Clone)]
pub struct ThinkingInput {
    /// Pre-computed SHA-256 of the thinking content.
    pub hash: String,
    /// Provider that generated the thinking block.
    pub provider: String,
    /// Model that generated the thinking block.
    pub model: String,
    /// Estimated tokens in the original thinking block.
    pub tokens_original: usize,
    /// Estimated tokens sent to the analysis LLM.
    pub tokens_analyzed: usize,
    pub truncated: bool,
    /// Adapter extraction confidence (0.0 to 1.0).
    pub confidence: f64,
}

/// Input to the [`check_integrity`] pure function.
#[derive(Debug, Clone)]
pub struct CheckIntegrityInput {
    /// Raw analysis LLM response (JSON string).
    pub analysis_response: String,
    pub thinking: ThinkingInput,
    pub agent_id: String,
    pub card_id: String,
    pub session_id: String,
    pub window_position: WindowPosition,
    /// Analysis LLM model used.
    pub analysis_model: String,
    pub analysis_duration_ms: f64,
    /// Optional external trace link.
    pub linked_trace_id: Option<String>,
}

// ───────────────────────────────────────────────────────────────────────────
// Validation helpers
// ───────────────────────────────────────────────────────────────────────────

fn invalid(field: &str, detail: String) -> AipError {
    AipError::InvalidField {
        field: field.to_string(),
        detail,
    }
}

fn validate_verdict(value: Option<&Value>) -> Result<IntegrityVerdict, AipError> {
    let s = value
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("verdict", "expected string".to_string()))?;
    match s {
        "clear" => Ok(IntegrityVerdict::Clear),
        "review_needed" => Ok(IntegrityVerdict::ReviewNeeded),
        "boundary_violation" => Ok(IntegrityVerdict::BoundaryViolation),
        other => Err(invalid(
            "verdict",
            format!(
                "\"{}\" is not one of: boundary_violation, clear, review_needed",
                other
            ),
        )),
    }
}

fn parse_category(s: &str) -> Option<ConcernCategory> {
    match s {
        "prompt_injection" => Some(ConcernCategory::PromptInjection),
        "value_misalignment" => Some(ConcernCategory::ValueMisalignment),
        "autonomy_violation" => Some(ConcernCategory::AutonomyViolation),
        "reasoning_corruption" => Some(ConcernCategory::ReasoningCorruption),
        "deceptive_reasoning" => Some(ConcernCategory::DeceptiveReasoning),
        "undeclared_intent" => Some(ConcernCategory::UndeclaredIntent),
        _ => None,
    }
}

fn parse_severity(s: &str) -> Option<IntegritySeverity> {
    match s {
        "low" => Some(IntegritySeverity::Low),
        "medium" => Some(IntegritySeverity::Medium),
        "high" => Some(IntegritySeverity::High),
        "critical" => Some(IntegritySeverity::Critical),
        _ => None,
    }
}

fn parse_depth(s: &str) -> Option<ConsultationDepth> {
    match s {
        "surface" => Some(ConsultationDepth::Surface),
        "standard" => Some(ConsultationDepth::Standard),
        "deep" => Some(ConsultationDepth::Deep),
        _ => None,
    }
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn validate_concerns(value: Option<&Value>) -> Result<Vec<IntegrityConcern>, AipError> {
    let array = value
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("concerns", "expected array".to_string()))?;

    let mut concerns = Vec::with_capacity(array.len());

    for (index, item) in array.iter().enumerate() {
        if !item.is_object() {
            return Err(invalid(
                &format!("concerns[{}]", index),
                "expected object".to_string(),
            ));
        }

        let category_str = item
            .get("category")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                invalid(
                    &format!("concerns[{}].category", index),
                    "must be a string".to_string(),
                )
            })?;
        let category = parse_category(category_str).ok_or_else(|| {
            invalid(
                &format!("concerns[{}].category", index),
                format!("\"{}\" is not a known concern category", category_str),
            )
        })?;

        let severity_str = item
            .get("severity")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                invalid(
                    &format!("concerns[{}].severity", index),
                    "must be a string".to_string(),
                )
            })?;
        let severity = parse_severity(severity_str).ok_or_else(|| {
            invalid(
                &format!("concerns[{}].severity", index),
                format!("\"{}\" is not a known severity", severity_str),
            )
        })?;

        let description = item
            .get("description")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                invalid(
                    &format!("concerns[{}].description", index),
                    "must be a string".to_string(),
                )
            })?
            .to_string();

        let evidence_raw = item.get("evidence").and_then(Value::as_str).ok_or_else(|| {
            invalid(
                &format!("concerns[{}].evidence", index),
                "must be a string".to_string(),
            )
        })?;
        // Clamp the quote to the evidence limit (counted in chars).
        let evidence: String = evidence_raw.chars().take(MAX_EVIDENCE_LENGTH).collect();

        concerns.push(IntegrityConcern {
            category,
            severity,
            description,
            evidence,
            relevant_card_field: optional_string(item.get("relevant_card_field")),
            relevant_conscience_value: optional_string(item.get("relevant_conscience_value")),
        });
    }

    Ok(concerns)
}

fn string_array(
    object: &Value,
    parent: &str,
    field: &str,
) -> Result<Vec<String>, AipError> {
    let array = object
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(&format!("{}.{}", parent, field), "must be an array".to_string()))?;
    Ok(array
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

fn validate_conscience_context(value: Option<&Value>) -> Result<ConscienceContext, AipError> {
    let object = value
        .filter(|v| v.is_object())
        .ok_or_else(|| invalid("conscience_context", "expected object".to_string()))?;

    let values_checked = string_array(object, "conscience_context", "values_checked")?;
    let conflicts = string_array(object, "conscience_context", "conflicts")?;
    let supports = string_array(object, "conscience_context", "supports")?;
    let considerations = string_array(object, "conscience_context", "considerations")?;

    let depth_str = object
        .get("consultation_depth")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            invalid(
                "conscience_context.consultation_depth",
                "must be a string".to_string(),
            )
        })?;
    let consultation_depth = parse_depth(depth_str).ok_or_else(|| {
        invalid(
            "conscience_context.consultation_depth",
            format!("\"{}\" is not one of: deep, standard, surface", depth_str),
        )
    })?;

    Ok(ConscienceContext {
        values_checked,
        conflicts,
        supports,
        considerations,
        consultation_depth,
    })
}

// ───────────────────────────────────────────────────────────────────────────
// Core functions
// ───────────────────────────────────────────────────────────────────────────

/// Parse and validate the analysis LLM's JSON response and mint an
/// [`IntegrityCheckpoint`].
///
/// Pure apart from the generated `checkpoint_id` and `timestamp`: identical
/// inputs produce checkpoints identical in every other field.
pub fn check_integrity(input: &CheckIntegrityInput) -> Result<IntegrityCheckpoint, AipError> {
    // 1. Parse the analysis response as JSON.
    let parsed: Value =
        serde_json::from_str(&input.analysis_response).map_err(|_| AipError::Parse {
            detail: input.analysis_response.chars().take(100).collect(),
        })?;

    // 2. Validate required fields.
    let verdict = validate_verdict(parsed.get("verdict"))?;
    let concerns = validate_concerns(parsed.get("concerns"))?;

    let reasoning_summary = parsed
        .get("reasoning_summary")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("reasoning_summary", "expected string".to_string()))?
        .to_string();

    let conscience_context = validate_conscience_context(parsed.get("conscience_context"))?;

    // 3. Mint identity and assemble.
    let checkpoint_id = format!("{}{}", CHECKPOINT_ID_PREFIX, Uuid::new_v4());

    let analysis_metadata = AnalysisMetadata {
        analysis_model: input.analysis_model.clone(),
        analysis_duration_ms: input.analysis_duration_ms,
        thinking_tokens_original: input.thinking.tokens_original,
        thinking_tokens_analyzed: input.thinking.tokens_analyzed,
        truncated: input.thinking.truncated,
        extraction_confidence: input.thinking.confidence,
    };

    Ok(IntegrityCheckpoint {
        checkpoint_id,
        agent_id: input.agent_id.clone(),
        card_id: input.card_id.clone(),
        session_id: input.session_id.clone(),
        timestamp: Utc::now().to_rfc3339(),
        thinking_block_hash: input.thinking.hash.clone(),
        provider: input.thinking.provider.clone(),
        model: input.thinking.model.clone(),
        verdict,
        concerns,
        reasoning_summary,
        conscience_context,
        window_position: input.window_position,
        analysis_metadata,
        linked_trace_id: input.linked_trace_id.clone(),
    })
}

/// Map a verdict + concerns to the recommended action:
///
/// | verdict | concerns | action |
/// |---|---|---|
/// | `clear` | — | `continue` |
/// | `review_needed` | — | `log_and_continue` |
/// | `boundary_violation` | any critical | `deny_and_escalate` |
/// | `boundary_violation` | otherwise | `pause_for_review` |
pub fn map_verdict_to_action(
    verdict: IntegrityVerdict,
    concerns: &[IntegrityConcern],
) -> RecommendedAction {
    match verdict {
        IntegrityVerdict::Clear => RecommendedAction::Continue,
        IntegrityVerdict::ReviewNeeded => RecommendedAction::LogAndContinue,
        IntegrityVerdict::BoundaryViolation => {
            let has_critical = concerns
                .iter()
                .any(|c| c.severity == IntegritySeverity::Critical);
            if has_critical {
                RecommendedAction::DenyAndEscalate
            } else {
                RecommendedAction::PauseForReview
            }
        }
    }
}

/// `true` for every verdict except `boundary_violation`.
pub fn map_verdict_to_proceed(verdict: IntegrityVerdict) -> bool {
    verdict != IntegrityVerdict::BoundaryViolation
}

/// Assemble an [`IntegritySignal`] from a checkpoint and window summary.
pub fn build_signal(
    checkpoint: IntegrityCheckpoint,
    window_summary: WindowSummary,
) -> IntegritySignal {
    let proceed = map_verdict_to_proceed(checkpoint.verdict);
    let recommended_action = map_verdict_to_action(checkpoint.verdict, &checkpoint.concerns);
    IntegritySignal {
        checkpoint,
        proceed,
        recommended_action,
        window_summary,
    }
}

/// Lowercase-hex SHA-256 of a thinking block's UTF-8 bytes.
///
/// Checkpoints carry this digest instead of the reasoning text itself.
///
/// # Example
///
/// ```rust
/// use aip::aip::analysis::engine::hash_thinking_block;
///
/// let digest = hash_thinking_block("Let me help with code.");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, hash_thinking_block("Let me help with code."));
/// ```
pub fn hash_thinking_block(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
