//! Integrity drift detection.
//!
//! Tracks the run of consecutive non-clear verdicts within a session and
//! raises a single [`IntegrityDriftAlert`] when the streak reaches the
//! sustained-checks threshold.  A clear verdict resets the streak
//! atomically (count, fired flag, and streak lists together); once an alert
//! has fired, no further alerts are produced until the streak resets.

use chrono::Utc;
use uuid::Uuid;

use crate::aip::constants::{
    DEFAULT_SUSTAINED_CHECKS_THRESHOLD, DRIFT_ALERT_ID_PREFIX, DRIFT_SEVERITY_LOW_THRESHOLD,
    DRIFT_SEVERITY_MEDIUM_THRESHOLD,
};
use crate::aip::schemas::{
    ConcernCategory, DriftAlertType, DriftDirection, DriftSeverity, IntegrityCheckpoint,
    IntegrityDriftAlert, IntegrityVerdict,
};

/// Mutable drift-tracking state, owned by the client for the session.
#[derive(Debug, Clone, Default)]
pub struct DriftState {
    /// Consecutive non-clear verdicts.
    pub sustained_nonclear: u32,
    /// Whether an alert has fired for the current streak.
    pub alert_fired: bool,
    /// Checkpoint ids of the current streak.
    pub streak_checkpoint_ids: Vec<String>,
    /// Concern categories accumulated over the current streak.
    pub streak_categories: Vec<ConcernCategory>,
}

/// Fresh drift state.
pub fn create_drift_state() -> DriftState {
    DriftState::default()
}

/// Map a dominant concern category to a drift direction.  Categories
/// without a direction mapping yield `unknown`.
fn category_direction(category: ConcernCategory) -> DriftDirection {
    match category {
        ConcernCategory::PromptInjection => DriftDirection::InjectionPattern,
        ConcernCategory::ValueMisalignment => DriftDirection::ValueErosion,
        ConcernCategory::AutonomyViolation => DriftDirection::AutonomyCreep,
        ConcernCategory::DeceptiveReasoning => DriftDirection::DeceptionPattern,
        ConcernCategory::ReasoningCorruption | ConcernCategory::UndeclaredIntent => {
            DriftDirection::Unknown
        }
    }
}

/// Infer the drift direction from the streak's concern categories.
/// Requires a strict majority (> 50%); ties and even splits are `unknown`.
fn infer_drift_direction(categories: &[ConcernCategory]) -> DriftDirection {
    if categories.is_empty() {
        return DriftDirection::Unknown;
    }

    let mut max_category: Option<ConcernCategory> = None;
    let mut max_count = 0usize;
    for &candidate in categories {
        let count = categories.iter().filter(|&&c| c == candidate).count();
        if count > max_count {
            max_count = count;
            max_category = Some(candidate);
        }
    }

    match max_category {
        Some(category) if max_count * 2 > categories.len() => category_direction(category),
        _ => DriftDirection::Unknown,
    }
}

/// Update drift state with a new checkpoint, possibly producing an alert.
///
/// Returns the successor state and, when the streak just crossed the
/// threshold, the alert.  The input state is not mutated.
///
/// `threshold` defaults to
/// [`DEFAULT_SUSTAINED_CHECKS_THRESHOLD`](crate::aip::constants::DEFAULT_SUSTAINED_CHECKS_THRESHOLD)
/// when `None`.
pub fn detect_integrity_drift(
    state: &DriftState,
    checkpoint: &IntegrityCheckpoint,
    window_checkpoints: &[IntegrityCheckpoint],
    threshold: Option<u32>,
) -> (DriftState, Option<IntegrityDriftAlert>) {
    let effective_threshold = threshold.unwrap_or(DEFAULT_SUSTAINED_CHECKS_THRESHOLD);

    let mut new_state = state.clone();

    if checkpoint.verdict == IntegrityVerdict::Clear {
        // Streak over: reset everything atomically.
        new_state.sustained_nonclear = 0;
        new_state.alert_fired = false;
        new_state.streak_checkpoint_ids.clear();
        new_state.streak_categories.clear();
        return (new_state, None);
    }

    // Non-clear verdict extends the streak.
    new_state.sustained_nonclear += 1;
    new_state
        .streak_checkpoint_ids
        .push(checkpoint.checkpoint_id.clone());
    for concern in &checkpoint.concerns {
        new_state.streak_categories.push(concern.category);
    }

    if new_state.sustained_nonclear >= effective_threshold && !new_state.alert_fired {
        new_state.alert_fired = true;

        let clear_count = window_checkpoints
            .iter()
            .filter(|cp| cp.verdict == IntegrityVerdict::Clear)
            .count();
        let total_count = window_checkpoints.len();
        let integrity_similarity = if total_count > 0 {
            clear_count as f64 / total_count as f64
        } else {
            0.0
        };

        let severity = if integrity_similarity >= DRIFT_SEVERITY_LOW_THRESHOLD {
            DriftSeverity::Low
        } else if integrity_similarity >= DRIFT_SEVERITY_MEDIUM_THRESHOLD {
            DriftSeverity::Medium
        } else {
            DriftSeverity::High
        };

        let direction = infer_drift_direction(&new_state.streak_categories);

        let alert = IntegrityDriftAlert {
            alert_id: format!("{}{}", DRIFT_ALERT_ID_PREFIX, Uuid::new_v4()),
            agent_id: checkpoint.agent_id.clone(),
            session_id: checkpoint.session_id.clone(),
            checkpoint_ids: new_state.streak_checkpoint_ids.clone(),
            integrity_similarity,
            sustained_checks: new_state.sustained_nonclear,
            alert_type: DriftAlertType::Informative,
            severity,
            drift_direction: direction,
            message: format!(
                "{} consecutive integrity concerns detected. Dominant pattern: {}. Integrity ratio: {:.0}%.",
                new_state.sustained_nonclear,
                direction,
                integrity_similarity * 100.0
            ),
            detection_timestamp: Utc::now().to_rfc3339(),
        };

        return (new_state, Some(alert));
    }

    (new_state, None)
}
