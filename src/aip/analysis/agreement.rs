//! Card-conscience agreement validation.
//!
//! Runs once at client construction.  Only BOUNDARY and FEAR values are
//! examined (the other types are never injected into prompts either).
//! Matching is deliberately simple: case-insensitive substring containment
//! against each envelope entry, tried both as-is and with underscores
//! replaced by spaces.  A BOUNDARY value that negates a bounded action is a
//! conflict and must abort construction; values that echo forbidden actions
//! or escalation-trigger conditions are recorded as augmentations.

use chrono::Utc;

use crate::aip::schemas::{
    AlignmentCard, CardConscienceAgreement, CardConscienceAugmentation, CardConscienceConflict,
    ConscienceValue, ConscienceValueType,
};

/// Negation markers that turn a bounded-action mention into a conflict.
const NEGATION_MARKERS: [&str; 4] = ["never", "no ", "don't", "do not"];

/// `true` when `content_lower` contains `entry` in either normalized form.
fn mentions(content_lower: &str, entry: &str) -> bool {
    let entry_lower = entry.to_lowercase();
    content_lower.contains(&entry_lower.replace('_', " "))
        || content_lower.contains(&entry_lower)
}

/// Validate that the conscience values are compatible with the card.
///
/// # Example
///
/// ```rust
/// use aip::aip::analysis::agreement::validate_agreement;
/// use aip::aip::schemas::{
///     AlignmentCard, AutonomyEnvelope, ConscienceValue, ConscienceValueType,
/// };
///
/// let card = AlignmentCard {
///     card_id: "card-1".to_string(),
///     agent_description: None,
///     values: vec![],
///     autonomy_envelope: AutonomyEnvelope {
///         bounded_actions: vec!["write_files".to_string()],
///         forbidden_actions: vec![],
///         escalation_triggers: vec![],
///     },
/// };
/// // The card allows writing files, the conscience forbids it: conflict.
/// let conflicting = vec![ConscienceValue::new(
///     ConscienceValueType::Boundary,
///     "Never write files to disk",
///     "b-1",
/// )];
/// let agreement = validate_agreement(&card, &conflicting);
/// assert!(!agreement.valid);
/// assert_eq!(agreement.conflicts.len(), 1);
/// ```
pub fn validate_agreement(
    card: &AlignmentCard,
    conscience_values: &[ConscienceValue],
) -> CardConscienceAgreement {
    let mut conflicts: Vec<CardConscienceConflict> = Vec::new();
    let mut augmentations: Vec<CardConscienceAugmentation> = Vec::new();

    let envelope = &card.autonomy_envelope;

    for value in conscience_values {
        if !matches!(
            value.value_type,
            ConscienceValueType::Boundary | ConscienceValueType::Fear
        ) {
            continue;
        }

        let content_lower = value.content.to_lowercase();

        // Conflicts: a BOUNDARY that negates an action the card permits.
        if value.value_type == ConscienceValueType::Boundary {
            for action in &envelope.bounded_actions {
                if mentions(&content_lower, action)
                    && NEGATION_MARKERS
                        .iter()
                        .any(|marker| content_lower.contains(marker))
                {
                    conflicts.push(CardConscienceConflict {
                        conscience_value: value.clone(),
                        card_field: "autonomy_envelope.bounded_actions".to_string(),
                        description: format!(
                            "BOUNDARY \"{}\" conflicts with bounded action \"{}\"",
                            value.content, action
                        ),
                    });
                }
            }
        }

        // Augmentations: the value echoes a forbidden action.
        for action in &envelope.forbidden_actions {
            if mentions(&content_lower, action) {
                augmentations.push(CardConscienceAugmentation {
                    conscience_value: value.clone(),
                    augments: "autonomy_envelope.forbidden_actions".to_string(),
                    description: format!(
                        "{} \"{}\" reinforces forbidden action \"{}\"",
                        value.value_type, value.content, action
                    ),
                });
            }
        }

        // Augmentations: the value echoes an escalation trigger condition.
        for trigger in &envelope.escalation_triggers {
            if mentions(&content_lower, &trigger.condition) {
                augmentations.push(CardConscienceAugmentation {
                    conscience_value: value.clone(),
                    augments: "autonomy_envelope.escalation_triggers".to_string(),
                    description: format!(
                        "{} \"{}\" reinforces escalation trigger \"{}\"",
                        value.value_type, value.content, trigger.condition
                    ),
                });
            }
        }
    }

    CardConscienceAgreement {
        valid: conflicts.is_empty(),
        card_id: card.card_id.clone(),
        conscience_value_count: conscience_values.len(),
        conflicts,
        augmentations,
        validated_at: Utc::now().to_rfc3339(),
    }
}
