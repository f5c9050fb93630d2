//! Alignment card summarization for the conscience prompt.
//!
//! Compresses an [`AlignmentCard`] into a short canonical block included in
//! every conscience prompt.  Values render in priority order; envelope
//! sections always render, with `none declared` placeholders when empty.
//! Principal data, audit commitments, and extension fields never appear
//! here.

use crate::aip::schemas::AlignmentCard;

/// Render the canonical multi-line summary of an alignment card.
///
/// # Example
///
/// ```rust
/// use aip::aip::analysis::card_summary::summarize_card;
/// use aip::aip::schemas::{AlignmentCard, AlignmentCardValue, AutonomyEnvelope};
///
/// let card = AlignmentCard {
///     card_id: "card-1".to_string(),
///     agent_description: None,
///     values: vec![
///         AlignmentCardValue { name: "safety".to_string(), priority: 2, description: None },
///         AlignmentCardValue { name: "honesty".to_string(), priority: 1, description: None },
///     ],
///     autonomy_envelope: AutonomyEnvelope::default(),
/// };
///
/// let summary = summarize_card(&card);
/// assert!(summary.starts_with("ALIGNMENT CARD SUMMARY (card_id: card-1)"));
/// assert!(summary.contains("Values (priority order): honesty, safety"));
/// assert!(summary.contains("Bounded actions: none declared"));
/// ```
pub fn summarize_card(card: &AlignmentCard) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("ALIGNMENT CARD SUMMARY (card_id: {})", card.card_id));

    if let Some(description) = &card.agent_description {
        lines.push(format!("Agent: {}", description));
    }

    // Values sorted by ascending priority (lowest number = highest priority).
    let mut sorted_values: Vec<_> = card.values.iter().collect();
    sorted_values.sort_by_key(|v| v.priority);

    if sorted_values.iter().any(|v| v.description.is_some()) {
        // At least one value has a description, so use the expanded format.
        lines.push("Values (priority order):".to_string());
        for value in &sorted_values {
            match &value.description {
                Some(description) => lines.push(format!("  - {}: {}", value.name, description)),
                None => lines.push(format!("  - {}", value.name)),
            }
        }
    } else {
        let names: Vec<&str> = sorted_values.iter().map(|v| v.name.as_str()).collect();
        lines.push(format!("Values (priority order): {}", names.join(", ")));
    }

    let envelope = &card.autonomy_envelope;

    if envelope.bounded_actions.is_empty() {
        lines.push("Bounded actions: none declared".to_string());
    } else {
        lines.push(format!(
            "Bounded actions: {}",
            envelope.bounded_actions.join(", ")
        ));
    }

    if envelope.forbidden_actions.is_empty() {
        lines.push("Forbidden actions: none declared".to_string());
    } else {
        lines.push(format!(
            "Forbidden actions: {}",
            envelope.forbidden_actions.join(", ")
        ));
    }

    if envelope.escalation_triggers.is_empty() {
        lines.push("Escalation triggers: none declared".to_string());
    } else {
        lines.push("Escalation triggers:".to_string());
        for trigger in &envelope.escalation_triggers {
            let reason = trigger
                .reason
                .as_ref()
                .map(|r| format!(": {}", r))
                .unwrap_or_default();
            lines.push(format!(
                "  - {} → {}{}",
                trigger.condition, trigger.action, reason
            ));
        }
    }

    lines.join("\n")
}
