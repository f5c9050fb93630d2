// src/aip/analysis/mod.rs

pub mod agreement;
pub mod card_summary;
pub mod drift;
pub mod engine;
pub mod prompt;

pub use agreement::validate_agreement;
pub use card_summary::summarize_card;
pub use drift::{create_drift_state, detect_integrity_drift, DriftState};
pub use engine::{
    build_signal, check_integrity, hash_thinking_block, map_verdict_to_action,
    map_verdict_to_proceed, CheckIntegrityInput, ThinkingInput,
};
pub use prompt::{build_conscience_prompt, BuiltPrompt, PromptInput};
