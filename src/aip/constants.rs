//! Protocol constants for the Agent Integrity Protocol.
//!
//! Every tunable in the core is a compile-time constant collected here:
//! protocol versions, drift thresholds, truncation ratios, window bounds,
//! adapter confidence levels, webhook retry schedule, HTTP header names, and
//! identifier prefixes.  There is no global mutable state anywhere in the
//! crate.

/// AIP wire protocol version, sent in the [`AIP_VERSION_HEADER`] header.
pub const AIP_VERSION: &str = "0.1.0";

/// Version of the integrity analysis algorithm (verdict rules + drift).
pub const ALGORITHM_VERSION: &str = "1.0.0";

// ── Drift detection ──────────────────────────────────────────────────────

/// Consecutive non-clear verdicts required before a drift alert fires.
pub const DEFAULT_SUSTAINED_CHECKS_THRESHOLD: u32 = 3;

/// Integrity similarity at or above this is a `low` severity drift alert.
pub const DRIFT_SEVERITY_LOW_THRESHOLD: f64 = 0.7;

/// Integrity similarity at or above this (but below the low threshold) is
/// `medium`; anything below is `high`.
pub const DRIFT_SEVERITY_MEDIUM_THRESHOLD: f64 = 0.4;

// ── Thinking token budget ────────────────────────────────────────────────

/// Default token budget for the thinking block sent to the analysis LLM.
pub const DEFAULT_THINKING_TOKEN_BUDGET: usize = 4096;

/// Fraction of the budget spent on the head of a truncated thinking block.
pub const TRUNCATION_HEAD_RATIO: f64 = 0.75;

/// Fraction of the budget spent on the tail of a truncated thinking block.
pub const TRUNCATION_TAIL_RATIO: f64 = 0.25;

// ── Evidence ─────────────────────────────────────────────────────────────

/// Maximum length (in characters) of a concern's `evidence` quote.
pub const MAX_EVIDENCE_LENGTH: usize = 200;

/// Minimum thinking-block tokens required before the analysis LLM is
/// consulted.  Below this the check short-circuits to a synthetic clear
/// signal.  Opt-in via `AipConfig::min_evidence_tokens`.
pub const DEFAULT_MIN_EVIDENCE_TOKENS: usize = 100;

// ── Analysis defaults ────────────────────────────────────────────────────

/// Default timeout for the analysis LLM call, in milliseconds.
pub const DEFAULT_ANALYSIS_TIMEOUT_MS: u64 = 10_000;

/// Default `max_tokens` requested from the analysis LLM.
pub const DEFAULT_ANALYSIS_MAX_TOKENS: u32 = 1024;

// ── Window defaults ──────────────────────────────────────────────────────

/// Default maximum number of checkpoints retained in the session window.
pub const DEFAULT_WINDOW_MAX_SIZE: usize = 10;

/// Smallest permitted window size; construction fails below this.
pub const MIN_WINDOW_SIZE: usize = 3;

/// Default checkpoint age cutoff for the window, in seconds.
pub const DEFAULT_WINDOW_MAX_AGE_SECONDS: u64 = 3600;

// ── Adapter confidence ───────────────────────────────────────────────────

/// Confidence for providers with first-class thinking blocks (Anthropic).
pub const CONFIDENCE_NATIVE: f64 = 1.0;

/// Confidence for providers that surface reasoning explicitly but not as a
/// native thinking block (OpenAI `reasoning_content`, Gemini thought parts).
pub const CONFIDENCE_EXPLICIT: f64 = 0.9;

/// Confidence for heuristic extraction from plain response text.
pub const CONFIDENCE_FALLBACK: f64 = 0.3;

// ── Webhook ──────────────────────────────────────────────────────────────

/// Maximum delivery attempts for a signed webhook emission.
pub const WEBHOOK_MAX_RETRIES: u32 = 3;

/// Backoff delays between webhook delivery attempts, in milliseconds.
pub const WEBHOOK_RETRY_DELAYS_MS: [u64; 3] = [1000, 4000, 16000];

// ── HTTP ─────────────────────────────────────────────────────────────────

/// Content type for AIP payloads exchanged over HTTP.
pub const AIP_CONTENT_TYPE: &str = "application/aip+json";

/// Header carrying [`AIP_VERSION`].
pub const AIP_VERSION_HEADER: &str = "X-AIP-Version";

/// Header carrying the HMAC signature produced by [`crate::aip::http::sign_payload`].
pub const AIP_SIGNATURE_HEADER: &str = "X-AIP-Signature";

// ── Identifier prefixes ──────────────────────────────────────────────────

/// Prefix for integrity checkpoint ids.
pub const CHECKPOINT_ID_PREFIX: &str = "ic-";

/// Prefix for drift alert ids.
pub const DRIFT_ALERT_ID_PREFIX: &str = "ida-";

/// Prefix for registration ids.
pub const REGISTRATION_ID_PREFIX: &str = "reg-";
