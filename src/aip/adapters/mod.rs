//! Provider adapters: protocol-level extraction of thinking blocks.
//!
//! Each supported provider has its own wire format for surfacing model
//! reasoning.  The [`ProviderAdapter`] trait abstracts over them with two
//! operations (one for complete JSON response bodies, one for accumulated
//! Server-Sent-Event streams), and the [`registry`] module selects an
//! adapter by provider name or API base URL.
//!
//! Adapters never fail: malformed input of any kind yields `None`, which the
//! pipeline treats as "no thinking block present" rather than as an error.
//!
//! # Example
//!
//! ```rust
//! use aip::aip::adapters::anthropic::AnthropicAdapter;
//! use aip::aip::adapters::ProviderAdapter;
//!
//! let body = r#"{
//!     "model": "claude-sonnet-4-0",
//!     "content": [{"type": "thinking", "thinking": "Let me check the card."}]
//! }"#;
//!
//! let extracted = AnthropicAdapter.extract_thinking(body).unwrap();
//! assert_eq!(extracted.content, "Let me check the card.");
//! assert_eq!(extracted.confidence, 1.0);
//! ```

pub mod anthropic;
pub mod fallback;
pub mod google;
pub mod openai;
pub mod registry;

use serde::{Deserialize, Serialize};

/// How the thinking content was obtained from the provider payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// First-class thinking blocks (Anthropic, Gemini thought parts).
    NativeThinking,
    /// Explicit `reasoning_content` fields (OpenAI o-series).
    ReasoningContent,
    /// Heuristic sentence matching over plain response text.
    ResponseAnalysis,
}

/// A thinking block pulled out of a provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedThinking {
    /// The reasoning text itself.  Hashed, analysed, and then dropped;
    /// never persisted.
    pub content: String,
    /// Provider the content came from.
    pub provider: String,
    /// Model reported by the payload, or `"unknown"`.
    pub model: String,
    pub extraction_method: ExtractionMethod,
    /// How trustworthy the extraction is, `0.0..=1.0`.
    pub confidence: f64,
    /// Whether the provider reported the thinking as truncated.
    pub truncated: bool,
}

/// Interface all provider adapters implement.
///
/// Implementations must be stateless and cheap to call; the registry shares
/// them behind `Arc`.
pub trait ProviderAdapter: Send + Sync {
    /// Canonical provider name (`"anthropic"`, `"openai"`, …).
    fn provider(&self) -> &str;

    /// Extract thinking content from a complete (non-streaming) response
    /// body.  `None` when the body is malformed or carries no thinking.
    fn extract_thinking(&self, response_body: &str) -> Option<ExtractedThinking>;

    /// Extract thinking content from an accumulated SSE response body.
    /// `None` when no thinking deltas were observed.
    fn extract_thinking_from_stream(&self, sse_body: &str) -> Option<ExtractedThinking>;
}

/// Separator between multiple thinking blocks in one response.
pub(crate) const THINKING_SEPARATOR: &str = "\n\n---\n\n";

/// Iterate the `data: ` payloads of an SSE body, in order.
pub(crate) fn sse_data_payloads(sse_body: &str) -> impl Iterator<Item = &str> {
    sse_body.split('\n').filter_map(|line| line.strip_prefix("data: "))
}
