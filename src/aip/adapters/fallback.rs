//! Fallback provider adapter.
//!
//! For providers without native thinking support, reasoning is inferred
//! from the plain response text: the adapter locates the main text payload
//! (Anthropic-like, OpenAI-like, Google-like, or a raw string) and collects
//! every sentence that opens with one of a fixed catalogue of reasoning
//! prefixes ("I need to", "Let me", "However", …).  Confidence is 0.3
//! because the extraction is purely inferential.
//!
//! The prefix pattern is compiled once at startup.  A sentence starts at
//! the beginning of a line or after a terminator (`.`, `!`, `?`) followed
//! by whitespace, and runs through its own terminator; matching is
//! case-insensitive.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::aip::adapters::{
    sse_data_payloads, ExtractedThinking, ExtractionMethod, ProviderAdapter,
};
use crate::aip::constants::CONFIDENCE_FALLBACK;

/// Sentence openers that commonly narrate a model's reasoning process.
const REASONING_INDICATORS: [&str; 14] = [
    "I need to",
    "Let me",
    "I should",
    "My approach",
    "First, I'll",
    "I'm going to",
    "Step 1",
    "Consider",
    "On one hand",
    "However",
    "But",
    "Alternatively",
    "I think",
    "I'll",
];

lazy_static! {
    /// One terminator followed by one whitespace char: the boundary after
    /// which a new sentence may begin.
    static ref SENTENCE_BOUNDARY: Regex = Regex::new(r"[.!?]\s").unwrap();

    /// Anchored, case-insensitive match of any reasoning indicator at the
    /// start of a candidate sentence.
    static ref REASONING_PREFIX: Regex = {
        let escaped: Vec<String> = REASONING_INDICATORS
            .iter()
            .map(|indicator| regex::escape(indicator))
            .collect();
        Regex::new(&format!("(?i)^(?:{})", escaped.join("|"))).unwrap()
    };
}

/// Collect sentences that open with a reasoning indicator, joined by single
/// spaces.  `None` when no sentence matches.
fn match_reasoning_patterns(text: &str, provider: &str) -> Option<ExtractedThinking> {
    // Candidate sentence starts: every line start, plus every position
    // right after a terminator-whitespace pair.
    let mut starts: Vec<usize> = vec![0];
    for (pos, ch) in text.char_indices() {
        if ch == '\n' {
            starts.push(pos + 1);
        }
    }
    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        starts.push(boundary.end());
    }
    starts.sort_unstable();
    starts.dedup();

    let mut matches: Vec<&str> = Vec::new();
    let mut last_end = 0usize;

    for &start in &starts {
        // Starts inside an already-collected sentence are not boundaries.
        if start < last_end || start >= text.len() {
            continue;
        }
        let rest = &text[start..];
        if !REASONING_PREFIX.is_match(rest) {
            continue;
        }
        // The sentence runs through its own terminator, or to end of text.
        let end = rest
            .find(|c| c == '.' || c == '!' || c == '?')
            .map(|offset| start + offset + 1)
            .unwrap_or(text.len());
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            matches.push(sentence);
        }
        last_end = end;
    }

    if matches.is_empty() {
        return None;
    }

    Some(ExtractedThinking {
        content: matches.join(" "),
        provider: provider.to_string(),
        model: String::from("unknown"),
        extraction_method: ExtractionMethod::ResponseAnalysis,
        confidence: CONFIDENCE_FALLBACK,
        truncated: false,
    })
}

/// Locate the main text payload of a response body, probing provider
/// formats in order: Anthropic-like `content[].text`, OpenAI-like
/// `choices[0].message.content`, Google-like
/// `candidates[0].content.parts[0].text`, then the raw string when the body
/// is not JSON at all.
fn extract_text_content(response_body: &str) -> Option<String> {
    let parsed: Value = match serde_json::from_str(response_body) {
        Ok(v) => v,
        Err(_) => {
            // Not valid JSON; treat as plain text if non-blank.
            if response_body.trim().is_empty() {
                return None;
            }
            return Some(response_body.to_string());
        }
    };

    // A JSON string payload is used directly.
    if let Some(s) = parsed.as_str() {
        if s.is_empty() {
            return None;
        }
        return Some(s.to_string());
    }

    let obj = parsed.as_object()?;

    // Anthropic-like: first content block with non-empty text.
    if let Some(content) = obj.get("content").and_then(Value::as_array) {
        for block in content {
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
    }

    // OpenAI-like: choices[0].message.content.
    if let Some(text) = obj
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
    {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    // Google-like: candidates[0].content.parts[0].text.
    if let Some(text) = obj
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
    {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    None
}

/// Heuristic adapter for models without native thinking support.
pub struct FallbackAdapter;

impl ProviderAdapter for FallbackAdapter {
    fn provider(&self) -> &str {
        "fallback"
    }

    fn extract_thinking(&self, response_body: &str) -> Option<ExtractedThinking> {
        let text = extract_text_content(response_body)?;
        if text.is_empty() {
            return None;
        }
        match_reasoning_patterns(&text, self.provider())
    }

    /// Accumulate all text deltas from the stream, then apply the same
    /// sentence matching as [`extract_thinking`](ProviderAdapter::extract_thinking).
    fn extract_thinking_from_stream(&self, sse_body: &str) -> Option<ExtractedThinking> {
        let mut accumulated = String::new();

        for payload in sse_data_payloads(sse_body) {
            if payload == "[DONE]" {
                continue;
            }

            let data: Value = match serde_json::from_str(payload) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if !data.is_object() {
                continue;
            }

            // Anthropic-style: content_block_delta with text or thinking.
            if let Some(delta) = data.get("delta") {
                if let Some(text) = delta.get("text").and_then(Value::as_str) {
                    accumulated.push_str(text);
                    continue;
                }
                if let Some(text) = delta.get("thinking").and_then(Value::as_str) {
                    accumulated.push_str(text);
                    continue;
                }
            }

            // OpenAI-style: choices[0].delta.content.
            if let Some(text) = data
                .get("choices")
                .and_then(Value::as_array)
                .and_then(|choices| choices.first())
                .and_then(|choice| choice.get("delta"))
                .and_then(|delta| delta.get("content"))
                .and_then(Value::as_str)
            {
                accumulated.push_str(text);
                continue;
            }

            // Google-style: candidates[0].content.parts[0].text.
            if let Some(text) = data
                .get("candidates")
                .and_then(Value::as_array)
                .and_then(|candidates| candidates.first())
                .and_then(|candidate| candidate.get("content"))
                .and_then(|content| content.get("parts"))
                .and_then(Value::as_array)
                .and_then(|parts| parts.first())
                .and_then(|part| part.get("text"))
                .and_then(Value::as_str)
            {
                accumulated.push_str(text);
            }
        }

        if accumulated.is_empty() {
            return None;
        }

        match_reasoning_patterns(&accumulated, "fallback")
    }
}
