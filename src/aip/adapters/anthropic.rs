//! Anthropic provider adapter.
//!
//! Anthropic exposes thinking as first-class content blocks, which makes
//! this the highest-confidence adapter (1.0).  Non-streaming bodies carry
//! `content[]` elements with `type == "thinking"`; streams announce thinking
//! blocks via `content_block_start` events and feed them through
//! `thinking_delta` payloads keyed by block index.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::aip::adapters::{
    sse_data_payloads, ExtractedThinking, ExtractionMethod, ProviderAdapter, THINKING_SEPARATOR,
};
use crate::aip::constants::CONFIDENCE_NATIVE;

/// Adapter for the Anthropic Messages API wire format.
pub struct AnthropicAdapter;

impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> &str {
        "anthropic"
    }

    /// Collect every `content[]` element whose `type` is `"thinking"` and
    /// join their `thinking` fields.
    fn extract_thinking(&self, response_body: &str) -> Option<ExtractedThinking> {
        let parsed: Value = serde_json::from_str(response_body).ok()?;
        let obj = parsed.as_object()?;

        let model = obj
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let content = obj.get("content")?.as_array()?;

        let mut thinking_texts: Vec<&str> = Vec::new();
        for block in content {
            if block.get("type").and_then(Value::as_str) == Some("thinking") {
                if let Some(text) = block.get("thinking").and_then(Value::as_str) {
                    thinking_texts.push(text);
                }
            }
        }

        if thinking_texts.is_empty() {
            return None;
        }

        Some(ExtractedThinking {
            content: thinking_texts.join(THINKING_SEPARATOR),
            provider: self.provider().to_string(),
            model,
            extraction_method: ExtractionMethod::NativeThinking,
            confidence: CONFIDENCE_NATIVE,
            truncated: false,
        })
    }

    /// Accumulate `thinking_delta` payloads per announced block index and
    /// concatenate the blocks in ascending index order.
    fn extract_thinking_from_stream(&self, sse_body: &str) -> Option<ExtractedThinking> {
        let mut model = String::from("unknown");
        // Ascending-index accumulation of announced thinking blocks.
        let mut thinking_contents: BTreeMap<u64, String> = BTreeMap::new();

        for payload in sse_data_payloads(sse_body) {
            let data: Value = match serde_json::from_str(payload) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if !data.is_object() {
                continue;
            }

            match data.get("type").and_then(Value::as_str) {
                Some("message_start") => {
                    if let Some(m) = data
                        .get("message")
                        .and_then(|msg| msg.get("model"))
                        .and_then(Value::as_str)
                    {
                        model = m.to_string();
                    }
                }
                Some("content_block_start") => {
                    let index = data.get("index").and_then(Value::as_u64);
                    let is_thinking = data
                        .get("content_block")
                        .and_then(|b| b.get("type"))
                        .and_then(Value::as_str)
                        == Some("thinking");
                    if let (Some(index), true) = (index, is_thinking) {
                        thinking_contents.entry(index).or_default();
                    }
                }
                Some("content_block_delta") => {
                    let index = data.get("index").and_then(Value::as_u64);
                    let delta = data.get("delta");
                    let is_thinking_delta = delta
                        .and_then(|d| d.get("type"))
                        .and_then(Value::as_str)
                        == Some("thinking_delta");
                    if let (Some(index), true) = (index, is_thinking_delta) {
                        // Only accumulate into blocks announced as thinking.
                        if let Some(accumulated) = thinking_contents.get_mut(&index) {
                            if let Some(text) = delta
                                .and_then(|d| d.get("thinking"))
                                .and_then(Value::as_str)
                            {
                                accumulated.push_str(text);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        if thinking_contents.is_empty() {
            return None;
        }

        let thinking_texts: Vec<&str> = thinking_contents
            .values()
            .filter(|text| !text.is_empty())
            .map(String::as_str)
            .collect();

        if thinking_texts.is_empty() {
            return None;
        }

        Some(ExtractedThinking {
            content: thinking_texts.join(THINKING_SEPARATOR),
            provider: self.provider().to_string(),
            model,
            extraction_method: ExtractionMethod::NativeThinking,
            confidence: CONFIDENCE_NATIVE,
            truncated: false,
        })
    }
}
