//! OpenAI provider adapter.
//!
//! Reasoning models on the OpenAI API surface their chain of thought as a
//! `reasoning_content` field next to the regular message content, so this
//! adapter reads `choices[0].message.reasoning_content` (and the matching
//! delta field across streaming chunks).  Confidence is 0.9: the reasoning
//! is explicit but not a native thinking block.

use serde_json::Value;

use crate::aip::adapters::{
    sse_data_payloads, ExtractedThinking, ExtractionMethod, ProviderAdapter,
};
use crate::aip::constants::CONFIDENCE_EXPLICIT;

/// Adapter for the OpenAI Chat Completions wire format.
pub struct OpenAIAdapter;

impl ProviderAdapter for OpenAIAdapter {
    fn provider(&self) -> &str {
        "openai"
    }

    fn extract_thinking(&self, response_body: &str) -> Option<ExtractedThinking> {
        let parsed: Value = serde_json::from_str(response_body).ok()?;
        let obj = parsed.as_object()?;

        let model = obj
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let reasoning_content = obj
            .get("choices")?
            .as_array()?
            .first()?
            .get("message")?
            .get("reasoning_content")?
            .as_str()?;

        if reasoning_content.is_empty() {
            return None;
        }

        Some(ExtractedThinking {
            content: reasoning_content.to_string(),
            provider: self.provider().to_string(),
            model,
            extraction_method: ExtractionMethod::ReasoningContent,
            confidence: CONFIDENCE_EXPLICIT,
            truncated: false,
        })
    }

    fn extract_thinking_from_stream(&self, sse_body: &str) -> Option<ExtractedThinking> {
        let mut model = String::from("unknown");
        let mut reasoning = String::new();

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

            // Track model from the first chunk that carries it.
            if model == "unknown" {
                if let Some(m) = data.get("model").and_then(Value::as_str) {
                    model = m.to_string();
                }
            }

            let delta_reasoning = data
                .get("choices")
                .and_then(Value::as_array)
                .and_then(|choices| choices.first())
                .and_then(|choice| choice.get("delta"))
                .and_then(|delta| delta.get("reasoning_content"))
                .and_then(Value::as_str);

            if let Some(text) = delta_reasoning {
                reasoning.push_str(text);
            }
        }

        if reasoning.is_empty() {
            return None;
        }

        Some(ExtractedThinking {
            content: reasoning,
            provider: self.provider().to_string(),
            model,
            extraction_method: ExtractionMethod::ReasoningContent,
            confidence: CONFIDENCE_EXPLICIT,
            truncated: false,
        })
    }
}
