//! Google / Gemini provider adapter.
//!
//! Gemini surfaces thinking as content parts flagged `thought: true` under
//! `candidates[0].content.parts[]`, with the model name in `modelVersion`.
//! Confidence is 0.9: the flag is explicit but a secondary signal compared
//! to Anthropic's first-class thinking blocks.

use serde_json::Value;

use crate::aip::adapters::{
    sse_data_payloads, ExtractedThinking, ExtractionMethod, ProviderAdapter, THINKING_SEPARATOR,
};
use crate::aip::constants::CONFIDENCE_EXPLICIT;

/// Adapter for the Gemini generateContent wire format.
pub struct GoogleAdapter;

/// Collect the `text` of every part flagged `thought == true`.
fn thought_part_texts<'a>(data: &'a Value, out: &mut Vec<&'a str>) {
    let parts = data
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array);

    if let Some(parts) = parts {
        for part in parts {
            if part.get("thought").and_then(Value::as_bool) == Some(true) {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    out.push(text);
                }
            }
        }
    }
}

impl ProviderAdapter for GoogleAdapter {
    fn provider(&self) -> &str {
        "google"
    }

    fn extract_thinking(&self, response_body: &str) -> Option<ExtractedThinking> {
        let parsed: Value = serde_json::from_str(response_body).ok()?;
        let obj = parsed.as_object()?;

        let model = obj
            .get("modelVersion")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        // Require the candidate structure to be present even when it holds
        // no thought parts.
        obj.get("candidates")?.as_array()?;

        let mut thinking_texts: Vec<&str> = Vec::new();
        thought_part_texts(&parsed, &mut thinking_texts);

        if thinking_texts.is_empty() {
            return None;
        }

        Some(ExtractedThinking {
            content: thinking_texts.join(THINKING_SEPARATOR),
            provider: self.provider().to_string(),
            model,
            extraction_method: ExtractionMethod::NativeThinking,
            confidence: CONFIDENCE_EXPLICIT,
            truncated: false,
        })
    }

    fn extract_thinking_from_stream(&self, sse_body: &str) -> Option<ExtractedThinking> {
        let mut model = String::from("unknown");
        let mut owned_texts: Vec<String> = Vec::new();

        for payload in sse_data_payloads(sse_body) {
            let data: Value = match serde_json::from_str(payload) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if !data.is_object() {
                continue;
            }

            if let Some(m) = data.get("modelVersion").and_then(Value::as_str) {
                model = m.to_string();
            }

            let mut chunk_texts: Vec<&str> = Vec::new();
            thought_part_texts(&data, &mut chunk_texts);
            owned_texts.extend(chunk_texts.iter().map(|t| t.to_string()));
        }

        if owned_texts.is_empty() {
            return None;
        }

        Some(ExtractedThinking {
            content: owned_texts.join(THINKING_SEPARATOR),
            provider: self.provider().to_string(),
            model,
            extraction_method: ExtractionMethod::NativeThinking,
            confidence: CONFIDENCE_EXPLICIT,
            truncated: false,
        })
    }
}
