//! Adapter registry with URL-based provider detection.
//!
//! # Example
//!
//! ```rust
//! use aip::aip::adapters::registry::create_adapter_registry;
//!
//! let registry = create_adapter_registry();
//! assert_eq!(registry.get("openai").provider(), "openai");
//! // Unknown names fall back to the heuristic adapter.
//! assert_eq!(registry.get("mistral").provider(), "fallback");
//! assert_eq!(
//!     registry.detect_from_url("https://api.anthropic.com").provider(),
//!     "anthropic",
//! );
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::aip::adapters::anthropic::AnthropicAdapter;
use crate::aip::adapters::fallback::FallbackAdapter;
use crate::aip::adapters::google::GoogleAdapter;
use crate::aip::adapters::openai::OpenAIAdapter;
use crate::aip::adapters::ProviderAdapter;

/// Holds the built-in provider adapters plus any custom registrations,
/// keyed by provider name.
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    fallback: Arc<dyn ProviderAdapter>,
}

impl AdapterRegistry {
    /// Registry with the four built-in adapters registered.
    pub fn new() -> Self {
        let fallback: Arc<dyn ProviderAdapter> = Arc::new(FallbackAdapter);

        let mut adapters: HashMap<String, Arc<dyn ProviderAdapter>> = HashMap::new();
        adapters.insert("anthropic".to_string(), Arc::new(AnthropicAdapter));
        adapters.insert("openai".to_string(), Arc::new(OpenAIAdapter));
        adapters.insert("google".to_string(), Arc::new(GoogleAdapter));
        adapters.insert("fallback".to_string(), Arc::clone(&fallback));

        AdapterRegistry { adapters, fallback }
    }

    /// Get an adapter by provider name; unknown names get the fallback.
    pub fn get(&self, provider: &str) -> Arc<dyn ProviderAdapter> {
        self.adapters
            .get(provider)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    /// Detect the provider from an API base URL by case-insensitive
    /// substring: `anthropic`, `openai`, and `googleapis`/`generativelanguage`
    /// map to their adapters; anything else gets the fallback.
    pub fn detect_from_url(&self, url: &str) -> Arc<dyn ProviderAdapter> {
        let lower = url.to_lowercase();
        if lower.contains("anthropic") {
            return self.get("anthropic");
        }
        if lower.contains("openai") {
            return self.get("openai");
        }
        if lower.contains("googleapis") || lower.contains("generativelanguage") {
            return self.get("google");
        }
        Arc::clone(&self.fallback)
    }

    /// Register a custom adapter under its own provider name.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters
            .insert(adapter.provider().to_string(), adapter);
    }

    /// All registered provider names.
    pub fn providers(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new adapter registry with the default adapters registered.
pub fn create_adapter_registry() -> AdapterRegistry {
    AdapterRegistry::new()
}
