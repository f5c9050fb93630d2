//! High-level AIP client orchestrating the full integrity-check lifecycle.
//!
//! [`create_client`] validates card-conscience agreement up front, then the
//! client's [`check`](AipClient::check) method runs the whole pipeline for
//! each provider response: extract the thinking block, build the conscience
//! prompt over the current window, call the analysis LLM (the only
//! suspension point in the crate), validate the verdict into a checkpoint,
//! update the window and drift state, and deliver the resulting signal.
//!
//! A client is single-session and single-flight: callers serialize `check`
//! invocations (the `&mut self` receiver enforces this at compile time),
//! and in return callbacks fire strictly in `on_verdict → on_drift_alert`
//! order and never interleave across checks.  Independent clients share no
//! state and are parallel-safe.
//!
//! When the analysis LLM is unreachable the failure policy decides the
//! outcome: `fail_open` degrades to a synthetic clear signal, `fail_closed`
//! denies with a synthetic boundary violation.  Synthetic signals never
//! enter the window or the drift state.
//!
//! # Example
//!
//! ```rust,no_run
//! use aip::aip::client::create_client;
//! use aip::aip::schemas::{
//!     AipConfig, AlignmentCard, AnalysisLlmConfig, AutonomyEnvelope,
//!     default_conscience_values, WindowConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let card = AlignmentCard {
//!         card_id: "card-support-agent".to_string(),
//!         agent_description: Some("Customer support agent".to_string()),
//!         values: vec![],
//!         autonomy_envelope: AutonomyEnvelope::default(),
//!     };
//!     let config = AipConfig::new(
//!         card,
//!         AnalysisLlmConfig::new(
//!             "claude-sonnet-4-0",
//!             "https://api.anthropic.com",
//!             &std::env::var("ANTHROPIC_KEY")?,
//!         ),
//!         WindowConfig::default(),
//!     )
//!     .with_conscience_values(default_conscience_values());
//!
//!     let mut client = create_client(config)?;
//!     let signal = client.check(r#"{"content":[]}"#, None, None).await?;
//!     if !signal.proceed {
//!         println!("blocked: {:?}", signal.recommended_action);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use serde_json::Value;

use crate::aip::adapters::registry::{create_adapter_registry, AdapterRegistry};
use crate::aip::analysis::agreement::validate_agreement;
use crate::aip::analysis::drift::{create_drift_state, detect_integrity_drift, DriftState};
use crate::aip::analysis::engine::{
    build_signal, check_integrity, hash_thinking_block, CheckIntegrityInput, ThinkingInput,
};
use crate::aip::analysis::prompt::{build_conscience_prompt, PromptInput};
use crate::aip::error::AipError;
use crate::aip::schemas::{
    AipConfig, AnalysisLlmConfig, AnalysisMetadata, ConscienceContext, FailureMode, FailurePolicy,
    IntegrityCheckpoint, IntegritySignal, IntegrityVerdict, RecommendedAction, WindowPosition,
};
use crate::aip::window::{WindowManager, WindowState};

lazy_static! {
    /// Shared HTTP client with persistent connection pooling.
    ///
    /// One client instance keeps TLS sessions and DNS lookups warm across
    /// checks and across client instances.  Per-request timeouts come from
    /// the failure policy.
    static ref SHARED_HTTP_CLIENT: reqwest::Client = {
        reqwest::ClientBuilder::new()
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build shared HTTP client")
    };
}

/// Session id derived from the card id and the current hour bucket:
/// `sess-<first-8-of-card-id>-<floor(unix_seconds / 3600)>`.
fn generate_session_id(card_id: &str) -> String {
    let hash_part: String = card_id.chars().take(8).collect();
    let hour_bucket = chrono::Utc::now().timestamp() / 3600;
    format!("sess-{}-{}", hash_part, hour_bucket)
}

/// POST the conscience prompt to the analysis LLM and return the text of
/// the first text content block.
///
/// This is the only network call in the crate.  Uses the Anthropic
/// Messages API format.
async fn call_analysis_llm(
    llm_config: &AnalysisLlmConfig,
    system: &str,
    user: &str,
    timeout_ms: u64,
) -> Result<String, AipError> {
    let url = format!("{}/v1/messages", llm_config.base_url.trim_end_matches('/'));

    let body = serde_json::json!({
        "model": llm_config.model,
        "max_tokens": llm_config.max_tokens,
        "system": system,
        "messages": [{"role": "user", "content": user}],
    });

    let response = SHARED_HTTP_CLIENT
        .post(&url)
        .header("Content-Type", "application/json")
        .header("x-api-key", &llm_config.api_key)
        .header("anthropic-version", "2023-06-01")
        .timeout(Duration::from_millis(timeout_ms))
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AipError::Timeout { timeout_ms }
            } else {
                AipError::Transport {
                    detail: e.to_string(),
                }
            }
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        if e.is_timeout() {
            AipError::Timeout { timeout_ms }
        } else {
            AipError::Transport {
                detail: e.to_string(),
            }
        }
    })?;

    if !status.is_success() {
        return Err(AipError::Transport {
            detail: format!("Analysis LLM returned {}: {}", status.as_u16(), text),
        });
    }

    let parsed: Value = serde_json::from_str(&text).map_err(|_| AipError::Transport {
        detail: "Analysis LLM returned a non-JSON body".to_string(),
    })?;

    let content = parsed
        .get("content")
        .and_then(Value::as_array)
        .filter(|blocks| !blocks.is_empty())
        .ok_or_else(|| AipError::Transport {
            detail: "Analysis LLM returned empty content".to_string(),
        })?;

    let text_block = content
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| AipError::Transport {
            detail: "Analysis LLM returned no text content".to_string(),
        })?;

    Ok(text_block.to_string())
}

/// Public AIP client for running integrity checks on provider responses.
///
/// Construct with [`create_client`] rather than directly.
pub struct AipClient {
    config: AipConfig,
    window: WindowManager,
    registry: AdapterRegistry,
    drift_state: DriftState,
    failure_mode: FailureMode,
    analysis_timeout_ms: u64,
    destroyed: bool,
}

impl AipClient {
    /// Effective agent id: the configured one, or the card id.
    fn agent_id(&self) -> &str {
        self.config
            .agent_id
            .as_deref()
            .unwrap_or(&self.config.card.card_id)
    }

    /// Build a signal without consulting the analysis LLM.  Synthetic
    /// checkpoints carry no thinking hash and are never pushed to the
    /// window or the drift state.
    fn synthetic_signal(&self, verdict: IntegrityVerdict, reasoning: &str) -> IntegritySignal {
        let summary = self.window.get_summary();

        let checkpoint = IntegrityCheckpoint {
            checkpoint_id: format!("ic-synthetic-{}", chrono::Utc::now().timestamp_millis()),
            agent_id: self.agent_id().to_string(),
            card_id: self.config.card.card_id.clone(),
            session_id: self.window.session_id().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            thinking_block_hash: "none".to_string(),
            provider: "none".to_string(),
            model: "none".to_string(),
            verdict,
            concerns: Vec::new(),
            reasoning_summary: reasoning.to_string(),
            conscience_context: ConscienceContext::empty(),
            window_position: WindowPosition {
                index: summary.size,
                window_size: summary.size,
            },
            analysis_metadata: AnalysisMetadata {
                analysis_model: "none".to_string(),
                analysis_duration_ms: 0.0,
                thinking_tokens_original: 0,
                thinking_tokens_analyzed: 0,
                truncated: false,
                extraction_confidence: 0.0,
            },
            linked_trace_id: None,
        };

        let (proceed, recommended_action) = if verdict == IntegrityVerdict::Clear {
            (true, RecommendedAction::Continue)
        } else {
            (false, RecommendedAction::DenyAndEscalate)
        };

        IntegritySignal {
            checkpoint,
            proceed,
            recommended_action,
            window_summary: summary,
        }
    }

    /// Resolve an analysis failure through the `on_error` callback and the
    /// configured failure policy.
    async fn resolve_analysis_failure(&self, error: AipError) -> IntegritySignal {
        if log::log_enabled!(log::Level::Error) {
            log::error!("aip::client::check(): analysis failed: {}", error);
        }

        if let Some(handler) = &self.config.handler {
            handler.on_error(&error).await;
        }

        match self.failure_mode {
            FailureMode::FailClosed => self.synthetic_signal(
                IntegrityVerdict::BoundaryViolation,
                "Analysis failed and failure policy is fail-closed",
            ),
            FailureMode::FailOpen => self.synthetic_signal(
                IntegrityVerdict::Clear,
                "Analysis unavailable (fail-open)",
            ),
        }
    }

    /// Run one integrity check over a provider response body.
    ///
    /// `provider` overrides adapter selection; when absent the adapter is
    /// detected from the analysis LLM base URL.  `task_context` is accepted
    /// for API parity and currently unused.
    ///
    /// Responses without an extractable thinking block, and thinking blocks
    /// below the configured minimum-evidence threshold, short-circuit to a
    /// synthetic clear signal without touching the window.
    pub async fn check(
        &mut self,
        response_body: &str,
        provider: Option<&str>,
        task_context: Option<&str>,
    ) -> Result<IntegritySignal, AipError> {
        let _ = task_context;

        if self.destroyed {
            return Err(AipError::Lifecycle {
                detail: "AIP client has been destroyed".to_string(),
            });
        }

        // 1. Extract the thinking block.
        let adapter = match provider {
            Some(name) => self.registry.get(name),
            None => self
                .registry
                .detect_from_url(&self.config.analysis_llm.base_url),
        };
        let thinking = match adapter.extract_thinking(response_body) {
            Some(extracted) => extracted,
            None => {
                // Normal for providers/responses without thinking.
                log::debug!("aip::client::check(): no thinking block extracted");
                return Ok(self.synthetic_signal(
                    IntegrityVerdict::Clear,
                    "No thinking block found in provider response",
                ));
            }
        };

        // 2. Build the conscience prompt over the current window.
        let prompt = build_conscience_prompt(&PromptInput::new(
            &self.config.card,
            &self.config.conscience_values,
            self.window.checkpoints(),
            &thinking.content,
        ));

        // 3. Minimum-evidence short-circuit.
        if let Some(min_tokens) = self.config.min_evidence_tokens {
            if prompt.analyzed_tokens < min_tokens {
                return Ok(self.synthetic_signal(
                    IntegrityVerdict::Clear,
                    "Thinking block below minimum evidence threshold",
                ));
            }
        }

        // 4. Call the analysis LLM (the only suspension point).
        let started = Instant::now();
        let analysis_response = match call_analysis_llm(
            &self.config.analysis_llm,
            &prompt.system,
            &prompt.user,
            self.analysis_timeout_ms,
        )
        .await
        {
            Ok(text) => text,
            Err(error) => return Ok(self.resolve_analysis_failure(error).await),
        };
        let analysis_duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        // 5. Validate the verdict into a checkpoint.  Malformed analysis
        // output goes through the same failure policy as transport errors.
        let window_size = self.window.checkpoints().len();
        let input = CheckIntegrityInput {
            analysis_response,
            thinking: ThinkingInput {
                hash: hash_thinking_block(&thinking.content),
                provider: thinking.provider.clone(),
                model: thinking.model.clone(),
                tokens_original: prompt.original_tokens,
                tokens_analyzed: prompt.analyzed_tokens,
                truncated: prompt.truncated,
                confidence: thinking.confidence,
            },
            agent_id: self.agent_id().to_string(),
            card_id: self.config.card.card_id.clone(),
            session_id: self.window.session_id().to_string(),
            window_position: WindowPosition {
                index: window_size,
                window_size: window_size + 1,
            },
            analysis_model: self.config.analysis_llm.model.clone(),
            analysis_duration_ms,
            linked_trace_id: None,
        };
        let checkpoint = match check_integrity(&input) {
            Ok(checkpoint) => checkpoint,
            Err(error) => return Ok(self.resolve_analysis_failure(error).await),
        };

        // 6. Update the window.
        self.window.push(checkpoint.clone());

        // 7. Detect drift over the post-push window.
        let (new_drift_state, drift_alert) = detect_integrity_drift(
            &self.drift_state,
            &checkpoint,
            self.window.checkpoints(),
            None,
        );
        self.drift_state = new_drift_state;

        // 8. Build the signal.
        let mut summary = self.window.get_summary();
        if drift_alert.is_some() {
            summary.drift_alert_active = true;
        }
        let signal = build_signal(checkpoint, summary);

        // 9. Callbacks: verdict first, then the drift alert if one fired.
        if let Some(handler) = &self.config.handler {
            handler.on_verdict(&signal).await;
            if let Some(alert) = &drift_alert {
                if log::log_enabled!(log::Level::Warn) {
                    log::warn!("aip::client::check(): drift alert: {}", alert.message);
                }
                handler.on_drift_alert(alert).await;
            }
        }

        Ok(signal)
    }

    /// Deep snapshot of the current window state.
    pub fn get_window_state(&self) -> WindowState {
        self.window.get_state()
    }

    /// Clear the session window and drift state.  The session id is kept.
    pub fn reset_window(&mut self) {
        self.window.reset();
        self.drift_state = create_drift_state();
    }

    /// Current session id.
    pub fn session_id(&self) -> &str {
        self.window.session_id()
    }

    /// Mark the client as destroyed; subsequent `check` calls fail with a
    /// lifecycle error.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Create an [`AipClient`], validating card-conscience agreement.
///
/// Fails with a construction error when the agreement has conflicts or the
/// window configuration is invalid.
pub fn create_client(config: AipConfig) -> Result<AipClient, AipError> {
    // 1. Card-conscience agreement gate.
    let agreement = validate_agreement(&config.card, &config.conscience_values);
    if !agreement.valid {
        let conflict_descs: Vec<&str> = agreement
            .conflicts
            .iter()
            .map(|c| c.description.as_str())
            .collect();
        return Err(AipError::Construction {
            detail: format!(
                "Card-conscience agreement validation failed: {}",
                conflict_descs.join("; ")
            ),
        });
    }

    // 2. Components.
    let session_id = generate_session_id(&config.card.card_id);
    let window = WindowManager::new(config.window, &session_id)?;
    let registry = create_adapter_registry();
    let drift_state = create_drift_state();

    // 3. Failure policy.
    let policy = config.failure_policy.unwrap_or_else(FailurePolicy::default);

    Ok(AipClient {
        config,
        window,
        registry,
        drift_state,
        failure_mode: policy.mode,
        analysis_timeout_ms: policy.analysis_timeout_ms,
        destroyed: false,
    })
}
