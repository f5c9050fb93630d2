//! Callback layer for integrity checks.
//!
//! Implement [`EventHandler`] to receive real-time notifications from
//! [`AipClient::check`](crate::aip::client::AipClient::check):
//!
//! - [`on_verdict`](EventHandler::on_verdict) — fires after every analysed
//!   check with the final [`IntegritySignal`] (synthetic short-circuits
//!   return their signal directly without callback traffic)
//! - [`on_drift_alert`](EventHandler::on_drift_alert) — fires when the drift
//!   detector crosses its sustained-checks threshold (after `on_verdict`)
//! - [`on_error`](EventHandler::on_error) — fires when the analysis leg
//!   fails, before the failure policy resolves the check
//!
//! All methods have default no-op implementations, so you only override what
//! you care about.  The handler is stored as `Arc<dyn EventHandler>` on
//! [`AipConfig`](crate::aip::schemas::AipConfig).  Implementations that have
//! nothing to await are fine; an `async fn` body with no `.await` is the
//! synchronous case.
//!
//! Callbacks are awaited in order within one check and never interleave
//! across checks (the caller serializes `check` invocations).  Panics inside
//! a callback propagate to the caller of `check`.
//!
//! # Example
//!
//! ```rust
//! use aip::aip::event::EventHandler;
//! use aip::aip::schemas::{IntegrityDriftAlert, IntegritySignal};
//! use async_trait::async_trait;
//!
//! struct Gate;
//!
//! #[async_trait]
//! impl EventHandler for Gate {
//!     async fn on_verdict(&self, signal: &IntegritySignal) {
//!         if !signal.proceed {
//!             println!("blocked: {:?}", signal.recommended_action);
//!         }
//!     }
//!     async fn on_drift_alert(&self, alert: &IntegrityDriftAlert) {
//!         println!("drift: {}", alert.message);
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::aip::error::AipError;
use crate::aip::schemas::{IntegrityDriftAlert, IntegritySignal};

/// Trait for receiving integrity check outcomes.
///
/// The `Send + Sync` bound allows the handler to be shared with the client
/// via `Arc<dyn EventHandler>`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called with the final signal of every analysed check.
    async fn on_verdict(&self, _signal: &IntegritySignal) {}

    /// Called when a sustained non-clear streak produces a drift alert.
    async fn on_drift_alert(&self, _alert: &IntegrityDriftAlert) {}

    /// Called when the analysis LLM leg fails; the failure policy decides
    /// what signal the check ultimately returns.
    async fn on_error(&self, _error: &AipError) {}
}
