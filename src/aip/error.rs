//! Error taxonomy for the integrity pipeline.
//!
//! Construction and lifecycle errors surface to the caller unchanged.
//! Parse, field-validation, and transport errors are caught inside
//! [`AipClient::check`](crate::aip::client::AipClient::check), forwarded to
//! the [`EventHandler::on_error`](crate::aip::event::EventHandler::on_error)
//! callback, and then resolved by the configured failure policy.
//!
//! An adapter returning no thinking block is *not* an error: extraction
//! misses are modeled as `None` and short-circuit to a synthetic clear
//! signal.

use std::error::Error;
use std::fmt;

/// All failure modes the core can produce.
#[derive(Debug, Clone)]
pub enum AipError {
    /// The analysis LLM response was not valid JSON.
    Parse {
        /// Leading fragment of the offending response.
        detail: String,
    },
    /// A required field in the analysis response is missing or has the
    /// wrong type or enumeration value.
    InvalidField {
        /// Name of the offending field.
        field: String,
        /// What was wrong with it.
        detail: String,
    },
    /// The analysis LLM call failed (connection, non-2xx status, or a
    /// response with no usable text content).
    Transport {
        detail: String,
    },
    /// The analysis LLM call exceeded the configured timeout.
    Timeout {
        timeout_ms: u64,
    },
    /// Client construction failed: agreement conflicts or an invalid
    /// window configuration.
    Construction {
        detail: String,
    },
    /// An operation was attempted on a destroyed client.
    Lifecycle {
        detail: String,
    },
}

impl fmt::Display for AipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AipError::Parse { detail } => {
                write!(f, "Failed to parse analysis response as JSON: {}", detail)
            }
            AipError::InvalidField { field, detail } => {
                write!(f, "Invalid {}: {}", field, detail)
            }
            AipError::Transport { detail } => {
                write!(f, "Analysis LLM call failed: {}", detail)
            }
            AipError::Timeout { timeout_ms } => {
                write!(f, "Analysis LLM call timed out after {}ms", timeout_ms)
            }
            AipError::Construction { detail } => {
                write!(f, "Client construction failed: {}", detail)
            }
            AipError::Lifecycle { detail } => {
                write!(f, "{}", detail)
            }
        }
    }
}

impl Error for AipError {}

impl AipError {
    /// `true` for the failure classes that the orchestrator resolves via
    /// the failure policy rather than surfacing to the caller.
    pub fn is_analysis_failure(&self) -> bool {
        matches!(
            self,
            AipError::Parse { .. }
                | AipError::InvalidField { .. }
                | AipError::Transport { .. }
                | AipError::Timeout { .. }
        )
    }
}
