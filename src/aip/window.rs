//! Bounded session window over integrity checkpoints.
//!
//! The window is one of the two mutable cells in the crate (the other is
//! the drift state).  Each [`push`](WindowManager::push) handles session
//! boundaries, age-based eviction, and size-based eviction, then recomputes
//! the derived stats.  External readers only ever get copies via
//! [`get_state`](WindowManager::get_state) / [`get_summary`](WindowManager::get_summary).
//!
//! Two eviction modes exist: `sliding` drops the oldest checkpoint when
//! full, `fixed` clears the whole window and starts over.  A session id
//! change either resets the contents (`reset` boundary) or carries them
//! into the new session (`carry`).

use serde::{Deserialize, Serialize};

use crate::aip::analysis::prompt::build_window_section;
use crate::aip::constants::MIN_WINDOW_SIZE;
use crate::aip::error::AipError;
use crate::aip::schemas::{
    IntegrityCheckpoint, IntegrityVerdict, SessionBoundary, VerdictCounts, WindowConfig,
    WindowMode, WindowSummary,
};

/// Derived statistics over the window.
///
/// `total_checks` is monotone across the life of the session (evictions do
/// not decrease it); the per-verdict counts and the average cover only the
/// checkpoints currently in the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub total_checks: u64,
    pub clear_count: usize,
    pub review_count: usize,
    pub violation_count: usize,
    pub avg_analysis_ms: f64,
}

/// Snapshot of the window: ordered checkpoints plus derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    /// Checkpoints currently retained, oldest first.
    pub checkpoints: Vec<IntegrityCheckpoint>,
    pub size: usize,
    pub session_id: String,
    pub stats: WindowStats,
}

/// Fresh window state for the given session.
pub fn create_window_state(session_id: &str) -> WindowState {
    WindowState {
        checkpoints: Vec::new(),
        size: 0,
        session_id: session_id.to_string(),
        stats: WindowStats::default(),
    }
}

/// Manages the sliding/fixed checkpoint window for one client.
pub struct WindowManager {
    config: WindowConfig,
    state: WindowState,
}

impl WindowManager {
    /// Fails when `max_size` is below the minimum window size.
    pub fn new(config: WindowConfig, session_id: &str) -> Result<Self, AipError> {
        if config.max_size < MIN_WINDOW_SIZE {
            return Err(AipError::Construction {
                detail: format!(
                    "Window max_size must be >= {}, got {}",
                    MIN_WINDOW_SIZE, config.max_size
                ),
            });
        }
        Ok(WindowManager {
            config,
            state: create_window_state(session_id),
        })
    }

    /// Add a checkpoint, applying session-boundary, age, and size eviction.
    pub fn push(&mut self, checkpoint: IntegrityCheckpoint) {
        // 1. Session boundary.
        if checkpoint.session_id != self.state.session_id {
            if self.config.session_boundary == SessionBoundary::Reset {
                self.reset();
            }
            self.state.session_id = checkpoint.session_id.clone();
        }

        // 2. Age eviction.
        self.evict_stale();

        // 3. Size eviction.
        if self.state.checkpoints.len() >= self.config.max_size {
            match self.config.mode {
                WindowMode::Sliding => {
                    self.state.checkpoints.remove(0);
                }
                WindowMode::Fixed => {
                    self.state.checkpoints.clear();
                }
            }
        }

        // 4. Append and count.
        self.state.checkpoints.push(checkpoint);
        self.state.stats.total_checks += 1;

        // 5. Recompute derived stats.
        self.recompute_stats();
    }

    /// Render the window for the conscience prompt.  Delegates to the
    /// prompt builder's renderer so both call sites stay byte-identical.
    pub fn get_context(&self) -> String {
        build_window_section(&self.state.checkpoints)
    }

    /// Clear checkpoints and statistics.  The session id is kept.
    pub fn reset(&mut self) {
        self.state.checkpoints.clear();
        self.state.size = 0;
        self.state.stats = WindowStats::default();
    }

    /// Compact summary for signal construction.  `drift_alert_active` is
    /// always `false` here; the orchestrator sets it after running the
    /// drift detector.
    pub fn get_summary(&self) -> WindowSummary {
        let mut verdicts = VerdictCounts::default();
        for checkpoint in &self.state.checkpoints {
            match checkpoint.verdict {
                IntegrityVerdict::Clear => verdicts.clear += 1,
                IntegrityVerdict::ReviewNeeded => verdicts.review_needed += 1,
                IntegrityVerdict::BoundaryViolation => verdicts.boundary_violation += 1,
            }
        }

        let integrity_ratio = if self.state.size > 0 {
            verdicts.clear as f64 / self.state.size as f64
        } else {
            1.0
        };

        WindowSummary {
            size: self.state.size,
            max_size: self.config.max_size,
            verdicts,
            integrity_ratio,
            drift_alert_active: false,
        }
    }

    /// Deep snapshot of the window; later pushes are not visible through it.
    pub fn get_state(&self) -> WindowState {
        self.state.clone()
    }

    /// Checkpoints currently retained, oldest first.
    pub fn checkpoints(&self) -> &[IntegrityCheckpoint] {
        &self.state.checkpoints
    }

    /// Current session id.
    pub fn session_id(&self) -> &str {
        &self.state.session_id
    }

    /// Drop checkpoints older than `max_age_seconds`.
    fn evict_stale(&mut self) {
        let now = chrono::Utc::now();
        let max_age = self.config.max_age_seconds as i64;
        self.state.checkpoints.retain(|checkpoint| {
            match chrono::DateTime::parse_from_rfc3339(&checkpoint.timestamp) {
                Ok(ts) => (now - ts.with_timezone(&chrono::Utc)).num_seconds() <= max_age,
                Err(_) => false,
            }
        });
    }

    /// Recompute size, per-verdict counts, and the analysis-duration mean.
    fn recompute_stats(&mut self) {
        let checkpoints = &self.state.checkpoints;
        self.state.size = checkpoints.len();
        self.state.stats.clear_count = 0;
        self.state.stats.review_count = 0;
        self.state.stats.violation_count = 0;

        let mut total_ms = 0.0;
        for checkpoint in checkpoints {
            match checkpoint.verdict {
                IntegrityVerdict::Clear => self.state.stats.clear_count += 1,
                IntegrityVerdict::ReviewNeeded => self.state.stats.review_count += 1,
                IntegrityVerdict::BoundaryViolation => self.state.stats.violation_count += 1,
            }
            total_ms += checkpoint.analysis_metadata.analysis_duration_ms;
        }

        self.state.stats.avg_analysis_ms = if checkpoints.is_empty() {
            0.0
        } else {
            total_ms / checkpoints.len() as f64
        };
    }
}
