//! Run configuration for the inference passes

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::connection::ConnectionStrategy;
use crate::core::error::{Error, Result};
use crate::core::geometry::NAVIGABILITY_THRESHOLD_DEG;

/// Progress callback function type, called with `(ports_resolved, total_ports)`
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Interpretation of ports with exactly 3 connected ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingMode {
    /// Every connected pair is judged on its own geometry
    #[default]
    DoubleSlip,
    /// Only the straightest pair may be navigable
    Diamond,
}

impl fmt::Display for CrossingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossingMode::DoubleSlip => f.write_str("double slip crossings"),
            CrossingMode::Diamond => f.write_str("diamond crossings"),
        }
    }
}

/// What to do with a port whose topology is not supported (≥4 connections)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run, no navigability is written (default)
    #[default]
    FailFast,
    /// Record a diagnostic, skip the port, keep going
    BestEffort,
}

/// Options for an inference run
#[derive(Clone)]
pub struct InferenceConfig {
    pub crossing_mode: CrossingMode,
    pub failure_policy: FailurePolicy,
    pub connection_strategy: ConnectionStrategy,

    /// Maximum deviation from a straight path, in degrees
    pub threshold_deg: f64,

    /// Optional progress callback for the navigability pass
    pub progress: Option<ProgressCallback>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            crossing_mode: CrossingMode::default(),
            failure_policy: FailurePolicy::default(),
            connection_strategy: ConnectionStrategy::default(),
            threshold_deg: NAVIGABILITY_THRESHOLD_DEG,
            progress: None,
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("crossing_mode", &self.crossing_mode)
            .field("failure_policy", &self.failure_policy)
            .field("connection_strategy", &self.connection_strategy)
            .field("threshold_deg", &self.threshold_deg)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold_deg.is_finite() || self.threshold_deg <= 0.0 || self.threshold_deg > 180.0 {
            return Err(Error::InvalidInput(format!(
                "navigability threshold must be in (0, 180] degrees, got {}",
                self.threshold_deg
            )));
        }
        Ok(())
    }
}
