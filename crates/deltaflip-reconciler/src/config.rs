//! Reconciler configuration.

use deltaflip_core::BracketConfig;
use serde::{Deserialize, Serialize};

/// Where the reconciler reads the current position from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    /// Query `GET /v2/positions` before every decision. Survives process
    /// restarts and catches manual intervention; the default.
    #[default]
    Live,
    /// Trust in-process state. Lower latency, acceptable only when
    /// staleness is.
    Local,
}

/// Reconciler configuration.
///
/// One parameterized reconciler covers what used to be divergent
/// deployment variants: bracket orders on or off, position sourced
/// locally or live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    #[serde(default)]
    pub position_source: PositionSource,
    /// Whether opening orders carry bracket stop-loss/take-profit.
    /// Brackets also require the signal to supply an entry price.
    #[serde(default = "default_use_brackets")]
    pub use_brackets: bool,
    #[serde(default)]
    pub brackets: BracketConfig,
}

fn default_use_brackets() -> bool {
    true
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            position_source: PositionSource::default(),
            use_brackets: default_use_brackets(),
            brackets: BracketConfig::default(),
        }
    }
}
