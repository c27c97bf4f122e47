//! Position-flip reconciliation.
//!
//! The state machine governing the single tracked position: given an
//! incoming signal and the current position (local memory or a live
//! exchange query), decide whether to ignore, flip (close-then-open),
//! or open fresh. One signal is handled at a time; overlapping signals
//! are rejected rather than queued, since a queued stale signal after a
//! fast market move is worse than a dropped one.

pub mod config;
pub mod error;
pub mod reconciler;

pub use config::{PositionSource, ReconcilerConfig};
pub use error::{ReconcileError, ReconcileResult};
pub use reconciler::{Outcome, Reconciler};
