//! The flip state machine.

use crate::config::{PositionSource, ReconcilerConfig};
use crate::error::{ReconcileError, ReconcileResult};
use deltaflip_client::ExchangeApi;
use deltaflip_core::{bracket_prices, OrderPayload, OrderSide, PositionState, Signal};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// What one reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The signal matches the open position; no order was emitted.
    Ignored { side: OrderSide },
    /// Opened a fresh position from flat.
    Opened { order: OrderPayload },
    /// Closed the opposite position, then opened the new one.
    Flipped {
        closed: OrderPayload,
        opened: OrderPayload,
    },
}

impl Outcome {
    /// Status discriminator for the webhook response.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Ignored { .. } => "IGNORED",
            Self::Opened { .. } => "OPENED",
            Self::Flipped { .. } => "FLIPPED",
        }
    }

    /// The opening order, when one was emitted.
    pub fn opened_order(&self) -> Option<&OrderPayload> {
        match self {
            Self::Ignored { .. } => None,
            Self::Opened { order } => Some(order),
            Self::Flipped { opened, .. } => Some(opened),
        }
    }
}

/// Single-position reconciler.
///
/// The tracked position lives behind a mutex that doubles as the
/// in-flight guard: `try_lock` failing means a previous signal is still
/// being handled, and the new one is rejected. The guard is dropped on
/// every exit path, including errors.
pub struct Reconciler<C: ExchangeApi> {
    client: Arc<C>,
    config: ReconcilerConfig,
    state: Mutex<PositionState>,
}

impl<C: ExchangeApi> Reconciler<C> {
    pub fn new(client: Arc<C>, config: ReconcilerConfig) -> Self {
        Self {
            client,
            config,
            state: Mutex::new(PositionState::Flat),
        }
    }

    /// Snapshot of the locally tracked position.
    ///
    /// Waits for any in-flight reconciliation to finish first.
    pub async fn position(&self) -> PositionState {
        self.state.lock().await.clone()
    }

    /// Handle one signal: ignore, open, or flip.
    ///
    /// Returns `ReconcileError::Busy` without touching anything when a
    /// previous signal is still in flight.
    pub async fn handle(&self, signal: &Signal) -> ReconcileResult<Outcome> {
        let mut state = self.state.try_lock().map_err(|_| ReconcileError::Busy)?;

        let current = match self.config.position_source {
            PositionSource::Local => state.clone(),
            PositionSource::Live => self.client.open_position(&signal.symbol).await?,
        };

        if current.side() == Some(signal.side) {
            info!(
                symbol = %signal.symbol,
                side = %signal.side,
                "Ignoring signal: same direction already open"
            );
            return Ok(Outcome::Ignored { side: signal.side });
        }

        let mut closed = None;
        if let PositionState::Open { side, size, .. } = current {
            let close = OrderPayload::closing(signal.symbol.clone(), side.opposite(), size);
            info!(
                symbol = %signal.symbol,
                close_side = %close.side,
                size = close.size,
                "Flattening opposite position before opening"
            );
            self.client.place_order(&close).await?;
            // Optimistic: the close is fire-and-forget. State is cleared
            // as soon as the order is accepted, without waiting for the
            // fill.
            *state = PositionState::Flat;
            closed = Some(close);
        }

        let mut open = OrderPayload::market(signal.symbol.clone(), signal.side, signal.size);
        if self.config.use_brackets {
            match signal.entry_price {
                Some(entry) => {
                    let b = bracket_prices(signal.side, entry, &self.config.brackets);
                    open = open.with_brackets(b.stop_loss, b.take_profit);
                }
                None => {
                    warn!(
                        symbol = %signal.symbol,
                        "Signal has no entry price; placing order without brackets"
                    );
                }
            }
        }

        self.client.place_order(&open).await?;
        *state = PositionState::open(signal.side, signal.size, signal.entry_price);
        info!(
            symbol = %signal.symbol,
            side = %signal.side,
            size = signal.size,
            flipped = closed.is_some(),
            "Position opened"
        );

        Ok(match closed {
            Some(close) => Outcome::Flipped {
                closed: close,
                opened: open,
            },
            None => Outcome::Opened { order: open },
        })
    }
}
