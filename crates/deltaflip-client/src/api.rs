//! The trait seam between the reconciler and the exchange.

use crate::error::ClientResult;
use async_trait::async_trait;
use deltaflip_core::{OrderPayload, PositionState};

/// The two primitives the reconciler needs from the exchange.
///
/// `DeltaClient` is the production implementation; tests substitute a
/// recording fake.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Submit an order; returns the exchange's parsed response body.
    async fn place_order(&self, order: &OrderPayload) -> ClientResult<serde_json::Value>;

    /// Fetch the current open position for a product symbol.
    ///
    /// The first entry of the positions response is authoritative; an
    /// empty list means flat.
    async fn open_position(&self, product_symbol: &str) -> ClientResult<PositionState>;
}
