//! The single tracked position and its exchange-side representation.

use crate::order::OrderSide;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Process-local position state.
///
/// Exactly one instance exists per running process, owned by the
/// reconciler. The enum makes the invariant structural: size and entry
/// price only exist while a position is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open {
        side: OrderSide,
        size: u32,
        entry_price: Option<Decimal>,
    },
}

impl PositionState {
    /// Open position, overwriting whatever was tracked before.
    pub fn open(side: OrderSide, size: u32, entry_price: Option<Decimal>) -> Self {
        Self::Open {
            side,
            size,
            entry_price,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Flat)
    }

    /// Side of the open position, if any.
    pub fn side(&self) -> Option<OrderSide> {
        match self {
            Self::Flat => None,
            Self::Open { side, .. } => Some(*side),
        }
    }

    /// Size of the open position, if any.
    pub fn size(&self) -> Option<u32> {
        match self {
            Self::Flat => None,
            Self::Open { size, .. } => Some(*size),
        }
    }
}

/// One entry of the exchange's `GET /v2/positions` response.
///
/// The exchange reports a signed contract count: positive = long,
/// negative = short, zero = no position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangePosition {
    pub size: i64,
    #[serde(default)]
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub product_symbol: Option<String>,
}

impl ExchangePosition {
    /// Side implied by the sign of `size`; `None` when flat.
    pub fn side(&self) -> Option<OrderSide> {
        match self.size {
            s if s > 0 => Some(OrderSide::Buy),
            s if s < 0 => Some(OrderSide::Sell),
            _ => None,
        }
    }

    /// Unsigned contract count.
    pub fn net_size(&self) -> u32 {
        self.size.unsigned_abs().min(u32::MAX as u64) as u32
    }

    /// Convert to the local tracking representation.
    pub fn to_state(&self) -> PositionState {
        match self.side() {
            Some(side) => PositionState::open(side, self.net_size(), self.entry_price),
            None => PositionState::Flat,
        }
    }
}

/// Derive the underlying asset symbol from a product symbol, for the
/// `underlying_asset_symbol` positions filter: `BTCUSD` -> `BTC`,
/// `ETHUSDT` -> `ETH`. Symbols without a known quote suffix pass through.
pub fn underlying_asset(product_symbol: &str) -> &str {
    for quote in ["USDT", "USD", "PERP"] {
        if let Some(base) = product_symbol.strip_suffix(quote) {
            if !base.is_empty() {
                return base;
            }
        }
    }
    product_symbol
}
