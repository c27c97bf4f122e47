//! Order-related types and the wire payload for `POST /v2/orders`.
//!
//! The payload is serialized exactly once before signing; the resulting
//! string is both the signed bytes and the transmitted body.

use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = CoreError;

    /// Case-insensitive parse, matching the webhook contract.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(CoreError::InvalidSide(other.to_string())),
        }
    }
}

/// Order type accepted by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    MarketOrder,
    LimitOrder,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarketOrder => write!(f, "market_order"),
            Self::LimitOrder => write!(f, "limit_order"),
        }
    }
}

/// Trigger method for bracket stop orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMethod {
    MarkPrice,
    LastTradedPrice,
    SpotPrice,
}

/// Wire payload for `POST /v2/orders`.
///
/// Bracket prices serialize as strings with whatever scale they carry
/// (`round_dp(2)` upstream yields `"99.00"`), which is what the exchange
/// expects for price fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub product_symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_stop_loss_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_take_profit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_stop_trigger_method: Option<TriggerMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
}

impl OrderPayload {
    /// A plain market order with no brackets.
    pub fn market(product_symbol: impl Into<String>, side: OrderSide, size: u32) -> Self {
        Self {
            product_symbol: product_symbol.into(),
            side,
            order_type: OrderType::MarketOrder,
            size,
            bracket_stop_loss_price: None,
            bracket_take_profit_price: None,
            bracket_stop_trigger_method: None,
            reduce_only: None,
        }
    }

    /// A reduce-only market order used to flatten the current position.
    pub fn closing(product_symbol: impl Into<String>, side: OrderSide, size: u32) -> Self {
        let mut order = Self::market(product_symbol, side, size);
        order.reduce_only = Some(true);
        order
    }

    /// Attach bracket stop-loss/take-profit prices, triggered on mark price.
    pub fn with_brackets(mut self, stop_loss: Decimal, take_profit: Decimal) -> Self {
        self.bracket_stop_loss_price = Some(stop_loss);
        self.bracket_take_profit_price = Some(take_profit);
        self.bracket_stop_trigger_method = Some(TriggerMethod::MarkPrice);
        self
    }
}

/// Wire payload for `DELETE /v2/orders` (cancel one order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderPayload {
    pub id: u64,
    pub product_id: u64,
}

/// Wire payload for `DELETE /v2/orders/all` (cancel all for a product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelAllOrdersPayload {
    pub product_id: u64,
}
