//! Inbound trade signals and protective bracket computation.

use crate::order::OrderSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Size used when the webhook omits or mangles the `size` field.
pub const DEFAULT_SIGNAL_SIZE: u32 = 1;

/// A validated directional signal, one per webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub symbol: String,
    pub side: OrderSide,
    pub size: u32,
    pub entry_price: Option<Decimal>,
}

impl Signal {
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        size: u32,
        entry_price: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            size,
            entry_price,
        }
    }
}

/// Percentage offsets for bracket stop-loss/take-profit levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BracketConfig {
    /// Stop-loss distance from entry, as a fraction (0.01 = 1%).
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: Decimal,
    /// Take-profit distance from entry, as a fraction (0.02 = 2%).
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: Decimal,
}

fn default_stop_loss_pct() -> Decimal {
    dec!(0.01)
}

fn default_take_profit_pct() -> Decimal {
    dec!(0.02)
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}

/// Computed protective levels, already rounded for the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPrices {
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

/// Derive stop-loss/take-profit from the entry price.
///
/// Buy: sl below, tp above; sell: mirrored. Both rounded to 2 decimal
/// places, matching the exchange's price precision for these products.
pub fn bracket_prices(side: OrderSide, entry_price: Decimal, config: &BracketConfig) -> BracketPrices {
    let (sl, tp) = match side {
        OrderSide::Buy => (
            entry_price * (Decimal::ONE - config.stop_loss_pct),
            entry_price * (Decimal::ONE + config.take_profit_pct),
        ),
        OrderSide::Sell => (
            entry_price * (Decimal::ONE + config.stop_loss_pct),
            entry_price * (Decimal::ONE - config.take_profit_pct),
        ),
    };
    BracketPrices {
        stop_loss: sl.round_dp(2),
        take_profit: tp.round_dp(2),
    }
}
