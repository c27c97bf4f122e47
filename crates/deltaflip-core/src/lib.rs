//! Core domain types for the deltaflip trading bot.
//!
//! This crate provides the types shared by the signed client and the
//! flip reconciler:
//! - `OrderSide`, `OrderType`, `TriggerMethod`: trading enums
//! - `OrderPayload`: wire shape for `POST /v2/orders`
//! - `PositionState`, `ExchangePosition`: the single tracked position
//! - `Signal`, bracket price computation

pub mod error;
pub mod order;
pub mod position;
pub mod signal;

pub use error::{CoreError, Result};
pub use order::{
    CancelAllOrdersPayload, CancelOrderPayload, OrderPayload, OrderSide, OrderType, TriggerMethod,
};
pub use position::{underlying_asset, ExchangePosition, PositionState};
pub use signal::{bracket_prices, BracketConfig, BracketPrices, Signal, DEFAULT_SIGNAL_SIZE};
