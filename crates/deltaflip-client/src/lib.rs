//! Signed REST client for the Delta Exchange API.
//!
//! Builds authenticated requests using a per-request HMAC-SHA256
//! signature over `method + timestamp + path + query + body` and exposes
//! the symbol-agnostic primitives the reconciler composes into trading
//! actions. No retries anywhere: a blind retry of an order placement
//! risks a duplicate fill, so failures propagate to the caller.

pub mod api;
pub mod client;
pub mod error;
pub mod sign;

pub use api::ExchangeApi;
pub use client::{ClientConfig, DeltaClient, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use sign::SignedRequest;
