//! Webhook server wiring for the deltaflip bot.

pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use config::{AppConfig, Credentials};
pub use error::{AppError, AppResult};
