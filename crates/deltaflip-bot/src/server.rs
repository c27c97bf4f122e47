//! Webhook HTTP server implementation using axum.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use deltaflip_client::{ClientError, ExchangeApi};
use deltaflip_core::{OrderSide, Signal, DEFAULT_SIGNAL_SIZE};
use deltaflip_reconciler::{Outcome, ReconcileError, Reconciler};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Shared application state for axum handlers.
pub struct AppState<C: ExchangeApi> {
    pub reconciler: Arc<Reconciler<C>>,
}

impl<C: ExchangeApi> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            reconciler: self.reconciler.clone(),
        }
    }
}

/// Create the axum router.
pub fn create_router<C: ExchangeApi + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/webhook", post(webhook::<C>))
        .with_state(state)
}

/// Health check.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "deltaflip",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Webhook endpoint: one signal in, zero-to-two orders out.
async fn webhook<C: ExchangeApi>(
    State(state): State<AppState<C>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let signal = match parse_signal(&body) {
        Ok(signal) => signal,
        Err(message) => {
            warn!(%message, "Rejecting webhook");
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message })));
        }
    };

    info!(
        symbol = %signal.symbol,
        side = %signal.side,
        size = signal.size,
        "Signal received"
    );

    match state.reconciler.handle(&signal).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome_response(&signal, &outcome))),
        Err(ReconcileError::Busy) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "a reconciliation is already in progress" })),
        ),
        Err(ReconcileError::Client(e)) => {
            error!(error = %e, "Reconciliation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": client_error_body(&e) })),
            )
        }
    }
}

/// Validate the webhook body into a signal.
///
/// `symbol` and `side` are required; `size` is coerced leniently with a
/// default of 1; a malformed `entryPrice` is treated as absent rather
/// than poisoning the bracket computation.
fn parse_signal(body: &Value) -> Result<Signal, String> {
    let symbol = body
        .get("symbol")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    let side = body.get("side").and_then(Value::as_str);

    let (symbol, side) = match (symbol, side) {
        (Some(symbol), Some(side)) => (symbol, side),
        _ => return Err("symbol and side are required".to_string()),
    };

    let side: OrderSide = side
        .parse()
        .map_err(|_| format!("invalid side {side:?} (expected \"buy\" or \"sell\")"))?;

    let size = coerce_size(body.get("size"));
    let entry_price = body.get("entryPrice").and_then(parse_decimal);

    Ok(Signal::new(symbol, side, size, entry_price))
}

/// Coerce the `size` field: positive JSON number or numeric string;
/// anything else falls back to the default of 1.
fn coerce_size(value: Option<&Value>) -> u32 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n >= 1.0 => n as u32,
        _ => DEFAULT_SIGNAL_SIZE,
    }
}

/// Accept a price either as a JSON number or a numeric string.
fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Build the success response body for one outcome.
fn outcome_response(signal: &Signal, outcome: &Outcome) -> Value {
    let mut response = json!({
        "status": outcome.status(),
        "symbol": signal.symbol,
    });

    match outcome {
        Outcome::Ignored { side } => {
            response["reason"] = json!(format!("{side} position already open"));
        }
        Outcome::Opened { order } => {
            response["order"] = json!(order);
        }
        Outcome::Flipped { closed, opened } => {
            response["closeOrder"] = json!(closed);
            response["order"] = json!(opened);
        }
    }

    if let Some(order) = outcome.opened_order() {
        if let Some(entry) = signal.entry_price {
            response["entryPrice"] = json!(entry);
        }
        if let Some(sl) = order.bracket_stop_loss_price {
            response["stopLoss"] = json!(sl.to_string());
        }
        if let Some(tp) = order.bracket_take_profit_price {
            response["takeProfit"] = json!(tp.to_string());
        }
    }

    response
}

/// Error body for a failed exchange call: the exchange's own payload
/// verbatim when available, otherwise the transport error message.
fn client_error_body(error: &ClientError) -> Value {
    match error {
        ClientError::Exchange { body, .. } => body.clone(),
        other => Value::String(other.to_string()),
    }
}

/// Bind and serve until ctrl-c.
pub async fn run_server<C: ExchangeApi + 'static>(
    state: AppState<C>,
    port: u16,
) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "Starting webhook server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use deltaflip_client::ClientResult;
    use deltaflip_core::{OrderPayload, PositionState};
    use deltaflip_reconciler::{PositionSource, ReconcilerConfig};
    use rust_decimal_macros::dec;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct FakeExchange {
        orders: StdMutex<Vec<OrderPayload>>,
        gate: StdMutex<Option<oneshot::Receiver<()>>>,
        fail: bool,
    }

    #[async_trait]
    impl ExchangeApi for FakeExchange {
        async fn place_order(&self, order: &OrderPayload) -> ClientResult<Value> {
            self.orders.lock().unwrap().push(order.clone());
            if self.fail {
                return Err(ClientError::Exchange {
                    status: 400,
                    body: json!({"error": {"code": "insufficient_margin"}}),
                });
            }
            let gate = self.gate.lock().unwrap().take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            Ok(json!({"success": true}))
        }

        async fn open_position(&self, _product_symbol: &str) -> ClientResult<PositionState> {
            Ok(PositionState::Flat)
        }
    }

    fn state_with(client: Arc<FakeExchange>) -> AppState<FakeExchange> {
        let config = ReconcilerConfig {
            position_source: PositionSource::Local,
            ..ReconcilerConfig::default()
        };
        AppState {
            reconciler: Arc::new(Reconciler::new(client, config)),
        }
    }

    #[test]
    fn test_parse_signal_requires_symbol_and_side() {
        assert!(parse_signal(&json!({})).is_err());
        assert!(parse_signal(&json!({"symbol": "BTCUSD"})).is_err());
        assert!(parse_signal(&json!({"side": "buy"})).is_err());
        assert!(parse_signal(&json!({"symbol": "", "side": "buy"})).is_err());
    }

    #[test]
    fn test_parse_signal_rejects_unknown_side() {
        let result = parse_signal(&json!({"symbol": "BTCUSD", "side": "hold"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_signal_full() {
        let signal = parse_signal(&json!({
            "symbol": "BTCUSD",
            "side": "SELL",
            "size": 3,
            "entryPrice": 65000.5,
        }))
        .unwrap();
        assert_eq!(signal.side, OrderSide::Sell);
        assert_eq!(signal.size, 3);
        assert_eq!(signal.entry_price, Some(dec!(65000.5)));
    }

    #[test]
    fn test_parse_signal_accepts_string_numerics() {
        let signal = parse_signal(&json!({
            "symbol": "BTCUSD",
            "side": "buy",
            "size": "2",
            "entryPrice": "100.25",
        }))
        .unwrap();
        assert_eq!(signal.size, 2);
        assert_eq!(signal.entry_price, Some(dec!(100.25)));
    }

    #[test]
    fn test_size_defaults_to_one() {
        assert_eq!(coerce_size(None), 1);
        assert_eq!(coerce_size(Some(&json!("abc"))), 1);
        assert_eq!(coerce_size(Some(&json!(0))), 1);
        assert_eq!(coerce_size(Some(&json!(-5))), 1);
        assert_eq!(coerce_size(Some(&json!(null))), 1);
        assert_eq!(coerce_size(Some(&json!(4))), 4);
    }

    #[test]
    fn test_malformed_entry_price_is_dropped() {
        let signal = parse_signal(&json!({
            "symbol": "BTCUSD",
            "side": "buy",
            "entryPrice": "not a price",
        }))
        .unwrap();
        assert_eq!(signal.entry_price, None);
    }

    #[tokio::test]
    async fn test_webhook_missing_side_is_400_and_no_order() {
        let client = Arc::new(FakeExchange::default());
        let state = state_with(client.clone());

        let (status, Json(body)) =
            webhook(State(state), Json(json!({"symbol": "BTCUSD"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(client.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_opens_position() {
        let client = Arc::new(FakeExchange::default());
        let state = state_with(client.clone());

        let (status, Json(body)) = webhook(
            State(state),
            Json(json!({
                "symbol": "BTCUSD",
                "side": "buy",
                "size": 2,
                "entryPrice": 100,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OPENED");
        assert_eq!(body["stopLoss"], "99.00");
        assert_eq!(body["takeProfit"], "102.00");
        assert_eq!(body["order"]["side"], "buy");
        assert_eq!(client.orders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_flip_reports_both_orders() {
        let client = Arc::new(FakeExchange::default());
        let state = state_with(client.clone());

        let open = json!({"symbol": "BTCUSD", "side": "buy", "size": 2, "entryPrice": 100});
        let flip = json!({"symbol": "BTCUSD", "side": "sell", "size": 1, "entryPrice": 100});

        webhook(State(state.clone()), Json(open)).await;
        let (status, Json(body)) = webhook(State(state), Json(flip)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "FLIPPED");
        assert_eq!(body["closeOrder"]["reduce_only"], true);
        assert_eq!(body["closeOrder"]["size"], 2);
        assert_eq!(body["order"]["side"], "sell");
        assert_eq!(body["stopLoss"], "101.00");
    }

    #[tokio::test]
    async fn test_webhook_ignores_same_direction() {
        let client = Arc::new(FakeExchange::default());
        let state = state_with(client.clone());

        let signal = json!({"symbol": "BTCUSD", "side": "buy", "entryPrice": 100});
        webhook(State(state.clone()), Json(signal.clone())).await;
        let (status, Json(body)) = webhook(State(state), Json(signal)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "IGNORED");
        assert_eq!(client.orders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_concurrent_request_is_429() {
        let (tx, rx) = oneshot::channel();
        let client = Arc::new(FakeExchange {
            gate: StdMutex::new(Some(rx)),
            ..FakeExchange::default()
        });
        let state = state_with(client.clone());

        let first = {
            let state = state.clone();
            tokio::spawn(async move {
                webhook(
                    State(state),
                    Json(json!({"symbol": "BTCUSD", "side": "buy"})),
                )
                .await
            })
        };

        while client.orders.lock().unwrap().is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let (status, Json(body)) = webhook(
            State(state),
            Json(json!({"symbol": "BTCUSD", "side": "sell"})),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].is_string());
        assert_eq!(client.orders.lock().unwrap().len(), 1);

        tx.send(()).unwrap();
        let (status, _) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_webhook_exchange_failure_is_500_with_passthrough() {
        let client = Arc::new(FakeExchange {
            fail: true,
            ..FakeExchange::default()
        });
        let state = state_with(client);

        let (status, Json(body)) = webhook(
            State(state),
            Json(json!({"symbol": "BTCUSD", "side": "buy", "entryPrice": 100})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        // Exchange error payload passed through verbatim.
        assert_eq!(body["error"]["error"]["code"], "insufficient_margin");
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "deltaflip");
    }
}
