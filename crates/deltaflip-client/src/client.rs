//! HTTP client for the Delta Exchange REST API.

use crate::api::ExchangeApi;
use crate::error::{ClientError, ClientResult};
use crate::sign::SignedRequest;
use async_trait::async_trait;
use deltaflip_core::{
    underlying_asset, CancelAllOrdersPayload, CancelOrderPayload, ExchangePosition, OrderPayload,
    PositionState,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Production REST host.
pub const DEFAULT_BASE_URL: &str = "https://api.india.delta.exchange";

/// Default timeout for API requests. Bounded so a hung exchange call
/// cannot wedge the reconciler's in-flight guard.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration. Credentials are environment-sourced by the
/// caller and never serialized.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Signed client for the exchange REST API.
pub struct DeltaClient {
    http: Client,
    config: ClientConfig,
}

impl DeltaClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Sign and send one request; no retries.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: String,
    ) -> ClientResult<Value> {
        let signed = SignedRequest::build_now(
            &self.config.api_secret,
            method.as_str(),
            path,
            query,
            body,
        )?;

        let url = format!("{}{}{}", self.config.base_url, signed.path, signed.query);
        debug!(method = %signed.method, %url, "Sending signed request");

        let mut request = self
            .http
            .request(method, &url)
            .header("api-key", &self.config.api_key)
            .header("timestamp", &signed.timestamp)
            .header("signature", &signed.signature)
            .header(ACCEPT, "application/json");

        // The signed body string is transmitted as-is; re-serializing it
        // would invalidate the signature. GET carries neither body nor
        // Content-Type.
        if signed.has_body() {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(signed.body.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Err(ClientError::Exchange {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// `GET /v2/products` — the exchange's product catalog.
    pub async fn get_products(&self) -> ClientResult<Value> {
        self.request(Method::GET, "/v2/products", "", String::new())
            .await
    }

    /// `GET /v2/positions`, optionally filtered by underlying asset.
    pub async fn get_positions(&self, underlying: Option<&str>) -> ClientResult<Value> {
        let query = match underlying {
            Some(asset) => format!("?underlying_asset_symbol={asset}"),
            None => String::new(),
        };
        self.request(Method::GET, "/v2/positions", &query, String::new())
            .await
    }

    /// `GET /v2/orders` — open orders for a product.
    pub async fn get_open_orders(&self, product_id: u64) -> ClientResult<Value> {
        let query = format!("?product_id={product_id}&state=open");
        self.request(Method::GET, "/v2/orders", &query, String::new())
            .await
    }

    /// `GET /v2/tickers/{symbol}`.
    pub async fn get_ticker(&self, symbol: &str) -> ClientResult<Value> {
        let path = format!("/v2/tickers/{symbol}");
        self.request(Method::GET, &path, "", String::new()).await
    }

    /// `DELETE /v2/orders` — cancel one order.
    pub async fn cancel_order(&self, order_id: u64, product_id: u64) -> ClientResult<Value> {
        let payload = CancelOrderPayload {
            id: order_id,
            product_id,
        };
        let body = serde_json::to_string(&payload)?;
        self.request(Method::DELETE, "/v2/orders", "", body).await
    }

    /// `DELETE /v2/orders/all` — cancel every order for a product.
    pub async fn cancel_all_orders(&self, product_id: u64) -> ClientResult<Value> {
        let payload = CancelAllOrdersPayload { product_id };
        let body = serde_json::to_string(&payload)?;
        self.request(Method::DELETE, "/v2/orders/all", "", body)
            .await
    }
}

/// Parse the positions response into the local tracking representation.
///
/// The first entry of `result` is authoritative; an empty list or a
/// zero-size entry means flat.
fn parse_open_position(body: &Value) -> ClientResult<PositionState> {
    let result = body
        .get("result")
        .ok_or_else(|| ClientError::Response("positions response has no result field".into()))?;

    let entries = result
        .as_array()
        .ok_or_else(|| ClientError::Response("positions result is not an array".into()))?;

    match entries.first() {
        None => Ok(PositionState::Flat),
        Some(entry) => {
            let position: ExchangePosition = serde_json::from_value(entry.clone())?;
            Ok(position.to_state())
        }
    }
}

#[async_trait]
impl ExchangeApi for DeltaClient {
    async fn place_order(&self, order: &OrderPayload) -> ClientResult<Value> {
        // Serialized exactly once; these bytes are signed and sent.
        let body = serde_json::to_string(order)?;
        info!(
            symbol = %order.product_symbol,
            side = %order.side,
            size = order.size,
            reduce_only = ?order.reduce_only,
            "Placing order"
        );
        self.request(Method::POST, "/v2/orders", "", body).await
    }

    async fn open_position(&self, product_symbol: &str) -> ClientResult<PositionState> {
        let underlying = underlying_asset(product_symbol);
        let body = self.get_positions(Some(underlying)).await?;
        parse_open_position(&body)
    }
}
