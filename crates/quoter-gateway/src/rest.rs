//! REST implementation of the exchange gateway.
//!
//! Thin request/response adapter over the venue's HTTP API. Every
//! response arrives in a `{status, data}` envelope; a non-zero status is
//! a business rejection, except the dedicated "already filled" code on
//! cancel which is a terminal success signal.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{BoxFuture, ExchangeGateway};
use crate::types::{CancelOutcome, NewOrderRequest, OrderAck, OrderDetail};
use quoter_core::{Depth, OrderId, Price, Ticker};

/// Default timeout for venue requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Envelope status for a successful request.
const STATUS_OK: i64 = 0;

/// Envelope status returned when a cancel is refused because the order
/// has already fully executed.
const STATUS_CANCEL_ALREADY_FILLED: i64 = 3008;

type HmacSha256 = Hmac<Sha256>;

/// API credential pair. Owned by the process, shared read-only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

/// Generic `{status, data}` response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: i64,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct DepthData {
    bids: Vec<Decimal>,
    asks: Vec<Decimal>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    /// Interleaved ticker fields; index 0 is the last trade price.
    ticker: Vec<Decimal>,
}

#[derive(Debug, Deserialize)]
struct BalanceEntry {
    currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    available: Decimal,
}

/// REST gateway for one venue.
pub struct RestGateway {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl RestGateway {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Venue request signature: HMAC-SHA256 over
    /// `{METHOD}{url}{timestamp_ms}{body}`, base64 encoded.
    fn sign(&self, method: &str, url: &str, timestamp_ms: i64, body: &str) -> GatewayResult<String> {
        let payload = format!("{method}{url}{timestamp_ms}{body}");
        let mut mac = HmacSha256::new_from_slice(self.credentials.api_secret.as_bytes())
            .map_err(|e| GatewayError::Auth(format!("invalid secret key: {e}")))?;
        mac.update(BASE64.encode(payload.as_bytes()).as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    async fn get_public<T: serde::de::DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::unwrap_envelope(response.error_for_status()?.json::<Envelope<T>>().await?)
    }

    async fn send_signed<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<String>,
    ) -> GatewayResult<T> {
        Self::unwrap_envelope(self.send_signed_envelope(method, path, body).await?)
    }

    async fn send_signed_envelope<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<String>,
    ) -> GatewayResult<Envelope<T>> {
        let url = self.url(path);
        let timestamp_ms = chrono_now_ms();
        let body_str = body.as_deref().unwrap_or("");
        let signature = self.sign(method.as_str(), &url, timestamp_ms, body_str)?;

        let mut request = self
            .client
            .request(method, &url)
            .header("ACCESS-KEY", &self.credentials.api_key)
            .header("ACCESS-TIMESTAMP", timestamp_ms.to_string())
            .header("ACCESS-SIGNATURE", signature);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await?;
        Ok(response.error_for_status()?.json::<Envelope<T>>().await?)
    }

    fn unwrap_envelope<T>(envelope: Envelope<T>) -> GatewayResult<T> {
        if envelope.status != STATUS_OK {
            return Err(GatewayError::Rejected {
                status: envelope.status,
                message: envelope.msg.unwrap_or_default(),
            });
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::Malformed("missing data field".to_string()))
    }
}

impl ExchangeGateway for RestGateway {
    fn depth<'a>(
        &'a self,
        symbol: &'a str,
        depth_tag: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Depth>> {
        Box::pin(async move {
            let data: DepthData = self
                .get_public(&format!("/market/depth/{depth_tag}/{symbol}"))
                .await?;
            Ok(Depth::from_interleaved(&data.bids, &data.asks))
        })
    }

    fn ticker<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, GatewayResult<Ticker>> {
        Box::pin(async move {
            let data: TickerData = self.get_public(&format!("/market/ticker/{symbol}")).await?;
            let last = data
                .ticker
                .first()
                .copied()
                .ok_or_else(|| GatewayError::Malformed("empty ticker array".to_string()))?;
            Ok(Ticker::new(Price::new(last)))
        })
    }

    fn available_balance<'a>(&'a self, currency: &'a str) -> BoxFuture<'a, GatewayResult<Decimal>> {
        Box::pin(async move {
            let entries: Vec<BalanceEntry> = self
                .send_signed(reqwest::Method::GET, "/accounts/balance", None)
                .await?;
            Ok(entries
                .iter()
                .find(|e| e.currency == currency)
                .map(|e| e.available)
                .unwrap_or(Decimal::ZERO))
        })
    }

    fn create_order<'a>(
        &'a self,
        req: &'a NewOrderRequest,
    ) -> BoxFuture<'a, GatewayResult<OrderAck>> {
        Box::pin(async move {
            let body = serde_json::to_string(req)
                .map_err(|e| GatewayError::Malformed(e.to_string()))?;
            let order_id: String = self
                .send_signed(reqwest::Method::POST, "/orders", Some(body))
                .await?;
            debug!(symbol = %req.symbol, side = %req.side, order_id = %order_id, "order created");
            Ok(OrderAck {
                order_id: OrderId::new(order_id),
            })
        })
    }

    fn cancel_order<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, GatewayResult<CancelOutcome>> {
        Box::pin(async move {
            let path = format!("/orders/{}/submit-cancel", id.as_str());
            // Cancel success is signalled by the envelope status alone;
            // the data field may be absent.
            let envelope: Envelope<serde_json::Value> = self
                .send_signed_envelope(reqwest::Method::POST, &path, Some(String::new()))
                .await?;
            match envelope.status {
                STATUS_OK => Ok(CancelOutcome::Cancelled),
                STATUS_CANCEL_ALREADY_FILLED => Ok(CancelOutcome::AlreadyFilled),
                status => Err(GatewayError::Rejected {
                    status,
                    message: envelope.msg.unwrap_or_default(),
                }),
            }
        })
    }

    fn order_by_id<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, GatewayResult<OrderDetail>> {
        Box::pin(async move {
            self.send_signed(reqwest::Method::GET, &format!("/orders/{}", id.as_str()), None)
                .await
        })
    }
}

fn chrono_now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
