use gloo_net::http::Request;
use serde::de::DeserializeOwned;

use crate::application::gateway::DataGateway;
use crate::domain::errors::{GatewayError, GatewayResult};
use crate::domain::logging::LogComponent;
use crate::domain::{Candle, Portfolio, RealTimeTick, Signal, SymbolId, SymbolQuote, Timeframe, Trade};
use crate::{log_debug, log_warn};

const COMPONENT: LogComponent = LogComponent::Infrastructure("HTTP");

pub const PORTFOLIO_PATH: &str = "/api/portfolio-data";
pub const SYMBOLS_PATH: &str = "/api/symbols";
pub const SIGNALS_PATH: &str = "/api/signals";
pub const TRADES_PATH: &str = "/api/trades";
pub const MARKET_DATA_PATH: &str = "/api/market-data";
pub const REAL_TIME_PATH: &str = "/api/real-time-data";

/// Builds endpoint URLs relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn market_data(&self, symbol: &SymbolId, timeframe: Timeframe) -> String {
        format!(
            "{}{}/{}?timeframe={}",
            self.base_url,
            MARKET_DATA_PATH,
            url_encode(symbol.value()),
            url_encode(timeframe.as_query())
        )
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn url_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

/// Decode a response body, classifying failures as `Decode`.
pub fn decode_body<T: DeserializeOwned>(url: &str, body: &str) -> GatewayResult<T> {
    serde_json::from_str(body).map_err(|e| GatewayError::Decode(format!("{url}: {e}")))
}

/// `DataGateway` over `fetch`, via gloo-net. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    endpoints: Endpoints,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        Self { endpoints: Endpoints::new(base_url) }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> GatewayResult<T> {
        log_debug!(COMPONENT, "GET {}", url);

        let response = Request::get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("{url}: {e}")))?;

        if !response.ok() {
            let message = format!("{url}: HTTP {} {}", response.status(), response.status_text());
            log_warn!(COMPONENT, "{}", message);
            return Err(GatewayError::Network(message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(format!("{url}: {e}")))?;
        decode_body(url, &body)
    }
}

impl DataGateway for HttpGateway {
    async fn fetch_portfolio(&self) -> GatewayResult<Portfolio> {
        self.get_json(&self.endpoints.url(PORTFOLIO_PATH)).await
    }

    async fn fetch_symbols(&self) -> GatewayResult<Vec<SymbolQuote>> {
        self.get_json(&self.endpoints.url(SYMBOLS_PATH)).await
    }

    async fn fetch_signals(&self) -> GatewayResult<Vec<Signal>> {
        self.get_json(&self.endpoints.url(SIGNALS_PATH)).await
    }

    async fn fetch_trades(&self) -> GatewayResult<Vec<Trade>> {
        self.get_json(&self.endpoints.url(TRADES_PATH)).await
    }

    async fn fetch_candles(&self, symbol: &SymbolId, timeframe: Timeframe) -> GatewayResult<Vec<Candle>> {
        self.get_json(&self.endpoints.market_data(symbol, timeframe)).await
    }

    async fn fetch_real_time(&self) -> GatewayResult<RealTimeTick> {
        self.get_json(&self.endpoints.url(REAL_TIME_PATH)).await
    }
}
