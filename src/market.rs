//! Market data client
//!
//! Fetches a live price quote for a ticker symbol.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::AgentError;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{error, info};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Trait for the external price source.
#[async_trait::async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch the current price for `ticker`. Any non-success is fatal to
    /// the current invocation; retry policy does not live here.
    async fn fetch_price(&self, ticker: &str) -> crate::Result<f64>;
}

/// Reusable Yahoo Finance chart client (connection-pooled)
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(base_url: String) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from `MARKET_DATA_BASE_URL`, falling back to the
    /// public Yahoo chart endpoint.
    pub fn from_env() -> crate::Result<Self> {
        let base_url =
            env::var("MARKET_DATA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

#[async_trait::async_trait]
impl MarketData for YahooFinanceClient {
    async fn fetch_price(&self, ticker: &str) -> crate::Result<f64> {
        let url = format!("{}/{}", self.base_url, ticker);

        let response = self
            .client
            .get(&url)
            .query(&[("interval", "1h"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| {
                error!(ticker, error = %e, "Market data request failed");
                AgentError::from(e)
            })?;

        let response = response.error_for_status().map_err(|e| {
            error!(ticker, error = %e, "Market data source returned error status");
            AgentError::from(e)
        })?;

        let chart: ChartResponse = response.json().await.map_err(|e| {
            error!(ticker, error = %e, "Failed to parse market data response");
            AgentError::from(e)
        })?;

        let price = chart
            .chart
            .result
            .first()
            .map(|r| r.meta.regular_market_price)
            .ok_or_else(|| {
                AgentError::MalformedQuote(format!("empty chart result for '{}'", ticker))
            })?;

        info!(ticker, price, "Current stock price fetched");
        Ok(price)
    }
}

/// Mock price source for development & testing
/// Keeps the workflow runnable without the external endpoint
pub struct FixedPriceClient(pub f64);

#[async_trait::async_trait]
impl MarketData for FixedPriceClient {
    async fn fetch_price(&self, ticker: &str) -> crate::Result<f64> {
        info!(ticker, price = self.0, "Returning fixed mock price");
        Ok(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Vec<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_response_parsing() {
        let body = r#"{
            "chart": {
                "result": [
                    { "meta": { "regularMarketPrice": 123.45, "symbol": "ACME" } }
                ],
                "error": null
            }
        }"#;

        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.chart.result[0].meta.regular_market_price, 123.45);
    }

    #[test]
    fn test_chart_response_empty_result() {
        let body = r#"{ "chart": { "result": [] } }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.chart.result.is_empty());
    }
}
