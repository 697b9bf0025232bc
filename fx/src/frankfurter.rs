//! HTTP rate provider for Frankfurter-compatible APIs.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use currex_common::{format_date, CurrencyPair};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{FxError, FxResult};
use crate::provider::{ensure_positive, DailyRates, RateProvider};

/// `/latest` and `/{date}` response body.
#[derive(Debug, Deserialize)]
struct PointResponse {
    rates: HashMap<String, f64>,
}

/// `/{start}..{end}` response body.
#[derive(Debug, Deserialize)]
struct RangeResponse {
    rates: BTreeMap<NaiveDate, HashMap<String, f64>>,
}

/// Live provider speaking the Frankfurter REST API.
#[derive(Debug, Clone)]
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl FrankfurterProvider {
    /// Create a provider for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FxResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("currex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FxError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a provider around an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, pair: CurrencyPair) -> FxResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, pair = %pair, "Requesting rates");

        let response = self
            .client
            .get(&url)
            .query(&[("from", pair.from.code()), ("to", pair.to.code())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FxError::ProviderUnavailable(format!("request timeout: {}", e))
                } else {
                    FxError::ProviderUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::ProviderUnavailable(format!(
                "{} returned status {}",
                url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FxError::ProviderUnavailable(format!("failed to read body: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| FxError::ProviderUnavailable(format!("malformed response: {}", e)))
    }
}

/// Pick the quote currency out of a `rates` object.
fn quote_rate(pair: CurrencyPair, rates: &HashMap<String, f64>) -> FxResult<Decimal> {
    let raw = rates
        .get(pair.to.code())
        .copied()
        .ok_or_else(|| FxError::ProviderUnavailable(format!("response lacks {}", pair.to)))?;
    ensure_positive(pair, to_decimal(pair, raw)?)
}

/// Convert a JSON number without picking up binary float noise.
fn to_decimal(pair: CurrencyPair, raw: f64) -> FxResult<Decimal> {
    if !raw.is_finite() {
        return Err(FxError::ProviderUnavailable(format!(
            "non-finite rate for {}",
            pair
        )));
    }
    Decimal::from_str(&raw.to_string())
        .map_err(|e| FxError::ProviderUnavailable(format!("unrepresentable rate {}: {}", raw, e)))
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "frankfurter"
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn latest(&self, pair: CurrencyPair) -> FxResult<Decimal> {
        let body: PointResponse = self.fetch("latest", pair).await?;
        quote_rate(pair, &body.rates)
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn on_date(&self, pair: CurrencyPair, date: NaiveDate) -> FxResult<Decimal> {
        let body: PointResponse = self.fetch(&format_date(date), pair).await?;
        quote_rate(pair, &body.rates)
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn range(
        &self,
        pair: CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FxResult<DailyRates> {
        let path = format!("{}..{}", format_date(start), format_date(end));
        let body: RangeResponse = self.fetch(&path, pair).await?;

        body.rates
            .iter()
            .map(|(date, rates)| Ok((*date, quote_rate(pair, rates)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use currex_common::Currency;
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn usd_eur() -> CurrencyPair {
        CurrencyPair::new(Currency::Usd, Currency::Eur)
    }

    /// Serve one canned HTTP response; the handle yields the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn provider(base: &str) -> FrankfurterProvider {
        FrankfurterProvider::new(base, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_latest_rate() {
        let (base, server) = serve_once("200 OK", r#"{"amount":1.0,"base":"USD","rates":{"EUR":0.85}}"#).await;

        let rate = provider(&base).latest(usd_eur()).await.unwrap();

        assert_eq!(rate, dec!(0.85));
        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /latest?from=USD&to=EUR "));
    }

    #[tokio::test]
    async fn test_historical_rate_path() {
        let (base, server) = serve_once("200 OK", r#"{"rates":{"EUR":0.9123}}"#).await;
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let rate = provider(&base).on_date(usd_eur(), date).await.unwrap();

        assert_eq!(rate, dec!(0.9123));
        assert!(server.await.unwrap().starts_with("GET /2024-03-15?from=USD&to=EUR "));
    }

    #[tokio::test]
    async fn test_range_is_ordered() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"rates":{"2024-03-04":{"EUR":0.92},"2024-03-01":{"EUR":0.91}}}"#,
        )
        .await;
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

        let rates = provider(&base).range(usd_eur(), start, end).await.unwrap();

        let dates: Vec<_> = rates.keys().copied().collect();
        assert_eq!(dates, vec![start, end]);
        assert_eq!(rates[&end], dec!(0.92));
        assert!(server
            .await
            .unwrap()
            .starts_with("GET /2024-03-01..2024-03-04?from=USD&to=EUR "));
    }

    #[tokio::test]
    async fn test_non_success_status_is_failure() {
        let (base, _server) = serve_once("404 Not Found", r#"{"message":"not found"}"#).await;

        let result = provider(&base).latest(usd_eur()).await;

        assert!(matches!(result, Err(FxError::ProviderUnavailable(msg)) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_missing_quote_is_failure() {
        let (base, _server) = serve_once("200 OK", r#"{"rates":{"GBP":0.73}}"#).await;

        let result = provider(&base).latest(usd_eur()).await;

        assert!(matches!(result, Err(FxError::ProviderUnavailable(msg)) if msg.contains("EUR")));
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_failure() {
        let (base, _server) = serve_once("200 OK", r#"{"data":[1,2,3]}"#).await;

        let result = provider(&base).latest(usd_eur()).await;

        assert!(matches!(result, Err(FxError::ProviderUnavailable(msg)) if msg.contains("malformed")));
    }

    #[tokio::test]
    async fn test_hanging_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let provider = FrankfurterProvider::new(base, Duration::from_millis(100)).unwrap();
        let result = provider.latest(usd_eur()).await;

        assert!(matches!(result, Err(FxError::ProviderUnavailable(_))));
    }

    #[test]
    fn test_to_decimal_is_exact() {
        assert_eq!(to_decimal(usd_eur(), 0.0091).unwrap(), dec!(0.0091));
        assert_eq!(to_decimal(usd_eur(), 110.0).unwrap(), dec!(110));
        assert!(to_decimal(usd_eur(), f64::NAN).is_err());
    }
}
