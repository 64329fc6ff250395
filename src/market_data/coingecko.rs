use std::time::Duration;

use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::MarketDataConfig;
use crate::error::{FetchError, SeriesError};
use crate::market_data::MarketData;
use crate::model::{PricePoint, PriceSeries, Timeframe};

const COIN_LIST_PATH: &str = "/coins/list";
const ERROR_BODY_LIMIT: usize = 200;

pub struct CoinGecko {
    client: reqwest::Client,
    base_url: String,
    vs_currency: String,
}

impl CoinGecko {
    pub fn new(config: &MarketDataConfig) -> Result<Self, Report<FetchError>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("greenwave/", env!("CARGO_PKG_VERSION")))
            .build()
            .change_context(FetchError::Request {
                endpoint: config.base_url.clone(),
            })
            .attach("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            vs_currency: config.vs_currency.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Report<FetchError>> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .change_context(FetchError::Request {
                endpoint: path.to_owned(),
            })
            .attach_with(|| format!("url: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Report::new(FetchError::Status {
                endpoint: path.to_owned(),
                status: status.as_u16(),
                body: error_body(&body),
            })
            .attach(format!("url: {url}")));
        }

        response
            .json()
            .await
            .change_context(FetchError::ResponseParse {
                endpoint: path.to_owned(),
            })
    }
}

impl MarketData for CoinGecko {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn resolve_symbol(&self, symbol: &str) -> BoxFuture<'_, Result<String, Report<FetchError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            let coins: Vec<CoinListEntry> = self.get_json(COIN_LIST_PATH, &[]).await?;
            debug!(coins = coins.len(), "coin list fetched");

            find_coin_id(&coins, &symbol)
                .map(str::to_owned)
                .ok_or_else(|| Report::new(FetchError::SymbolNotFound { symbol }))
        })
    }

    fn fetch_series(
        &self,
        coin_id: &str,
        timeframe: Timeframe,
    ) -> BoxFuture<'_, Result<PriceSeries, Report<FetchError>>> {
        let coin_id = coin_id.to_owned();
        Box::pin(async move {
            let path = format!("/coins/{coin_id}/market_chart");
            let params = [
                ("vs_currency", self.vs_currency.clone()),
                ("days", timeframe.days().to_string()),
                ("interval", timeframe.interval().as_str().to_owned()),
            ];

            let chart: MarketChart = self
                .get_json(&path, &params)
                .await
                .map_err(|report| unknown_coin_on_404(report, &coin_id))?;
            let series = chart
                .into_series()
                .change_context(FetchError::MalformedSeries { endpoint: path })?;

            info!(
                coin_id = %coin_id,
                timeframe = %timeframe,
                points = series.len(),
                "price history fetched"
            );
            Ok(series)
        })
    }
}

/// Upstream error bodies can be whole HTML pages; keep the alert line short.
fn error_body(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= ERROR_BODY_LIMIT {
        return body.to_owned();
    }
    let mut short: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    short.push('…');
    short
}

/// A 404 on a per-coin endpoint means the id itself is unknown.
fn unknown_coin_on_404(report: Report<FetchError>, coin_id: &str) -> Report<FetchError> {
    if matches!(
        report.current_context(),
        FetchError::Status { status: 404, .. }
    ) {
        report.change_context(FetchError::CoinNotFound {
            coin_id: coin_id.to_owned(),
        })
    } else {
        report
    }
}

/// First coin whose symbol matches case-insensitively.
fn find_coin_id<'a>(coins: &'a [CoinListEntry], symbol: &str) -> Option<&'a str> {
    coins
        .iter()
        .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
        .map(|c| c.id.as_str())
}

// ── REST response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CoinListEntry {
    id: String,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(i64, f64)>,
}

impl MarketChart {
    /// Convert `[timestamp_ms, price]` pairs into an ordered series.
    ///
    /// The provider can repeat the most recent timestamp; points are sorted
    /// and a repeated timestamp keeps its last price.
    fn into_series(self) -> Result<PriceSeries, Report<SeriesError>> {
        let mut points: Vec<PricePoint> = Vec::with_capacity(self.prices.len());
        for (timestamp_ms, price) in self.prices {
            match DateTime::from_timestamp_millis(timestamp_ms) {
                Some(time) => points.push(PricePoint { time, price }),
                None => warn!(timestamp_ms, "dropping point with out-of-range timestamp"),
            }
        }

        points.sort_by_key(|p| p.time);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.time == point.time => *last = point,
                _ => deduped.push(point),
            }
        }

        PriceSeries::new(deduped)
    }
}
