pub mod coingecko;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::FetchError;
use crate::model::{PriceSeries, Timeframe};

/// Abstraction over a market-data provider.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn MarketData`).
pub trait MarketData: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Map a ticker symbol such as `"BTC"` to the provider's coin identifier.
    fn resolve_symbol(&self, symbol: &str) -> BoxFuture<'_, Result<String, Report<FetchError>>>;

    /// Fetch the price history of `coin_id` covering `timeframe`.
    fn fetch_series(
        &self,
        coin_id: &str,
        timeframe: Timeframe,
    ) -> BoxFuture<'_, Result<PriceSeries, Report<FetchError>>>;
}
