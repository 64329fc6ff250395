use crate::indicator::IndicatorColumn;
use crate::model::PriceSeries;

/// Derived columns of one refresh, each present only if it was requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSet {
    pub sma_14: Option<IndicatorColumn>,
    pub ema_14: Option<IndicatorColumn>,
    pub rsi: Option<IndicatorColumn>,
    pub macd: Option<IndicatorColumn>,
    pub signal: Option<IndicatorColumn>,
}

impl IndicatorSet {
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.sma_14.is_none()
            && self.ema_14.is_none()
            && self.rsi.is_none()
            && self.macd.is_none()
            && self.signal.is_none()
    }
}

/// A price series together with the indicator columns computed from it.
///
/// Borrows the series: augmenting never copies or alters the fetched prices.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedSeries<'a> {
    prices: &'a PriceSeries,
    indicators: IndicatorSet,
}

impl<'a> AugmentedSeries<'a> {
    pub fn new(prices: &'a PriceSeries, indicators: IndicatorSet) -> Self {
        Self { prices, indicators }
    }

    pub fn prices(&self) -> &'a PriceSeries {
        self.prices
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }
}
