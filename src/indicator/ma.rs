use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{DEFAULT_MA_PERIOD, Indicator, IndicatorColumn};

/// Simple Moving Average.
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self::with_period(period))
    }

    /// Construct without validation; `period` must be non-zero.
    pub(super) fn with_period(period: usize) -> Self {
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    /// Defined SMA values only; empty when `prices` is shorter than the period.
    pub fn calculate_prices(&self, prices: &[f64]) -> Vec<f64> {
        if prices.len() < self.period {
            return Vec::new();
        }
        prices
            .windows(self.period)
            .map(|w| w.iter().sum::<f64>() / self.period as f64)
            .collect()
    }
}

impl Default for Sma {
    fn default() -> Self {
        Self::with_period(DEFAULT_MA_PERIOD)
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_points(&self) -> usize {
        self.period
    }

    fn calculate(&self, prices: &[f64]) -> IndicatorColumn {
        IndicatorColumn::aligned(prices.len(), self.calculate_prices(prices))
    }
}

/// Exponential Moving Average.
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self::with_period(period))
    }

    /// Construct without validation; `period` must be non-zero.
    pub(super) fn with_period(period: usize) -> Self {
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }

    /// Defined EMA values only; empty when `prices` is shorter than the period.
    pub fn calculate_prices(&self, prices: &[f64]) -> Vec<f64> {
        if prices.len() < self.period {
            return Vec::new();
        }

        let k = 2.0 / (self.period as f64 + 1.0);
        // Seed with SMA of first `period` values
        let seed: f64 = prices[..self.period].iter().sum::<f64>() / self.period as f64;
        let mut ema = seed;
        let mut results = Vec::with_capacity(prices.len() - self.period + 1);
        results.push(ema);

        for &price in &prices[self.period..] {
            ema = price * k + ema * (1.0 - k);
            results.push(ema);
        }

        results
    }

    /// Smooth an already-derived column, e.g. the MACD line.
    ///
    /// Runs over the column's defined suffix, so the warm-up of the input
    /// and of this EMA add up.
    pub fn calculate_column(&self, column: &IndicatorColumn) -> IndicatorColumn {
        IndicatorColumn::aligned(
            column.len(),
            self.calculate_prices(&column.defined_suffix()),
        )
    }
}

impl Default for Ema {
    fn default() -> Self {
        Self::with_period(DEFAULT_MA_PERIOD)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_points(&self) -> usize {
        self.period
    }

    fn calculate(&self, prices: &[f64]) -> IndicatorColumn {
        IndicatorColumn::aligned(prices.len(), self.calculate_prices(prices))
    }
}
