use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::Ema;
use crate::indicator::{
    DEFAULT_MACD_FAST, DEFAULT_MACD_SIGNAL, DEFAULT_MACD_SLOW, Indicator, IndicatorColumn,
};

pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    slow_period: usize,
    signal_period: usize,
}

/// MACD line and its signal line, both aligned with the input prices.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: IndicatorColumn,
    pub signal: IndicatorColumn,
}

impl Macd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "all periods must be > 0".into(),
            });
        }
        if fast_period >= slow_period {
            bail!(IndicatorError::InvalidParameter {
                name: "fast_period must be < slow_period".into(),
            });
        }
        Ok(Self {
            fast: Ema::new(fast_period)?,
            slow: Ema::new(slow_period)?,
            signal: Ema::new(signal_period)?,
            slow_period,
            signal_period,
        })
    }

    /// Calculate the MACD line (fast EMA − slow EMA) and its EMA signal line.
    ///
    /// The MACD line is defined from position `slow − 1`, the signal line
    /// from `slow + signal − 2`.
    pub fn calculate_lines(&self, prices: &[f64]) -> MacdLines {
        let fast_ema = self.fast.calculate(prices);
        let slow_ema = self.slow.calculate(prices);
        let macd = fast_ema.zip_with(&slow_ema, |f, s| f - s);
        let signal = self.signal.calculate_column(&macd);
        MacdLines { macd, signal }
    }
}

impl Default for Macd {
    /// MACD(12, 26, 9).
    fn default() -> Self {
        Self {
            fast: Ema::with_period(DEFAULT_MACD_FAST),
            slow: Ema::with_period(DEFAULT_MACD_SLOW),
            signal: Ema::with_period(DEFAULT_MACD_SIGNAL),
            slow_period: DEFAULT_MACD_SLOW,
            signal_period: DEFAULT_MACD_SIGNAL,
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn required_points(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    /// Returns the MACD line only.
    fn calculate(&self, prices: &[f64]) -> IndicatorColumn {
        self.calculate_lines(prices).macd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_invalid_fast_ge_slow() {
        assert!(Macd::new(26, 12, 9).is_err());
        assert!(Macd::new(12, 12, 9).is_err());
    }

    #[test]
    fn macd_period_zero_invalid() {
        assert!(Macd::new(0, 26, 9).is_err());
        assert!(Macd::new(12, 26, 0).is_err());
    }

    #[test]
    fn macd_default_matches_explicit_periods() {
        let prices: Vec<f64> = (0..50).map(|i| 50.0 + (i % 7) as f64).collect();
        let explicit = Macd::new(12, 26, 9).unwrap();
        assert_eq!(Macd::default().required_points(), 34);
        assert_eq!(
            Macd::default().calculate_lines(&prices),
            explicit.calculate_lines(&prices)
        );
    }

    #[test]
    fn macd_short_series_is_all_undefined() {
        let macd = Macd::new(12, 26, 9).unwrap();
        let lines = macd.calculate_lines(&[1.0; 20]);
        assert_eq!(lines.macd.len(), 20);
        assert!(lines.macd.is_all_undefined());
        assert!(lines.signal.is_all_undefined());
    }

    #[test]
    fn macd_signal_warm_up_windows() {
        let macd = Macd::new(12, 26, 9).unwrap();
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let lines = macd.calculate_lines(&prices);
        assert_eq!(lines.macd.values()[24], None);
        assert!(lines.macd.values()[25].is_some());
        assert_eq!(lines.signal.values()[32], None);
        assert!(lines.signal.values()[33].is_some());
        assert_eq!(lines.signal.defined_count(), 40 - 33);
    }

    #[test]
    fn macd_signal_needs_required_points() {
        let macd = Macd::new(3, 5, 3).unwrap();
        let prices: Vec<f64> = (1..=macd.required_points()).map(|i| i as f64).collect();
        let lines = macd.calculate_lines(&prices);
        assert_eq!(lines.signal.defined_count(), 1);
        let shorter = &prices[..prices.len() - 1];
        assert!(macd.calculate_lines(shorter).signal.is_all_undefined());
    }

    #[test]
    fn macd_flat_prices_returns_zero() {
        let macd = Macd::new(3, 5, 3).unwrap();
        let lines = macd.calculate_lines(&[10.0_f64; 10]);
        for v in lines.macd.values().iter().chain(lines.signal.values()).flatten() {
            assert!(v.abs() < 1e-9, "expected 0 for flat prices, got {v}");
        }
    }

    #[test]
    fn macd_rising_prices_is_positive() {
        let macd = Macd::new(3, 5, 3).unwrap();
        let prices: Vec<f64> = (1..=12).map(|i| i as f64).collect();
        assert!(macd.calculate(&prices).last_defined().unwrap() > 0.0);
    }
}
