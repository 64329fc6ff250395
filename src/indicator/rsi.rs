use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{DEFAULT_RSI_PERIOD, Indicator, IndicatorColumn};

/// RSI (Relative Strength Index) using Wilder's smoothing method.
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    fn calculate_prices(&self, prices: &[f64]) -> Vec<f64> {
        if prices.len() < self.required_points() {
            return Vec::new();
        }

        let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

        // Seed using simple average of first `period` gains/losses
        let mut avg_gain: f64 = deltas[..self.period]
            .iter()
            .map(|&d| d.max(0.0))
            .sum::<f64>()
            / self.period as f64;
        let mut avg_loss: f64 = deltas[..self.period]
            .iter()
            .map(|&d| (-d).max(0.0))
            .sum::<f64>()
            / self.period as f64;

        let mut results = Vec::with_capacity(deltas.len() - self.period + 1);
        results.push(rsi_value(avg_gain, avg_loss));

        // Wilder smoothing for subsequent values
        for &delta in &deltas[self.period..] {
            let gain = delta.max(0.0);
            let loss = (-delta).max(0.0);
            avg_gain = (avg_gain * (self.period - 1) as f64 + gain) / self.period as f64;
            avg_loss = (avg_loss * (self.period - 1) as f64 + loss) / self.period as f64;
            results.push(rsi_value(avg_gain, avg_loss));
        }

        results
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            period: DEFAULT_RSI_PERIOD,
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_points(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, prices: &[f64]) -> IndicatorColumn {
        IndicatorColumn::aligned(prices.len(), self.calculate_prices(prices))
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // No movement at all reads as neutral
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_period_zero_invalid() {
        assert!(Rsi::new(0).is_err());
    }

    #[test]
    fn rsi_insufficient_data_is_all_undefined() {
        let rsi = Rsi::new(14).unwrap();
        // exactly `period` prices give only period - 1 deltas
        let column = rsi.calculate(&[1.0; 14]);
        assert_eq!(column.len(), 14);
        assert!(column.is_all_undefined());
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let rsi = Rsi::new(3).unwrap();
        let column = rsi.calculate(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(column.last_defined(), Some(100.0));
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let rsi = Rsi::new(3).unwrap();
        let column = rsi.calculate(&[4.0, 3.0, 2.0, 1.0]);
        assert!((column.last_defined().unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_flat_prices_is_neutral() {
        let rsi = Rsi::new(14).unwrap();
        let column = rsi.calculate(&[100.0; 20]);
        assert_eq!(column.defined_count(), 6);
        for v in column.values().iter().flatten() {
            assert_eq!(*v, 50.0);
        }
    }

    #[test]
    fn rsi_warm_up_ends_at_period() {
        let rsi = Rsi::new(14).unwrap();
        let prices = [
            100.0, 102.0, 101.0, 105.0, 103.0, 107.0, 108.0, 106.0, 110.0, 112.0, 111.0, 115.0,
            117.0, 116.0, 120.0,
        ];
        let column = rsi.calculate(&prices);
        assert_eq!(column.len(), 15);
        assert_eq!(column.defined_count(), 1);
        assert!(column.values()[14].is_some());
        // gains 27, losses 7 over 14 deltas
        let expected = 100.0 - 100.0 / (1.0 + 27.0 / 7.0);
        assert!((column.values()[14].unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn rsi_stays_within_bounds() {
        let rsi = Rsi::new(5).unwrap();
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i * 37) % 11) as f64 - ((i * 13) % 7) as f64)
            .collect();
        let column = rsi.calculate(&prices);
        assert!(column.defined_count() > 0);
        for v in column.values().iter().flatten() {
            assert!((0.0..=100.0).contains(v), "rsi out of range: {v}");
        }
    }
}
