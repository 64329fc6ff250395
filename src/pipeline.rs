use error_stack::Report;
use tracing::debug;

use crate::error::IndicatorError;
use crate::indicator::ma::{Ema, Sma};
use crate::indicator::macd::Macd;
use crate::indicator::rsi::Rsi;
use crate::indicator::compute_column;
use crate::model::{IndicatorToggles, PriceSeries};
use crate::series::{AugmentedSeries, IndicatorSet};
use crate::signal::{SignalMessage, classify};

/// Output of one pipeline run over a fetched series.
#[derive(Debug, Clone, PartialEq)]
pub struct Computation<'a> {
    pub series: AugmentedSeries<'a>,
    pub messages: Vec<SignalMessage>,
}

/// The fixed indicator configuration used by the dashboard.
pub struct IndicatorEngine {
    sma: Sma,
    ema: Ema,
    rsi: Rsi,
    macd: Macd,
}

impl IndicatorEngine {
    /// Engine with non-default periods, validated like the individual indicators.
    #[allow(dead_code)]
    pub fn new(
        ma_period: usize,
        rsi_period: usize,
        macd_periods: (usize, usize, usize),
    ) -> Result<Self, Report<IndicatorError>> {
        let (fast, slow, signal) = macd_periods;
        Ok(Self {
            sma: Sma::new(ma_period)?,
            ema: Ema::new(ma_period)?,
            rsi: Rsi::new(rsi_period)?,
            macd: Macd::new(fast, slow, signal)?,
        })
    }

    /// SMA/EMA 14, RSI 14 and MACD(12, 26, 9).
    pub fn with_defaults() -> Self {
        Self {
            sma: Sma::default(),
            ema: Ema::default(),
            rsi: Rsi::default(),
            macd: Macd::default(),
        }
    }

    /// Compute the columns selected by `toggles`. Disabled families stay `None`.
    pub fn augment<'a>(
        &self,
        series: &'a PriceSeries,
        toggles: IndicatorToggles,
    ) -> AugmentedSeries<'a> {
        let prices = series.prices();
        let mut set = IndicatorSet::default();

        if toggles.sma {
            set.sma_14 = Some(compute_column(&self.sma, &prices));
            set.ema_14 = Some(compute_column(&self.ema, &prices));
        }
        if toggles.rsi {
            set.rsi = Some(compute_column(&self.rsi, &prices));
        }
        if toggles.macd {
            let lines = self.macd.calculate_lines(&prices);
            debug!(
                macd_defined = lines.macd.defined_count(),
                signal_defined = lines.signal.defined_count(),
                total = prices.len(),
                "macd computed"
            );
            set.macd = Some(lines.macd);
            set.signal = Some(lines.signal);
        }

        AugmentedSeries::new(series, set)
    }

    /// Augment `series` and classify the result.
    pub fn compute<'a>(
        &self,
        series: &'a PriceSeries,
        toggles: IndicatorToggles,
    ) -> Computation<'a> {
        let augmented = self.augment(series, toggles);
        let messages = classify(&augmented);
        Computation {
            series: augmented,
            messages,
        }
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Run the default engine over `series`.
pub fn compute(series: &PriceSeries, toggles: IndicatorToggles) -> Computation<'_> {
    IndicatorEngine::with_defaults().compute(series, toggles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::series_from_prices;
    use crate::signal::SignalKind;

    const SCENARIO: [f64; 15] = [
        100.0, 102.0, 101.0, 105.0, 103.0, 107.0, 108.0, 106.0, 110.0, 112.0, 111.0, 115.0, 117.0,
        116.0, 120.0,
    ];

    #[test]
    fn all_toggles_off_leaves_series_untouched() {
        let series = series_from_prices(&SCENARIO);
        let result = compute(&series, IndicatorToggles::none());
        assert_eq!(result.series.prices(), &series);
        assert!(result.series.indicators().is_empty());
        assert!(result.messages.is_empty());
    }

    #[test]
    fn toggles_select_columns() {
        let series = series_from_prices(&SCENARIO);
        let toggles = IndicatorToggles {
            rsi: true,
            macd: false,
            sma: true,
        };
        let set = compute(&series, toggles).series.indicators().clone();
        assert!(set.rsi.is_some());
        assert!(set.sma_14.is_some());
        assert!(set.ema_14.is_some());
        assert!(set.macd.is_none());
        assert!(set.signal.is_none());
    }

    #[test]
    fn columns_align_with_series() {
        let series = series_from_prices(&SCENARIO);
        let set = compute(&series, IndicatorToggles::all()).series.indicators().clone();
        for column in [&set.sma_14, &set.ema_14, &set.rsi, &set.macd, &set.signal] {
            assert_eq!(column.as_ref().unwrap().len(), series.len());
        }
    }

    #[test]
    fn scenario_rsi_has_single_defined_value() {
        let series = series_from_prices(&SCENARIO);
        let toggles = IndicatorToggles {
            rsi: true,
            ..IndicatorToggles::none()
        };
        let result = compute(&series, toggles);
        let rsi = result.series.indicators().rsi.as_ref().unwrap();
        assert_eq!(rsi.defined_count(), 1);
        assert!(rsi.values()[14].is_some());

        let rsi_messages: Vec<_> = result
            .messages
            .iter()
            .filter(|m| {
                matches!(
                    m.kind(),
                    SignalKind::RsiOverbought | SignalKind::RsiOversold | SignalKind::RsiNeutral
                )
            })
            .collect();
        assert_eq!(rsi_messages.len(), 1);
        // 27 points of gains against 7 of losses
        assert_eq!(rsi_messages[0].kind(), SignalKind::RsiOverbought);
    }

    #[test]
    fn short_series_reports_nothing_for_macd() {
        let series = series_from_prices(&SCENARIO);
        let toggles = IndicatorToggles {
            macd: true,
            ..IndicatorToggles::none()
        };
        let result = compute(&series, toggles);
        let set = result.series.indicators();
        assert!(set.macd.as_ref().unwrap().is_all_undefined());
        assert!(set.signal.as_ref().unwrap().is_all_undefined());
        assert!(result.messages.is_empty());
    }

    #[test]
    fn series_shorter_than_periods_yields_no_messages() {
        let series = series_from_prices(&[100.0, 101.0, 99.0]);
        let result = compute(&series, IndicatorToggles::all());
        let set = result.series.indicators();
        assert!(set.sma_14.as_ref().unwrap().is_all_undefined());
        assert!(set.ema_14.as_ref().unwrap().is_all_undefined());
        assert!(set.rsi.as_ref().unwrap().is_all_undefined());
        assert!(result.messages.is_empty());
    }

    #[test]
    fn empty_series_is_total() {
        let series = series_from_prices(&[]);
        let result = compute(&series, IndicatorToggles::all());
        let set = result.series.indicators();
        assert!(set.rsi.as_ref().unwrap().is_empty());
        assert!(set.macd.as_ref().unwrap().is_empty());
        assert!(result.messages.is_empty());
    }

    #[test]
    fn compute_is_idempotent() {
        let prices: Vec<f64> = (0..80)
            .map(|i| 200.0 + (i as f64 * 0.7).sin() * 15.0 + i as f64 * 0.3)
            .collect();
        let series = series_from_prices(&prices);
        let first = compute(&series, IndicatorToggles::all());
        let second = compute(&series, IndicatorToggles::all());
        assert_eq!(first, second);
        assert_eq!(first.messages.len(), 3);
    }

    #[test]
    fn custom_periods_are_validated() {
        assert!(IndicatorEngine::new(14, 14, (12, 26, 9)).is_ok());
        assert!(IndicatorEngine::new(0, 14, (12, 26, 9)).is_err());
        assert!(IndicatorEngine::new(14, 14, (26, 12, 9)).is_err());
    }
}
