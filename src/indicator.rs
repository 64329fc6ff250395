pub mod ma;
pub mod macd;
pub mod rsi;

use tracing::debug;

pub const DEFAULT_MA_PERIOD: usize = 14;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

/// A technical analysis indicator over a price slice.
///
/// Prices must be in ascending chronological order (oldest first). The result
/// is always aligned 1:1 with the input; positions inside the warm-up window
/// are undefined. Calculation never fails: too little history simply yields
/// an all-undefined column.
pub trait Indicator {
    /// Column name of this indicator (e.g. "rsi", "sma_14").
    fn name(&self) -> &str;

    /// Minimum number of prices required to produce at least one defined value.
    fn required_points(&self) -> usize;

    fn calculate(&self, prices: &[f64]) -> IndicatorColumn;
}

/// Run `indicator` over `prices`, logging how much of the column is defined.
pub fn compute_column(indicator: &dyn Indicator, prices: &[f64]) -> IndicatorColumn {
    let column = indicator.calculate(prices);
    if column.is_all_undefined() {
        debug!(
            indicator = indicator.name(),
            available = prices.len(),
            required = indicator.required_points(),
            "insufficient history, column left undefined"
        );
    } else {
        debug!(
            indicator = indicator.name(),
            defined = column.defined_count(),
            total = column.len(),
            "indicator computed"
        );
    }
    column
}

/// A derived series aligned by position with its price series.
///
/// `None` marks an undefined position (warm-up window); defined values are
/// never NaN.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorColumn {
    values: Vec<Option<f64>>,
}

impl IndicatorColumn {
    /// Place `defined` at the tail of a column of `total_len` positions.
    pub fn aligned(total_len: usize, defined: Vec<f64>) -> Self {
        let offset = total_len.saturating_sub(defined.len());
        let mut values = vec![None; total_len];
        for (index, value) in defined.into_iter().enumerate().take(total_len) {
            values[offset + index] = Some(value);
        }
        Self { values }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().flatten().count()
    }

    pub fn is_all_undefined(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Most recent defined value, skipping trailing undefined positions.
    pub fn last_defined(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }

    /// Values from the first defined position onward.
    pub fn defined_suffix(&self) -> Vec<f64> {
        self.values
            .iter()
            .skip_while(|v| v.is_none())
            .flatten()
            .copied()
            .collect()
    }

    /// Element-wise combination, defined only where both inputs are.
    pub fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(f(*a, *b)),
                _ => None,
            })
            .collect();
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_pads_warm_up_with_undefined() {
        let column = IndicatorColumn::aligned(5, vec![1.0, 2.0]);
        assert_eq!(column.values(), &[None, None, None, Some(1.0), Some(2.0)]);
        assert_eq!(column.defined_count(), 2);
    }

    #[test]
    fn aligned_with_no_values_is_all_undefined() {
        let column = IndicatorColumn::aligned(3, Vec::new());
        assert!(column.is_all_undefined());
        assert_eq!(column.last_defined(), None);
    }

    #[test]
    fn empty_column_is_trivially_undefined() {
        let column = IndicatorColumn::aligned(0, Vec::new());
        assert!(column.is_empty());
        assert!(column.is_all_undefined());
    }

    #[test]
    fn last_defined_skips_trailing_undefined() {
        let column = IndicatorColumn {
            values: vec![None, Some(3.0), Some(4.0), None],
        };
        assert_eq!(column.last_defined(), Some(4.0));
    }

    #[test]
    fn zip_with_requires_both_defined() {
        let a = IndicatorColumn::aligned(4, vec![5.0, 6.0, 7.0]);
        let b = IndicatorColumn::aligned(4, vec![1.0, 1.0]);
        let diff = a.zip_with(&b, |x, y| x - y);
        assert_eq!(diff.values(), &[None, None, Some(5.0), Some(6.0)]);
    }
}
