use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use error_stack::Report;
use serde::Deserialize;

use crate::error::SeriesError;

/// Lookback window offered by the dashboard.
///
/// String representations match the config file and CLI format (e.g. `"1M"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    Day1,
    #[serde(rename = "1W")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
    #[serde(rename = "6M")]
    Month6,
    #[serde(rename = "1Y")]
    Year1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Self::Day1,
        Self::Week1,
        Self::Month1,
        Self::Month6,
        Self::Year1,
    ];

    /// Parse a config-format string into a `Timeframe`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1D" => Some(Self::Day1),
            "1W" => Some(Self::Week1),
            "1M" => Some(Self::Month1),
            "6M" => Some(Self::Month6),
            "1Y" => Some(Self::Year1),
            _ => None,
        }
    }

    /// Return the config-format string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day1 => "1D",
            Self::Week1 => "1W",
            Self::Month1 => "1M",
            Self::Month6 => "6M",
            Self::Year1 => "1Y",
        }
    }

    /// Number of days of history requested from the provider.
    pub fn days(self) -> u32 {
        match self {
            Self::Day1 => 1,
            Self::Week1 => 7,
            Self::Month1 => 30,
            Self::Month6 => 180,
            Self::Year1 => 365,
        }
    }

    /// Windows of a week or less are sampled hourly, longer ones daily.
    pub fn interval(self) -> SampleInterval {
        if self.days() <= 7 {
            SampleInterval::Hourly
        } else {
            SampleInterval::Daily
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleInterval {
    Hourly,
    Daily,
}

impl SampleInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

/// Time-ordered price observations for one coin.
///
/// Timestamps are strictly increasing and every price is finite; both are
/// checked once in [`PriceSeries::new`] and the series is read-only after.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, Report<SeriesError>> {
        for (index, point) in points.iter().enumerate() {
            if !point.price.is_finite() {
                return Err(Report::new(SeriesError::NonFinitePrice { index }));
            }
            if index > 0 && points[index - 1].time >= point.time {
                return Err(
                    Report::new(SeriesError::Unordered { index }).attach(format!(
                        "previous: {}, current: {}",
                        points[index - 1].time,
                        point.time
                    )),
                );
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.time).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Indicator families the user can switch on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum IndicatorFamily {
    Rsi,
    Macd,
    Sma,
}

/// Which indicators are computed, classified and charted on a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct IndicatorToggles {
    #[serde(default)]
    pub rsi: bool,
    #[serde(default)]
    pub macd: bool,
    #[serde(default)]
    pub sma: bool,
}

impl IndicatorToggles {
    pub fn all() -> Self {
        Self {
            rsi: true,
            macd: true,
            sma: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_families(families: &[IndicatorFamily]) -> Self {
        Self {
            rsi: families.contains(&IndicatorFamily::Rsi),
            macd: families.contains(&IndicatorFamily::Macd),
            sma: families.contains(&IndicatorFamily::Sma),
        }
    }

    pub fn any(self) -> bool {
        self.rsi || self.macd || self.sma
    }
}
