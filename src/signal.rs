use std::fmt;

use crate::series::AugmentedSeries;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    RsiOverbought,
    RsiOversold,
    RsiNeutral,
    MacdBullish,
    MacdBearish,
    MacdNeutral,
    TrendUp,
    TrendDown,
}

impl SignalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RsiOverbought => "rsi_overbought",
            Self::RsiOversold => "rsi_oversold",
            Self::RsiNeutral => "rsi_neutral",
            Self::MacdBullish => "macd_bullish",
            Self::MacdBearish => "macd_bearish",
            Self::MacdNeutral => "macd_neutral",
            Self::TrendUp => "trend_up",
            Self::TrendDown => "trend_down",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classification of the latest indicator readings, with the values
/// behind it. `Display` renders the line shown in the alerts panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalMessage {
    RsiOverbought { rsi: f64 },
    RsiOversold { rsi: f64 },
    RsiNeutral { rsi: f64 },
    MacdBullish { macd: f64, signal: f64 },
    MacdBearish { macd: f64, signal: f64 },
    MacdNeutral { macd: f64, signal: f64 },
    TrendUp { price: f64, sma: f64 },
    TrendDown { price: f64, sma: f64 },
}

impl SignalMessage {
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::RsiOverbought { .. } => SignalKind::RsiOverbought,
            Self::RsiOversold { .. } => SignalKind::RsiOversold,
            Self::RsiNeutral { .. } => SignalKind::RsiNeutral,
            Self::MacdBullish { .. } => SignalKind::MacdBullish,
            Self::MacdBearish { .. } => SignalKind::MacdBearish,
            Self::MacdNeutral { .. } => SignalKind::MacdNeutral,
            Self::TrendUp { .. } => SignalKind::TrendUp,
            Self::TrendDown { .. } => SignalKind::TrendDown,
        }
    }
}

impl fmt::Display for SignalMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RsiOverbought { rsi } => {
                write!(f, "RSI is {rsi:.1} → Overbought (may suggest pullback)")
            }
            Self::RsiOversold { rsi } => {
                write!(f, "RSI is {rsi:.1} → Oversold (may suggest rebound)")
            }
            Self::RsiNeutral { rsi } => write!(f, "RSI is {rsi:.1} → Neutral"),
            Self::MacdBullish { .. } => write!(f, "MACD crossover → Bullish signal"),
            Self::MacdBearish { .. } => write!(f, "MACD crossover → Bearish signal"),
            Self::MacdNeutral { .. } => write!(f, "MACD and Signal lines are equal → Neutral"),
            Self::TrendUp { price, sma } => write!(
                f,
                "Price (${price:.2}) is above SMA-14 (${sma:.2}) → Uptrend"
            ),
            Self::TrendDown { price, sma } => write!(
                f,
                "Price (${price:.2}) is below SMA-14 (${sma:.2}) → Downtrend"
            ),
        }
    }
}

/// Classify the latest readings of every computed indicator.
///
/// Checks run in a fixed order (RSI, MACD, trend) and each contributes at
/// most one message. Columns that are missing or entirely undefined
/// contribute nothing.
pub fn classify(series: &AugmentedSeries<'_>) -> Vec<SignalMessage> {
    let indicators = series.indicators();
    let latest_price = series.prices().latest().map(|p| p.price);

    let rsi = indicators.rsi.as_ref().and_then(|c| c.last_defined());
    let macd = indicators.macd.as_ref().and_then(|c| c.last_defined());
    let signal = indicators.signal.as_ref().and_then(|c| c.last_defined());
    let sma = indicators.sma_14.as_ref().and_then(|c| c.last_defined());

    [
        rsi.map(classify_rsi),
        macd.zip(signal).map(|(m, s)| classify_macd(m, s)),
        latest_price.zip(sma).and_then(|(p, s)| classify_trend(p, s)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn classify_rsi(rsi: f64) -> SignalMessage {
    if rsi > RSI_OVERBOUGHT {
        SignalMessage::RsiOverbought { rsi }
    } else if rsi < RSI_OVERSOLD {
        SignalMessage::RsiOversold { rsi }
    } else {
        SignalMessage::RsiNeutral { rsi }
    }
}

pub fn classify_macd(macd: f64, signal: f64) -> SignalMessage {
    if macd > signal {
        SignalMessage::MacdBullish { macd, signal }
    } else if macd < signal {
        SignalMessage::MacdBearish { macd, signal }
    } else {
        SignalMessage::MacdNeutral { macd, signal }
    }
}

/// Unlike MACD there is no neutral trend message: a price sitting exactly
/// on its SMA yields nothing.
pub fn classify_trend(price: f64, sma: f64) -> Option<SignalMessage> {
    if price > sma {
        Some(SignalMessage::TrendUp { price, sma })
    } else if price < sma {
        Some(SignalMessage::TrendDown { price, sma })
    } else {
        None
    }
}
