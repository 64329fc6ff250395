use error_stack::Report;
use tracing::{debug, info, warn};

use crate::chart::{self, Figure};
use crate::error::FetchError;
use crate::market_data::MarketData;
use crate::model::{IndicatorToggles, Timeframe};
use crate::pipeline::compute;
use crate::signal::SignalMessage;

/// Shown in the alerts panel when a refresh produced no signal.
pub const NO_SIGNALS_PLACEHOLDER: &str = "No indicator signals generated.";

/// User choices feeding one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub toggles: IndicatorToggles,
}

/// What the dashboard displays after a refresh.
///
/// `figure` is `None` when the refresh failed; `alerts` then holds the error.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshView {
    pub figure: Option<Figure>,
    pub alerts: String,
}

/// Run one fetch → compute → classify → render cycle.
///
/// Every failure is caught here and turned into alert text; nothing
/// propagates past the refresh boundary.
pub async fn refresh(source: &dyn MarketData, selection: &Selection) -> RefreshView {
    match run_refresh(source, selection).await {
        Ok((figure, messages)) => RefreshView {
            figure: Some(figure),
            alerts: alerts_text(&messages),
        },
        Err(report) => {
            warn!(error = ?report, symbol = %selection.symbol, "refresh failed");
            RefreshView {
                figure: None,
                alerts: format!("Error: {report}"),
            }
        }
    }
}

async fn run_refresh(
    source: &dyn MarketData,
    selection: &Selection,
) -> Result<(Figure, Vec<SignalMessage>), Report<FetchError>> {
    info!(
        provider = source.name(),
        symbol = %selection.symbol,
        timeframe = %selection.timeframe,
        rsi = selection.toggles.rsi,
        macd = selection.toggles.macd,
        sma = selection.toggles.sma,
        "refresh started"
    );

    if !selection.toggles.any() {
        debug!("no indicators selected, rendering price only");
    }

    let coin_id = source.resolve_symbol(&selection.symbol).await?;
    let series = source.fetch_series(&coin_id, selection.timeframe).await?;

    let computation = compute(&series, selection.toggles);
    let figure = chart::render(&computation.series, selection.toggles);

    for message in &computation.messages {
        info!(kind = %message.kind(), "{message}");
    }
    info!(
        coin_id = %coin_id,
        points = series.len(),
        signals = computation.messages.len(),
        "refresh complete"
    );

    Ok((figure, computation.messages))
}

/// One line per message, or the placeholder when there are none.
pub fn alerts_text(messages: &[SignalMessage]) -> String {
    if messages.is_empty() {
        return NO_SIGNALS_PLACEHOLDER.to_owned();
    }
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
