use chrono::{DateTime, Utc};

use crate::indicator::IndicatorColumn;
use crate::model::IndicatorToggles;
use crate::series::AugmentedSeries;
use crate::signal::{RSI_OVERBOUGHT, RSI_OVERSOLD};

pub const FIGURE_WIDTH: u32 = 1000;
pub const FIGURE_HEIGHT: u32 = 600;

const PRICE_COLOR: &str = "#228B22";
const SMA_COLOR: &str = "#93C572";
const EMA_COLOR: &str = "#ADEBB3";
const RSI_COLOR: &str = "#36454F";
const MACD_COLOR: &str = "#228B22";
const SIGNAL_COLOR: &str = "#36454F";
const OVERBOUGHT_COLOR: &str = "red";
const OVERSOLD_COLOR: &str = "green";

/// Position of a panel in the 2×2 figure grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSlot {
    /// Top half, full width.
    Top,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    pub color: &'static str,
    pub style: LineStyle,
    pub values: Vec<Option<f64>>,
}

/// Horizontal reference line across a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub slot: GridSlot,
    pub title: Option<String>,
    pub y_label: Option<String>,
    pub lines: Vec<Line>,
    pub guides: Vec<Guide>,
}

/// A renderable chart: panels laid out on a grid over one shared time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub times: Vec<DateTime<Utc>>,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn panel(&self, slot: GridSlot) -> Option<&Panel> {
        self.panels.iter().find(|p| p.slot == slot)
    }
}

/// Lay out the price panel plus the indicator panels enabled in `toggles`.
///
/// Panel presence follows the toggles alone; an enabled indicator whose
/// column is entirely undefined still gets its (empty) panel.
pub fn render(series: &AugmentedSeries<'_>, toggles: IndicatorToggles) -> Figure {
    let prices = series.prices();
    let indicators = series.indicators();
    let len = prices.len();
    let values_of = |column: &Option<IndicatorColumn>| -> Vec<Option<f64>> {
        column
            .as_ref()
            .map(|c| c.values().to_vec())
            .unwrap_or_else(|| vec![None; len])
    };

    let mut price_lines = vec![Line {
        label: "Price".into(),
        color: PRICE_COLOR,
        style: LineStyle::Solid,
        values: prices.points().iter().map(|p| Some(p.price)).collect(),
    }];
    if toggles.sma {
        price_lines.push(Line {
            label: "SMA 14".into(),
            color: SMA_COLOR,
            style: LineStyle::Dashed,
            values: values_of(&indicators.sma_14),
        });
        price_lines.push(Line {
            label: "EMA 14".into(),
            color: EMA_COLOR,
            style: LineStyle::Dotted,
            values: values_of(&indicators.ema_14),
        });
    }

    let mut panels = vec![Panel {
        slot: GridSlot::Top,
        title: Some("Crypto Price Chart".into()),
        y_label: None,
        lines: price_lines,
        guides: Vec::new(),
    }];

    if toggles.rsi {
        panels.push(Panel {
            slot: GridSlot::BottomLeft,
            title: None,
            y_label: Some("RSI".into()),
            lines: vec![Line {
                label: "RSI".into(),
                color: RSI_COLOR,
                style: LineStyle::Solid,
                values: values_of(&indicators.rsi),
            }],
            guides: vec![
                Guide {
                    value: RSI_OVERBOUGHT,
                    color: OVERBOUGHT_COLOR,
                },
                Guide {
                    value: RSI_OVERSOLD,
                    color: OVERSOLD_COLOR,
                },
            ],
        });
    }

    if toggles.macd {
        panels.push(Panel {
            slot: GridSlot::BottomRight,
            title: None,
            y_label: None,
            lines: vec![
                Line {
                    label: "MACD".into(),
                    color: MACD_COLOR,
                    style: LineStyle::Solid,
                    values: values_of(&indicators.macd),
                },
                Line {
                    label: "Signal".into(),
                    color: SIGNAL_COLOR,
                    style: LineStyle::Solid,
                    values: values_of(&indicators.signal),
                },
            ],
            guides: Vec::new(),
        });
    }

    Figure {
        width: FIGURE_WIDTH,
        height: FIGURE_HEIGHT,
        times: prices.times(),
        panels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::series_from_prices;
    use crate::pipeline::compute;

    #[test]
    fn price_panel_always_present() {
        let series = series_from_prices(&[1.0, 2.0, 3.0]);
        let computation = compute(&series, IndicatorToggles::none());
        let figure = render(&computation.series, IndicatorToggles::none());
        assert_eq!(figure.panels.len(), 1);
        let price = figure.panel(GridSlot::Top).unwrap();
        assert_eq!(price.lines.len(), 1);
        assert_eq!(price.lines[0].values, vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(figure.times.len(), 3);
    }

    #[test]
    fn sma_overlays_price_panel_without_new_panel() {
        let series = series_from_prices(&[1.0; 20]);
        let toggles = IndicatorToggles {
            sma: true,
            ..IndicatorToggles::none()
        };
        let computation = compute(&series, toggles);
        let figure = render(&computation.series, toggles);
        assert_eq!(figure.panels.len(), 1);
        let labels: Vec<_> = figure.panels[0].lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Price", "SMA 14", "EMA 14"]);
        assert_eq!(figure.panels[0].lines[1].style, LineStyle::Dashed);
        assert_eq!(figure.panels[0].lines[2].style, LineStyle::Dotted);
    }

    #[test]
    fn macd_alone_keeps_its_quadrant() {
        let series = series_from_prices(&[1.0, 2.0]);
        let toggles = IndicatorToggles {
            macd: true,
            ..IndicatorToggles::none()
        };
        let computation = compute(&series, toggles);
        let figure = render(&computation.series, toggles);
        assert!(figure.panel(GridSlot::BottomLeft).is_none());
        let macd = figure.panel(GridSlot::BottomRight).unwrap();
        // panel exists even though both lines are still warming up
        assert!(macd.lines.iter().all(|l| l.values.iter().all(Option::is_none)));
    }

    #[test]
    fn rsi_panel_has_threshold_guides() {
        let series = series_from_prices(&[1.0; 5]);
        let computation = compute(&series, IndicatorToggles::all());
        let figure = render(&computation.series, IndicatorToggles::all());
        assert_eq!(figure.panels.len(), 3);
        let rsi = figure.panel(GridSlot::BottomLeft).unwrap();
        let guides: Vec<f64> = rsi.guides.iter().map(|g| g.value).collect();
        assert_eq!(guides, vec![70.0, 30.0]);
        assert_eq!(rsi.y_label.as_deref(), Some("RSI"));
    }

    #[test]
    fn toggle_without_column_renders_undefined_line() {
        let series = series_from_prices(&[1.0, 2.0]);
        let computation = compute(&series, IndicatorToggles::none());
        let toggles = IndicatorToggles {
            rsi: true,
            ..IndicatorToggles::none()
        };
        let figure = render(&computation.series, toggles);
        let rsi = figure.panel(GridSlot::BottomLeft).unwrap();
        assert_eq!(rsi.lines[0].values, vec![None, None]);
    }
}
