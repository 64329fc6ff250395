use chrono::{DateTime, Utc};

use crate::chart::{Figure, GridSlot, LineStyle, Panel};

const OUTER_MARGIN: f64 = 20.0;
const LEFT_MARGIN: f64 = 70.0;
const TITLE_SPACE: f64 = 24.0;
const AXIS_SPACE: f64 = 26.0;
const COLUMN_GAP: f64 = 70.0;
const FONT: &str = "font-family=\"sans-serif\" font-size=\"11\"";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Pixel rectangle of a grid slot: price on the top half, indicators in the
/// bottom quadrants.
fn slot_rect(slot: GridSlot, width: f64, height: f64) -> Rect {
    let half = height / 2.0;
    let plot_width = width - LEFT_MARGIN - OUTER_MARGIN;
    let column_width = (plot_width - COLUMN_GAP) / 2.0;
    let (x, y, w) = match slot {
        GridSlot::Top => (LEFT_MARGIN, 0.0, plot_width),
        GridSlot::BottomLeft => (LEFT_MARGIN, half, column_width),
        GridSlot::BottomRight => (LEFT_MARGIN + column_width + COLUMN_GAP, half, column_width),
    };
    Rect {
        x,
        y: y + TITLE_SPACE,
        width: w,
        height: half - TITLE_SPACE - AXIS_SPACE,
    }
}

/// Maps timestamps onto the horizontal extent of a panel.
struct TimeAxis {
    start: i64,
    span: i64,
}

impl TimeAxis {
    fn new(times: &[DateTime<Utc>]) -> Self {
        let start = times.first().map(|t| t.timestamp_millis()).unwrap_or(0);
        let end = times.last().map(|t| t.timestamp_millis()).unwrap_or(0);
        Self {
            start,
            span: end - start,
        }
    }

    fn x(&self, rect: Rect, time: DateTime<Utc>) -> f64 {
        if self.span <= 0 {
            return rect.x + rect.width / 2.0;
        }
        let fraction = (time.timestamp_millis() - self.start) as f64 / self.span as f64;
        rect.x + fraction * rect.width
    }
}

/// Defined value range of a panel including its guides, padded by 5%.
fn value_range(panel: &Panel) -> (f64, f64) {
    let values = panel
        .lines
        .iter()
        .flat_map(|l| l.values.iter().flatten().copied())
        .chain(panel.guides.iter().map(|g| g.value));

    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        return (min - pad, max + pad);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn y_of(rect: Rect, (lo, hi): (f64, f64), value: f64) -> f64 {
    rect.y + rect.height - (value - lo) / (hi - lo) * rect.height
}

fn dash_array(style: LineStyle) -> &'static str {
    match style {
        LineStyle::Solid => "",
        LineStyle::Dashed => " stroke-dasharray=\"6 4\"",
        LineStyle::Dotted => " stroke-dasharray=\"2 3\"",
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn time_label(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Render `figure` as a standalone SVG document.
pub fn render_svg(figure: &Figure) -> String {
    let width = f64::from(figure.width);
    let height = f64::from(figure.height);
    let axis = TimeAxis::new(&figure.times);

    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n",
        figure.width, figure.height, figure.width, figure.height
    );
    out.push_str(&format!(
        "<rect width=\"{width}\" height=\"{height}\" fill=\"white\"/>\n"
    ));

    for panel in &figure.panels {
        render_panel(&mut out, panel, &axis, &figure.times, width, height);
    }

    out.push_str("</svg>\n");
    out
}

fn render_panel(
    out: &mut String,
    panel: &Panel,
    axis: &TimeAxis,
    times: &[DateTime<Utc>],
    width: f64,
    height: f64,
) {
    let rect = slot_rect(panel.slot, width, height);
    let range = value_range(panel);

    out.push_str(&format!(
        "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"#cccccc\"/>\n",
        rect.x, rect.y, rect.width, rect.height
    ));

    if let Some(title) = &panel.title {
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" {FONT} font-weight=\"bold\">{}</text>\n",
            rect.x + rect.width / 2.0,
            rect.y - 8.0,
            escape(title)
        ));
    }
    if let Some(label) = &panel.y_label {
        let (x, y) = (rect.x - 50.0, rect.y + rect.height / 2.0);
        out.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 {x:.1} {y:.1})\" {FONT}>{}</text>\n",
            escape(label)
        ));
    }

    // value axis extremes
    for value in [range.0, range.1] {
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" {FONT}>{:.2}</text>\n",
            rect.x - 4.0,
            y_of(rect, range, value) + 4.0,
            value
        ));
    }
    // shared time axis extremes
    if let (Some(first), Some(last)) = (times.first(), times.last()) {
        let y = rect.y + rect.height + 16.0;
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{y:.1}\" text-anchor=\"start\" {FONT}>{}</text>\n",
            rect.x,
            time_label(*first)
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{y:.1}\" text-anchor=\"end\" {FONT}>{}</text>\n",
            rect.x + rect.width,
            time_label(*last)
        ));
    }

    for guide in &panel.guides {
        let y = y_of(rect, range, guide.value);
        out.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{}\" stroke-opacity=\"0.3\" stroke-dasharray=\"6 4\"/>\n",
            rect.x,
            rect.x + rect.width,
            guide.color
        ));
    }

    for line in &panel.lines {
        for segment in defined_segments(&line.values) {
            let points: Vec<(f64, f64)> = segment
                .iter()
                .map(|&(i, v)| (axis.x(rect, times[i]), y_of(rect, range, v)))
                .collect();
            if let [(x, y)] = points[..] {
                out.push_str(&format!(
                    "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"1.5\" fill=\"{}\"/>\n",
                    line.color
                ));
                continue;
            }
            let coords: Vec<String> = points
                .iter()
                .map(|(x, y)| format!("{x:.1},{y:.1}"))
                .collect();
            out.push_str(&format!(
                "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"{}/>\n",
                coords.join(" "),
                line.color,
                dash_array(line.style)
            ));
        }
    }

    // legend, top-left inside the panel
    for (row, line) in panel.lines.iter().enumerate() {
        let y = rect.y + 14.0 + row as f64 * 14.0;
        out.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"{}/>\n",
            rect.x + 8.0,
            y - 4.0,
            rect.x + 28.0,
            y - 4.0,
            line.color,
            dash_array(line.style)
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{y:.1}\" {FONT}>{}</text>\n",
            rect.x + 32.0,
            escape(&line.label)
        ));
    }
}

/// Split a column into runs of consecutive defined values, keeping indices.
fn defined_segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (index, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((index, *v)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
