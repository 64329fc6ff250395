pub mod svg;

use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};
use tracing::info;

use crate::chart::Figure;
use crate::error::ExportError;

/// Appended to the figure's file stem to name the alert summary.
pub const SUMMARY_SUFFIX: &str = "_summary.txt";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    pub figure: PathBuf,
    pub summary: Option<PathBuf>,
}

/// `charts/btc.svg` → `charts/btc_summary.txt`
pub fn summary_path(figure_path: &Path) -> PathBuf {
    let stem = figure_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    figure_path.with_file_name(format!("{stem}{SUMMARY_SUFFIX}"))
}

/// Write `figure` as SVG to `path` and, when `alerts` is non-empty, the
/// alert text to the companion summary file.
pub fn export(
    path: &Path,
    figure: &Figure,
    alerts: &str,
) -> Result<ExportedFiles, Report<ExportError>> {
    std::fs::write(path, svg::render_svg(figure))
        .change_context(ExportError::Figure)
        .attach_with(|| format!("path: {}", path.display()))?;

    let summary = if alerts.is_empty() {
        None
    } else {
        let summary = summary_path(path);
        std::fs::write(&summary, alerts)
            .change_context(ExportError::Summary)
            .attach_with(|| format!("path: {}", summary.display()))?;
        Some(summary)
    };

    info!(
        figure = %path.display(),
        summary = ?summary.as_ref().map(|p| p.display().to_string()),
        "report exported"
    );

    Ok(ExportedFiles {
        figure: path.to_path_buf(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::render;
    use crate::model::IndicatorToggles;
    use crate::model::tests::series_from_prices;
    use crate::pipeline::compute;
    use tempfile::tempdir;

    fn sample_figure() -> Figure {
        let series = series_from_prices(&[100.0, 101.0, 103.0, 102.0]);
        let computation = compute(&series, IndicatorToggles::all());
        render(&computation.series, IndicatorToggles::all())
    }

    #[test]
    fn summary_path_shares_base_name() {
        assert_eq!(
            summary_path(Path::new("out/report.svg")),
            PathBuf::from("out/report_summary.txt")
        );
        assert_eq!(
            summary_path(Path::new("report")),
            PathBuf::from("report_summary.txt")
        );
    }

    #[test]
    fn export_writes_figure_and_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("btc.svg");
        let files = export(&path, &sample_figure(), "RSI is 50.0 → Neutral").unwrap();

        let svg = std::fs::read_to_string(&files.figure).unwrap();
        assert!(svg.starts_with("<svg"));
        let summary = files.summary.unwrap();
        assert_eq!(summary, dir.path().join("btc_summary.txt"));
        assert_eq!(
            std::fs::read_to_string(summary).unwrap(),
            "RSI is 50.0 → Neutral"
        );
    }

    #[test]
    fn export_skips_summary_without_alerts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eth.svg");
        let files = export(&path, &sample_figure(), "").unwrap();
        assert!(files.summary.is_none());
        assert!(!dir.path().join("eth_summary.txt").exists());
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.svg");
        let err = export(&path, &sample_figure(), "x").unwrap_err();
        assert!(matches!(err.current_context(), ExportError::Figure));
    }
}
