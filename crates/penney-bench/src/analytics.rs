use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use penney_core::game::aggregate::Probabilities;
use penney_core::model::matrix::{Matrix, Rule};
use penney_core::model::sequence::{SEQUENCE_COUNT, Sequence, SequencePair};
use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

const CONFIDENCE: f64 = 0.95;
const HEATMAP_CELL_PX: u32 = 64;
const DIAGONAL_FILL: RGBColor = RGBColor(0xDB, 0xDB, 0xDB);
const SCALE_LOW: (f64, f64, f64) = (247.0, 251.0, 255.0);
const SCALE_HIGH: (f64, f64, f64) = (8.0, 48.0, 107.0);

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("statistics setup failed: {0}")]
    Stats(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Display-ready view of one run's probabilities.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run_id: String,
    pub n: u64,
    pub rules: Vec<RuleReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub rule: Rule,
    /// Whole-number win percentages; `None` on self-play cells.
    pub win_percent: Matrix<Option<f64>>,
    pub tie_percent: Matrix<Option<f64>>,
    pub best_responses: Vec<BestResponse>,
}

/// The strongest reply to an opponent's sequence under one rule.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BestResponse {
    pub opponent: Sequence,
    pub response: Sequence,
    pub win_probability: f64,
    pub tie_probability: f64,
    pub ci95: (f64, f64),
}

impl Report {
    pub fn build(run_id: &str, probabilities: &Probabilities) -> Result<Self, AnalyticsError> {
        let z = critical_value(CONFIDENCE)?;
        let rules = Rule::ALL
            .iter()
            .map(|&rule| RuleReport {
                rule,
                win_percent: probabilities.percentages(rule.win()),
                tie_percent: probabilities.percentages(rule.tie()),
                best_responses: best_responses(probabilities, rule, z),
            })
            .collect();

        Ok(Self {
            run_id: run_id.to_string(),
            n: probabilities.n,
            rules,
        })
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Penney's Game Summary: {}\n", self.run_id);
        let _ = writeln!(out, "Decks simulated: {}\n", self.n);
        let _ = writeln!(
            out,
            "Cells read `win (tie)` in percent for the column player (\"me\") against the row player (\"opponent\").\n"
        );

        for report in &self.rules {
            let _ = writeln!(out, "## {} (n={})\n", report.rule.label(), self.n);
            out.push_str("| Opponent \\ Me |");
            for sequence in Sequence::ALL {
                let _ = write!(out, " {sequence} |");
            }
            out.push('\n');
            out.push_str("|---|");
            out.push_str(&"---|".repeat(SEQUENCE_COUNT));
            out.push('\n');

            let annotations = report.annotations();
            for (opponent, row) in Sequence::ALL.iter().zip(annotations.iter()) {
                let _ = write!(out, "| {opponent} |");
                for cell in row {
                    let text = if cell.is_empty() { "n/a" } else { cell.as_str() };
                    let _ = write!(out, " {text} |");
                }
                out.push('\n');
            }

            out.push_str("\n| Opponent | Best response | Win % | Tie % | 95% CI |\n");
            out.push_str("|----------|---------------|-------|-------|--------|\n");
            for best in &report.best_responses {
                let _ = writeln!(
                    out,
                    "| {opponent} | {response} | {win:.1}% | {tie:.1}% | [{low:.1}, {high:.1}] |",
                    opponent = best.opponent,
                    response = best.response,
                    win = best.win_probability * 100.0,
                    tie = best.tie_probability * 100.0,
                    low = best.ci95.0 * 100.0,
                    high = best.ci95.1 * 100.0,
                );
            }
            out.push('\n');
        }
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating summary directory",
                source: e,
            })?;
        }
        fs::write(path, self.to_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })
    }

    /// One PNG per rule, cells shaded by win percentage, self-play cells grey.
    ///
    /// The images carry no text: plotters is built without a font backend,
    /// so the "win (tie)" labels, axis names and `n` live in the markdown
    /// summary next to them.
    pub fn render_heatmaps(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let mut paths = Vec::with_capacity(self.rules.len());
        for report in &self.rules {
            let path = dir.join(format!(
                "{}_heatmap.png",
                report.rule.label().to_ascii_lowercase()
            ));
            render_heatmap(&path, &report.win_percent)?;
            paths.push(path);
        }
        Ok(paths)
    }
}

impl RuleReport {
    /// `"win (tie)"` labels; self-play cells are empty strings.
    pub fn annotations(&self) -> Vec<Vec<String>> {
        (0..SEQUENCE_COUNT)
            .map(|row| {
                (0..SEQUENCE_COUNT)
                    .map(|column| {
                        match (
                            self.win_percent.at(row, column),
                            self.tie_percent.at(row, column),
                        ) {
                            (Some(win), Some(tie)) => format!("{win:.0} ({tie:.0})"),
                            _ => String::new(),
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

fn critical_value(confidence: f64) -> Result<f64, AnalyticsError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::Stats(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - confidence) / 2.0))
}

fn best_responses(probabilities: &Probabilities, rule: Rule, z: f64) -> Vec<BestResponse> {
    let wins = probabilities.matrix(rule.win());
    let ties = probabilities.matrix(rule.tie());
    Sequence::ALL
        .iter()
        .filter_map(|&opponent| {
            Sequence::ALL
                .iter()
                .filter_map(|&response| {
                    let pair = SequencePair::new(opponent, response);
                    Some((response, wins.get(pair)?, ties.get(pair)?))
                })
                .max_by(|a, b| a.1.total_cmp(&b.1).then(a.2.total_cmp(&b.2)))
                .map(|(response, win, tie)| BestResponse {
                    opponent,
                    response,
                    win_probability: win,
                    tie_probability: tie,
                    ci95: wilson_interval(win, probabilities.n, z),
                })
        })
        .collect()
}

/// Wilson score interval for a binomial proportion.
fn wilson_interval(p: f64, n: u64, z: f64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 1.0);
    }
    let n = n as f64;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denom;
    let margin = z * ((p * (1.0 - p) / n) + z2 / (4.0 * n * n)).sqrt() / denom;
    ((centre - margin).max(0.0), (centre + margin).min(1.0))
}

fn shade(percent: f64) -> RGBColor {
    let t = (percent / 100.0).clamp(0.0, 1.0);
    let lerp = |low: f64, high: f64| (low + (high - low) * t).round() as u8;
    RGBColor(
        lerp(SCALE_LOW.0, SCALE_HIGH.0),
        lerp(SCALE_LOW.1, SCALE_HIGH.1),
        lerp(SCALE_LOW.2, SCALE_HIGH.2),
    )
}

fn render_heatmap(path: &Path, percent: &Matrix<Option<f64>>) -> Result<(), AnalyticsError> {
    let output_path = path.to_path_buf();
    let cells = *percent;
    let side = HEATMAP_CELL_PX * SEQUENCE_COUNT as u32;

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));

    let plot_attempt = std::panic::catch_unwind(move || {
        let root = BitMapBackend::new(&output_path, (side, side)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

        let areas = root.split_evenly((SEQUENCE_COUNT, SEQUENCE_COUNT));
        for (idx, area) in areas.iter().enumerate() {
            let (row, column) = (idx / SEQUENCE_COUNT, idx % SEQUENCE_COUNT);
            let fill = cells.at(row, column).map(shade).unwrap_or(DIAGONAL_FILL);
            area.fill(&fill)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;
        }

        root.present()
            .map_err(|e| AnalyticsError::Plot(e.to_string()))?;
        Ok(())
    });

    std::panic::set_hook(prev_hook);

    match plot_attempt {
        Ok(result) => result,
        Err(_) => Err(AnalyticsError::Plot(
            "plotters panicked while rendering heatmap".into(),
        )),
    }
}
