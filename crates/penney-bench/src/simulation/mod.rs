pub mod storage;

use std::path::{Path, PathBuf};
use std::time::Instant;

use penney_core::PenneyError;
use penney_core::game::aggregate::{Aggregate, Probabilities};
use penney_core::game::evaluator::{DeckOutcomes, evaluate};
use penney_core::game::serialization::DeckRecord;
use penney_core::model::deck::Deck;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analytics::{AnalyticsError, Report};
use crate::config::{ResolvedOutputs, SimulationConfig};
use crate::logging::TELEMETRY_FILE;
use storage::{DeckLogWriter, StorageError};

/// Primary entry point for running a batch of simulated decks.
pub struct SimulationRunner {
    config: SimulationConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub decks: u64,
    pub rows_written: usize,
    pub decks_path: Option<PathBuf>,
    pub results_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_paths: Vec<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
    pub probabilities: Probabilities,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Shuffle, evaluate and persist every deck, then publish the results.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        let started = Instant::now();
        let decks = &self.config.decks;
        info!(
            run_id = %self.config.run_id,
            decks = decks.count,
            seed = decks.seed.unwrap_or(0),
            "simulation started"
        );

        let mut writer = DeckLogWriter::create(&self.outputs.decks_jsonl)?;
        let mut rng = StdRng::seed_from_u64(decks.seed.unwrap_or(0));
        let mut aggregate = Aggregate::new();
        let mut next_index = 0u64;
        let mut remaining = decks.count;

        while remaining > 0 {
            let chunk_len = remaining.min(decks.chunk_size);
            let seeds = draw_seeds(&mut rng, chunk_len);
            for (seed, deck, outcomes) in evaluate_chunk(&seeds) {
                writer.append(&DeckRecord::capture(next_index, seed, &deck, &outcomes))?;
                aggregate.fold(&outcomes);
                next_index += 1;
            }
            remaining -= chunk_len;
            debug!(
                run_id = %self.config.run_id,
                evaluated = next_index,
                remaining = remaining as u64,
                "chunk folded"
            );
        }

        let rows_written = writer.finish()?;
        info!(
            run_id = %self.config.run_id,
            decks = aggregate.decks(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "simulation finished"
        );

        self.publish(aggregate, rows_written, Some(self.outputs.decks_jsonl.clone()))
    }

    /// Rebuild results from a previously stored deck log instead of simulating.
    pub fn reaggregate(&self, deck_log: &Path, verify: bool) -> Result<RunSummary, RunnerError> {
        info!(
            run_id = %self.config.run_id,
            path = %deck_log.display(),
            verify,
            "re-aggregating stored decks"
        );
        let aggregate = storage::aggregate_deck_log(deck_log, verify)?;
        self.publish(aggregate, 0, Some(deck_log.to_path_buf()))
    }

    /// Redraw the summary and heatmaps from a saved `results.json`.
    ///
    /// The record is left in place; no decks are read or evaluated.
    pub fn render_results(&self, results: &Path) -> Result<RunSummary, RunnerError> {
        info!(
            run_id = %self.config.run_id,
            path = %results.display(),
            "rendering stored results"
        );
        let probabilities = storage::read_results(results)?.restore();
        self.present(probabilities, 0, None, results.to_path_buf())
    }

    fn publish(
        &self,
        aggregate: Aggregate,
        rows_written: usize,
        decks_path: Option<PathBuf>,
    ) -> Result<RunSummary, RunnerError> {
        let probabilities = aggregate.finalize()?;
        storage::write_results(&self.outputs.results_json, &probabilities)?;
        self.present(
            probabilities,
            rows_written,
            decks_path,
            self.outputs.results_json.clone(),
        )
    }

    fn present(
        &self,
        probabilities: Probabilities,
        rows_written: usize,
        decks_path: Option<PathBuf>,
        results_path: PathBuf,
    ) -> Result<RunSummary, RunnerError> {
        let report = Report::build(&self.config.run_id, &probabilities)?;
        report.write_markdown(&self.outputs.summary_md)?;

        let plot_paths = match report.render_heatmaps(&self.outputs.plots_dir) {
            Ok(paths) => paths,
            Err(err) => {
                warn!(run_id = %self.config.run_id, error = %err, "heatmap rendering skipped");
                Vec::new()
            }
        };

        let telemetry_path = self
            .config
            .logging
            .enable_structured
            .then(|| self.outputs.report_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            decks: probabilities.n,
            rows_written,
            decks_path,
            results_path,
            summary_path: self.outputs.summary_md.clone(),
            plot_paths,
            telemetry_path,
            probabilities,
        })
    }
}

/// Per-deck seeds are drawn sequentially so results do not depend on how
/// decks are spread across worker threads.
fn draw_seeds(rng: &mut StdRng, count: usize) -> Vec<u64> {
    (0..count).map(|_| rng.next_u64()).collect()
}

fn evaluate_chunk(seeds: &[u64]) -> Vec<(u64, Deck, DeckOutcomes)> {
    seeds
        .par_iter()
        .map(|&seed| {
            let deck = Deck::shuffled_with_seed(seed);
            let outcomes = evaluate(&deck);
            (seed, deck, outcomes)
        })
        .collect()
}

/// Evaluate `count` decks without persisting them, folding per worker and
/// merging the partial aggregates.
pub fn simulate_aggregate(seed: u64, count: usize) -> Aggregate {
    let mut rng = StdRng::seed_from_u64(seed);
    draw_seeds(&mut rng, count)
        .into_par_iter()
        .fold(Aggregate::new, |mut aggregate, seed| {
            aggregate.fold(&evaluate(&Deck::shuffled_with_seed(seed)));
            aggregate
        })
        .reduce(Aggregate::new, |mut left, right| {
            left.merge(&right);
            left
        })
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("aggregation failed: {0}")]
    Aggregate(#[from] PenneyError),
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeckConfig, LoggingConfig, OutputsConfig};
    use tempfile::tempdir;

    fn config(dir: &Path, count: usize, chunk_size: usize) -> SimulationConfig {
        let path = |name: &str| dir.join(name).display().to_string();
        SimulationConfig {
            run_id: "unit".to_string(),
            decks: DeckConfig {
                seed: Some(99),
                count,
                chunk_size,
            },
            outputs: OutputsConfig {
                decks_jsonl: path("decks.jsonl"),
                results_json: path("results.json"),
                summary_md: path("summary.md"),
                plots_dir: path("plots"),
            },
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn chunking_does_not_change_results() {
        let dir_a = tempdir().expect("temp dir");
        let dir_b = tempdir().expect("temp dir");
        let cfg_a = config(dir_a.path(), 7, 2);
        let cfg_b = config(dir_b.path(), 7, 64);

        let a = SimulationRunner::new(cfg_a.clone(), cfg_a.resolved_outputs())
            .run()
            .expect("run a");
        let b = SimulationRunner::new(cfg_b.clone(), cfg_b.resolved_outputs())
            .run()
            .expect("run b");

        assert_eq!(a.decks, 7);
        assert_eq!(a.rows_written, 7);
        assert_eq!(a.probabilities, b.probabilities);
    }

    #[test]
    fn parallel_fold_matches_persisted_run() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), 5, 3);
        let summary = SimulationRunner::new(cfg.clone(), cfg.resolved_outputs())
            .run()
            .expect("run");

        let merged = simulate_aggregate(99, 5).finalize().expect("finalize");
        assert_eq!(merged, summary.probabilities);
    }

    #[test]
    fn reaggregate_reproduces_results() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), 4, 4);
        let runner = SimulationRunner::new(cfg.clone(), cfg.resolved_outputs());
        let first = runner.run().expect("run");
        let deck_log = first.decks_path.clone().expect("deck log");

        let second = runner.reaggregate(&deck_log, true).expect("reaggregate");
        assert_eq!(second.probabilities, first.probabilities);
        assert_eq!(second.rows_written, 0);
    }

    #[test]
    fn stored_results_render_without_decks() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), 3, 2);
        let first = SimulationRunner::new(cfg.clone(), cfg.resolved_outputs())
            .run()
            .expect("run");

        let redraw_dir = dir.path().join("redraw");
        let redraw_cfg = config(&redraw_dir, 3, 2);
        let summary = SimulationRunner::new(redraw_cfg.clone(), redraw_cfg.resolved_outputs())
            .render_results(&first.results_path)
            .expect("render");

        assert_eq!(summary.probabilities, first.probabilities);
        assert_eq!(summary.decks, 3);
        assert!(summary.decks_path.is_none());
        assert_eq!(summary.results_path, first.results_path);
        assert!(summary.summary_path.starts_with(&redraw_dir));
        assert!(summary.summary_path.exists());
        assert!(!redraw_dir.join("results.json").exists());
    }

    #[test]
    fn empty_deck_log_surfaces_empty_aggregate() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), 1, 1);
        let empty = dir.path().join("empty.jsonl");
        std::fs::write(&empty, "").expect("write");

        let runner = SimulationRunner::new(cfg.clone(), cfg.resolved_outputs());
        assert!(matches!(
            runner.reaggregate(&empty, false),
            Err(RunnerError::Aggregate(PenneyError::EmptyAggregate))
        ));
    }
}
