use std::path::PathBuf;

use clap::Parser;

use penney_bench::config::{ResolvedOutputs, SimulationConfig};
use penney_bench::logging::init_logging;
use penney_bench::simulation::SimulationRunner;

/// Monte Carlo harness for Penney's Game.
#[derive(Debug, Parser)]
#[command(
    name = "penney-bench",
    author,
    version,
    about = "Deterministic Penney's Game deck simulator"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/penney.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of decks to simulate.
    #[arg(short = 'n', long, value_name = "DECKS")]
    decks: Option<usize>,

    /// Override the RNG seed for deck shuffling.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of decks evaluated per parallel batch.
    #[arg(long, value_name = "COUNT")]
    chunk_size: Option<usize>,

    /// Re-aggregate a stored per-deck log instead of simulating.
    #[arg(long, value_name = "FILE")]
    from_decks: Option<PathBuf>,

    /// Redraw the summary and heatmaps from a saved results.json.
    #[arg(long, value_name = "FILE", conflicts_with = "from_decks")]
    from_results: Option<PathBuf>,

    /// Re-evaluate every stored deck when re-aggregating.
    #[arg(long, requires = "from_decks")]
    verify: bool,

    /// Exit after validating the configuration (no decks are simulated).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimulationConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(decks) = cli.decks {
        config.decks.count = decks;
    }

    if let Some(seed) = cli.seed {
        config.decks.seed = Some(seed);
    }

    if let Some(chunk_size) = cli.chunk_size {
        config.decks.chunk_size = chunk_size;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let decks = config.decks.count;

    println!(
        "Loaded configuration '{run_id}' ({decks} deck{}, seed {})",
        if decks == 1 { "" } else { "s" },
        config.decks.seed.unwrap_or(0)
    );

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = SimulationRunner::new(config, outputs);

    let summary = match (cli.from_decks.as_deref(), cli.from_results.as_deref()) {
        (Some(path), _) => runner.reaggregate(path, cli.verify)?,
        (None, Some(path)) => runner.render_results(path)?,
        (None, None) => runner.run()?,
    };

    if cli.from_results.is_some() {
        println!(
            "Rendered stored results for '{run_id}': {} decks aggregated",
            summary.decks
        );
    } else {
        println!(
            "Simulation complete for '{run_id}': {} decks aggregated",
            summary.decks
        );
    }
    if let Some(path) = summary.decks_path.as_ref() {
        if summary.rows_written > 0 {
            println!("Deck log: {} ({} rows)", path.display(), summary.rows_written);
        } else {
            println!("Deck log (source): {}", path.display());
        }
    }
    println!("Results: {}", summary.results_path.display());
    println!("Summary table: {}", summary.summary_path.display());
    for plot_path in &summary.plot_paths {
        println!("Heatmap: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
