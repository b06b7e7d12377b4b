use crate::analysis::{CommandEngine, TopProducts};
use crate::config::{BenchConfig, EngineKind};
use crate::dataset::verify_dataset;
use crate::errors::BenchError;
use crate::generator::generate;
use crate::harness::{AnalysisEngine, Harness};
use crate::report::{self, SvgPlot, Visualizer};

use super::command::Command;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

/// Build the analysis collaborator selected by `cfg`.
///
/// # Errors
/// Returns `BenchError::Config` for a command engine without a command.
pub fn build_engine(cfg: &BenchConfig) -> Result<Box<dyn AnalysisEngine>, BenchError> {
    let engine: Box<dyn AnalysisEngine> = match cfg.engine {
        EngineKind::Local => Box::new(TopProducts::new(&cfg.output_dir)),
        EngineKind::Command => Box::new(CommandEngine::new(cfg.command.clone(), &cfg.output_dir)?),
    };
    Ok(engine)
}

/// Run a command with human-readable output.
///
/// # Errors
/// Propagates any failure of the command.
pub fn run(cmd: Command) -> Result<(), Box<dyn std::error::Error>> {
    run_with_format(cmd, OutputMode::Human)
}

/// # Errors
/// Propagates any failure of the command.
pub fn run_with_format(cmd: Command, mode: OutputMode) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::Generate { path, rows, chunk_size, seed } => {
            let rep = generate(&path, rows, chunk_size, seed)?;
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "action": "generated",
                        "path": rep.path,
                        "rows": rep.rows_written,
                        "chunks": rep.chunk_sizes.len(),
                    });
                    println!("{json}");
                }
                OutputMode::Plain => println!("{} {}", rep.path.display(), rep.rows_written),
                OutputMode::Human => println!(
                    "Dataset generated at {} ({} rows in {} chunks)",
                    rep.path.display(),
                    rep.rows_written,
                    rep.chunk_sizes.len()
                ),
            }
            Ok(())
        }
        Command::Verify { path } => {
            let summary = verify_dataset(&path)?;
            match mode {
                OutputMode::Json => println!("{}", serde_json::to_string(&summary)?),
                OutputMode::Plain => println!("ok {}", summary.rows),
                OutputMode::Human => println!(
                    "{}: ok, {} rows, ts {} .. {}",
                    path.display(),
                    summary.rows,
                    summary.min_ts.map(|t| t.to_string()).unwrap_or_default(),
                    summary.max_ts.map(|t| t.to_string()).unwrap_or_default()
                ),
            }
            Ok(())
        }
        Command::Run { config } => run_sweep(&config, mode),
        Command::ShowConfig { config } => {
            match mode {
                OutputMode::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputMode::Plain | OutputMode::Human => print!("{}", toml::to_string(&config)?),
            }
            Ok(())
        }
    }
}

fn run_sweep(cfg: &BenchConfig, mode: OutputMode) -> Result<(), Box<dyn std::error::Error>> {
    cfg.validate()?;
    let mut engine = build_engine(cfg)?;
    let harness = Harness::new(cfg.harness_options());
    let outcome = harness.run(&cfg.dataset_sizes, &cfg.partitions, engine.as_mut());
    let (results, failure) = match outcome {
        Ok(results) => (results, None),
        Err(e) => (e.completed, Some(e.source)),
    };
    let table = report::aggregate(&results);
    // partial results are still written before the failure is reported
    report::persist(&table, &cfg.results_file)?;
    if let Some(source) = failure {
        log::error!("sweep aborted: {source}");
        return Err(source.into());
    }
    let plot = SvgPlot::default();
    let plotted = match &cfg.plot_file {
        Some(p) => report::visualize(&table, p, Some(&plot as &dyn Visualizer)),
        None => false,
    };
    match mode {
        OutputMode::Json => println!("{}", serde_json::to_string(&table)?),
        OutputMode::Plain => {
            for r in &table.rows {
                println!("{} {} {:.2}", r.rows, r.partitions, r.runtime_sec);
            }
        }
        OutputMode::Human => {
            for r in &table.rows {
                println!(
                    "Rows={}, Partitions={}, Time={:.2}s",
                    r.rows, r.partitions, r.runtime_sec
                );
            }
            println!("Scalability benchmark saved to {}", cfg.results_file.display());
            if plotted {
                if let Some(p) = &cfg.plot_file {
                    println!("Scalability plot saved to {}", p.display());
                }
            }
        }
    }
    Ok(())
}
