//! Scalability sweep: dataset size x parallelism, timed per configuration.

use crate::errors::{BenchError, BoxError, SweepError};
use crate::generator::{dataset_path, generate};
use crate::logger::METRICS_TARGET;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One cell of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub rows: usize,
    pub partitions: usize,
}

impl BenchmarkConfig {
    /// Cross product in sweep order: sizes outer, partitions inner, both as given.
    #[must_use]
    pub fn sweep(sizes: &[usize], partitions: &[usize]) -> Vec<BenchmarkConfig> {
        sizes
            .iter()
            .flat_map(|&rows| {
                partitions
                    .iter()
                    .map(move |&partitions| BenchmarkConfig { rows, partitions })
            })
            .collect()
    }
}

/// Timing of one executed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub rows: usize,
    pub partitions: usize,
    pub runtime_sec: f64,
}

/// The analysis collaborator. Opaque to the harness: it is handed a dataset
/// and a parallelism value and only its wall-clock time is observed.
pub trait AnalysisEngine {
    /// # Errors
    /// Any collaborator-defined failure; the harness aborts the sweep on it.
    fn analyze(&mut self, dataset: &Path, parallelism: usize) -> Result<(), BoxError>;
}

impl<F, E> AnalysisEngine for F
where
    F: FnMut(&Path, usize) -> Result<(), E>,
    E: Into<BoxError>,
{
    fn analyze(&mut self, dataset: &Path, parallelism: usize) -> Result<(), BoxError> {
        self(dataset, parallelism).map_err(Into::into)
    }
}

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Directory receiving `orders_{rows}.csv`.
    pub data_dir: PathBuf,
    pub chunk_size: usize,
    pub seed: u64,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            chunk_size: 20_000,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Harness {
    opts: HarnessOptions,
}

impl Harness {
    #[must_use]
    pub fn new(opts: HarnessOptions) -> Self {
        Self { opts }
    }

    /// Run the full sweep sequentially.
    ///
    /// Each size gets one freshly generated dataset, reused for every
    /// parallelism value of that size. Results come back in invocation order.
    ///
    /// # Errors
    /// The first generation or collaborator failure stops the sweep; the
    /// returned `SweepError` carries the results recorded so far.
    pub fn run<A>(
        &self,
        dataset_sizes: &[usize],
        parallelism_params: &[usize],
        engine: &mut A,
    ) -> Result<Vec<BenchmarkResult>, SweepError>
    where
        A: AnalysisEngine + ?Sized,
    {
        let mut results = Vec::with_capacity(dataset_sizes.len() * parallelism_params.len());
        for &rows in dataset_sizes {
            let path = dataset_path(&self.opts.data_dir, rows);
            if let Err(source) = generate(&path, rows, self.opts.chunk_size, self.opts.seed) {
                return Err(SweepError { completed: results, source });
            }
            for &partitions in parallelism_params {
                let started = Instant::now();
                let outcome = engine.analyze(&path, partitions);
                let runtime_sec = started.elapsed().as_secs_f64();
                if let Err(source) = outcome {
                    log::warn!(
                        "rows={rows}, partitions={partitions} failed after {runtime_sec:.2}s"
                    );
                    return Err(SweepError {
                        completed: results,
                        source: BenchError::Collaborator { rows, partitions, source },
                    });
                }
                log::info!("rows={rows}, partitions={partitions}, time={runtime_sec:.2}s");
                log::info!(
                    target: METRICS_TARGET,
                    "rows={rows} partitions={partitions} runtime_sec={runtime_sec:.6}"
                );
                results.push(BenchmarkResult { rows, partitions, runtime_sec });
            }
        }
        Ok(results)
    }
}
