use crate::harness::BenchmarkResult;
use thiserror::Error;

/// Boxed error returned by analysis collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Collaborator failed (rows={rows}, partitions={partitions}): {source}")]
    Collaborator {
        rows: usize,
        partitions: usize,
        #[source]
        source: BoxError,
    },

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid dataset at line {line}: {reason}")]
    Dataset { line: u64, reason: String },
}

impl BenchError {
    pub(crate) fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        BenchError::Io(format!("{context}: {err}"))
    }
}

/// A sweep that stopped early. `completed` holds every result recorded
/// before the failing configuration, in sweep order.
#[derive(Debug, Error)]
#[error("sweep aborted after {} result(s): {source}", completed.len())]
pub struct SweepError {
    pub completed: Vec<BenchmarkResult>,
    #[source]
    pub source: BenchError,
}
