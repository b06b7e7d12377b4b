//! Reproducible synthetic order datasets and a scalability benchmark harness
//! that times an analysis engine across dataset sizes and parallelism.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod generator;
pub mod harness;
pub mod logger;
pub mod record;
pub mod report;
pub mod sampler;

pub use errors::{BenchError, SweepError};
pub use generator::{GenerateReport, generate};
pub use harness::{
    AnalysisEngine, BenchmarkConfig, BenchmarkResult, Harness, HarnessOptions,
};
pub use record::Record;
pub use report::{ResultsTable, aggregate, persist, visualize};

