use crate::config::BenchConfig;
use std::path::PathBuf;

pub enum Command {
    Generate {
        path: PathBuf,
        rows: usize,
        chunk_size: usize,
        seed: u64,
    },
    Verify {
        path: PathBuf,
    },
    // Full sweep: generate, time, persist, plot
    Run {
        config: BenchConfig,
    },
    ShowConfig {
        config: BenchConfig,
    },
}
