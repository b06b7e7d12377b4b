//! Generator throughput across chunk sizes.
//! Results are appended to `benchmarks/results/generate.csv`.

use orderbench::generator::generate;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

const ROWS: usize = 1_000_000;
const CHUNK_SIZES: [usize; 4] = [1_000, 20_000, 100_000, 1_000_000];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = Path::new("benchmarks/results");
    std::fs::create_dir_all(dir)?;
    let data = std::env::temp_dir().join("orderbench_generate_bench.csv");
    let mut out = OpenOptions::new().create(true).append(true).open(dir.join("generate.csv"))?;
    for chunk in CHUNK_SIZES {
        let started = Instant::now();
        let rep = generate(&data, ROWS, chunk, 42)?;
        let secs = started.elapsed().as_secs_f64();
        let bytes = std::fs::metadata(&data)?.len();
        println!(
            "chunk_size={chunk:>9} rows={} chunks={} {:.2}s {:.0} rows/s {:.1} MB",
            rep.rows_written,
            rep.chunk_sizes.len(),
            secs,
            ROWS as f64 / secs,
            bytes as f64 / (1024.0 * 1024.0)
        );
        writeln!(out, "{},{},{chunk},{secs:.4}", chrono::Local::now().to_rfc3339(), ROWS)?;
    }
    std::fs::remove_file(&data)?;
    Ok(())
}
