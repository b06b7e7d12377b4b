use crate::errors::BenchError;
use crate::record::Record;
use crate::sampler::RecordSampler;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// What one `generate` call wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub path: PathBuf,
    pub rows_written: usize,
    /// Row count of each append, in write order.
    pub chunk_sizes: Vec<usize>,
}

/// Generate `num_rows` synthetic records into `path`, `chunk_size` rows per append.
///
/// Any existing file at `path` is removed first. The output for a given
/// `(num_rows, seed)` is identical whatever `chunk_size` is.
///
/// # Errors
/// `BenchError::Validation` for a zero row count, zero chunk size or a path
/// without a file name (nothing is touched on disk in that case);
/// `BenchError::Io` / `BenchError::Csv` if the destination cannot be prepared
/// or a chunk append fails. A failed append leaves a partial file behind.
pub fn generate(
    path: impl AsRef<Path>,
    num_rows: usize,
    chunk_size: usize,
    seed: u64,
) -> Result<GenerateReport, BenchError> {
    let dest = path.as_ref();
    validate_args(dest, num_rows, chunk_size)?;
    let sampler = RecordSampler::new(num_rows)?;
    prepare_destination(dest)?;

    log::info!(
        "generate: path={}, rows={}, chunk_size={}, seed={}",
        dest.display(),
        num_rows,
        chunk_size,
        seed
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut chunk: Vec<Record> = Vec::with_capacity(chunk_size.min(num_rows));
    let mut report = GenerateReport {
        path: dest.to_path_buf(),
        rows_written: 0,
        chunk_sizes: Vec::new(),
    };
    let mut order_id: u64 = 1;
    while report.rows_written < num_rows {
        let n = chunk_size.min(num_rows - report.rows_written);
        chunk.clear();
        for _ in 0..n {
            chunk.push(sampler.sample(&mut rng, order_id));
            order_id += 1;
        }
        append_chunk(dest, &chunk, report.rows_written == 0)?;
        report.rows_written += n;
        report.chunk_sizes.push(n);
        log::info!("wrote chunk, total rows = {}", report.rows_written);
    }
    log::info!("dataset generated at {}", dest.display());
    Ok(report)
}

fn validate_args(dest: &Path, num_rows: usize, chunk_size: usize) -> Result<(), BenchError> {
    if num_rows == 0 {
        return Err(BenchError::Validation("num_rows must be > 0".into()));
    }
    if chunk_size == 0 {
        return Err(BenchError::Validation("chunk_size must be > 0".into()));
    }
    if dest.file_name().is_none() {
        return Err(BenchError::Validation(format!(
            "destination {} has no file name",
            dest.display()
        )));
    }
    Ok(())
}

fn prepare_destination(dest: &Path) -> Result<(), BenchError> {
    if dest.is_dir() {
        return Err(BenchError::Validation(format!(
            "destination {} is a directory",
            dest.display()
        )));
    }
    if dest.exists() {
        fs::remove_file(dest).map_err(|e| BenchError::io(dest.display(), e))?;
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BenchError::io(parent.display(), e))?;
    }
    Ok(())
}

/// Append one chunk; the header row goes out only with the first chunk.
fn append_chunk(dest: &Path, chunk: &[Record], write_header: bool) -> Result<(), BenchError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dest)
        .map_err(|e| BenchError::io(dest.display(), e))?;
    let mut w = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(BufWriter::new(file));
    for rec in chunk {
        w.serialize(rec)?;
    }
    w.flush().map_err(|e| BenchError::io(dest.display(), e))?;
    Ok(())
}

/// Deterministic dataset location for a sweep cell: `{dir}/orders_{rows}.csv`.
#[must_use]
pub fn dataset_path(dir: &Path, rows: usize) -> PathBuf {
    dir.join(format!("orders_{rows}.csv"))
}
