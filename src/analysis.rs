//! Analysis collaborators the harness can time.
//!
//! [`TopProducts`] is an in-process reference job (sales per product, top 10);
//! [`CommandEngine`] shells out to an external engine per configuration.

use crate::errors::{BenchError, BoxError};
use crate::harness::AnalysisEngine;
use crate::record::{Country, Record};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const TOP_N: usize = 10;

/// Per-configuration output directory: `{root}/{dataset stem}_p{parallelism}`.
#[must_use]
pub fn output_dir_for(root: &Path, dataset: &Path, parallelism: usize) -> PathBuf {
    let stem = dataset.file_stem().and_then(|s| s.to_str()).unwrap_or("dataset");
    root.join(format!("{stem}_p{parallelism}"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_id: u32,
    pub sales: f64,
}

/// Reference job: total sales (price x quantity) per product over rows with
/// a positive price, hash-partitioned by country, top [`TOP_N`] written to
/// `top_products.csv`.
#[derive(Debug, Clone)]
pub struct TopProducts {
    output_root: PathBuf,
}

impl TopProducts {
    #[must_use]
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self { output_root: output_root.into() }
    }

    /// Run the job and return the ranking without writing it.
    ///
    /// # Errors
    /// Read/parse failures or a zero partition count.
    pub fn compute(
        &self,
        dataset: &Path,
        partitions: usize,
    ) -> Result<Vec<ProductSales>, BoxError> {
        if partitions == 0 {
            return Err("partition count must be > 0".into());
        }
        let file = File::open(dataset).map_err(|e| format!("{}: {e}", dataset.display()))?;
        let mut rdr = csv::Reader::from_reader(BufReader::new(file));
        // Keyed sparsely: at most one bucket per country is ever non-empty.
        let mut buckets: BTreeMap<usize, Vec<(u32, f64)>> = BTreeMap::new();
        for rec in rdr.deserialize::<Record>() {
            let rec = rec?;
            if rec.price <= 0.0 {
                continue;
            }
            buckets
                .entry(partition_of(rec.country, partitions))
                .or_default()
                .push((rec.product_id, rec.total_sales()));
        }

        let workers = partitions
            .min(buckets.len())
            .min(std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get));
        let partials: Vec<HashMap<u32, f64>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    let mine: Vec<&Vec<(u32, f64)>> =
                        buckets.values().skip(w).step_by(workers).collect();
                    s.spawn(move || {
                        let mut acc: HashMap<u32, f64> = HashMap::new();
                        for bucket in mine {
                            for &(product, sales) in bucket {
                                *acc.entry(product).or_insert(0.0) += sales;
                            }
                        }
                        acc
                    })
                })
                .collect();
            handles.into_iter().filter_map(|h| h.join().ok()).collect()
        });
        if partials.len() != workers {
            return Err("aggregation worker panicked".into());
        }

        let mut totals: HashMap<u32, f64> = HashMap::new();
        for part in partials {
            for (product, sales) in part {
                *totals.entry(product).or_insert(0.0) += sales;
            }
        }
        let mut ranked: Vec<ProductSales> = totals
            .into_iter()
            .map(|(product_id, sales)| ProductSales { product_id, sales })
            .collect();
        ranked.sort_by(|a, b| b.sales.total_cmp(&a.sales).then(a.product_id.cmp(&b.product_id)));
        ranked.truncate(TOP_N);
        Ok(ranked)
    }
}

impl AnalysisEngine for TopProducts {
    fn analyze(&mut self, dataset: &Path, parallelism: usize) -> Result<(), BoxError> {
        let top = self.compute(dataset, parallelism)?;
        let dir = output_dir_for(&self.output_root, dataset, parallelism);
        fs::create_dir_all(&dir)?;
        let mut w = csv::Writer::from_path(dir.join("top_products.csv"))?;
        for row in &top {
            w.serialize(row)?;
        }
        w.flush()?;
        log::debug!("top_products: {} rows into {}", top.len(), dir.display());
        Ok(())
    }
}

fn partition_of(country: Country, partitions: usize) -> usize {
    let mut h = DefaultHasher::new();
    country.hash(&mut h);
    (h.finish() % partitions as u64) as usize
}

/// Runs an external program once per configuration.
///
/// Each argument of the template has `{dataset}`, `{parallelism}` and
/// `{output}` substituted. A non-zero exit is a collaborator failure.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    argv: Vec<String>,
    output_root: PathBuf,
}

impl CommandEngine {
    /// # Errors
    /// Returns an error if `argv` is empty.
    pub fn new(argv: Vec<String>, output_root: impl Into<PathBuf>) -> Result<Self, BenchError> {
        if argv.is_empty() {
            return Err(BenchError::Config("engine command is empty".into()));
        }
        Ok(Self { argv, output_root: output_root.into() })
    }

    #[must_use]
    pub fn render(&self, dataset: &Path, parallelism: usize) -> Vec<String> {
        let output = output_dir_for(&self.output_root, dataset, parallelism);
        let dataset = dataset.display().to_string();
        let output = output.display().to_string();
        let parallelism = parallelism.to_string();
        self.argv
            .iter()
            .map(|a| {
                a.replace("{dataset}", &dataset)
                    .replace("{parallelism}", &parallelism)
                    .replace("{output}", &output)
            })
            .collect()
    }
}

impl AnalysisEngine for CommandEngine {
    fn analyze(&mut self, dataset: &Path, parallelism: usize) -> Result<(), BoxError> {
        let args = self.render(dataset, parallelism);
        let (program, rest) = args.split_first().ok_or("engine command is empty")?;
        fs::create_dir_all(output_dir_for(&self.output_root, dataset, parallelism))?;
        log::debug!("engine: {}", args.join(" "));
        let out = Command::new(program)
            .args(rest)
            .output()
            .map_err(|e| format!("failed to spawn {program}: {e}"))?;
        if out.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&out.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(5)..].join("\n");
        Err(format!("{program} exited with {}: {tail}", out.status).into())
    }
}
