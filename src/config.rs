//! Benchmark configuration.
//!
//! Precedence: CLI overrides > environment > config file > defaults.
//! Config files are looked up at `--config`, `ORDERBENCH_CONFIG`, then
//! `./orderbench.toml`; the first one found wins.

use crate::errors::BenchError;
use crate::harness::HarnessOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Local,
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub dataset_sizes: Vec<usize>,
    pub partitions: Vec<usize>,
    pub chunk_size: usize,
    pub seed: u64,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub results_file: PathBuf,
    pub plot_file: Option<PathBuf>,
    pub engine: EngineKind,
    /// argv template for `engine = "command"`.
    pub command: Vec<String>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            dataset_sizes: vec![50_000, 100_000, 200_000],
            partitions: vec![10, 50, 100],
            chunk_size: 20_000,
            seed: 42,
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            results_file: PathBuf::from("output/scalability_results.csv"),
            plot_file: Some(PathBuf::from("output/scalability_plot.svg")),
            engine: EngineKind::Local,
            command: Vec::new(),
            log_dir: None,
            log_level: None,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dataset_sizes: Option<Vec<usize>>,
    pub partitions: Option<Vec<usize>>,
    pub chunk_size: Option<usize>,
    pub seed: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub engine: Option<EngineKind>,
}

impl BenchConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns `BenchError::Config` on malformed TOML or unknown value types.
    pub fn from_toml_str(s: &str) -> Result<Self, BenchError> {
        toml::from_str(s).map_err(|e| BenchError::Config(e.to_string()))
    }

    /// # Errors
    /// Returns `BenchError::Io` if the file cannot be read, `BenchError::Config`
    /// if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, BenchError> {
        let s = std::fs::read_to_string(path).map_err(|e| BenchError::io(path.display(), e))?;
        Self::from_toml_str(&s)
    }

    /// Build the effective configuration from all layers.
    ///
    /// # Errors
    /// Fails if an explicitly named config file is unreadable, any layer
    /// holds an invalid value, or the merged result does not validate.
    pub fn load(
        cli_config: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, BenchError> {
        let mut cfg = match find_config_file(cli_config) {
            Some(p) => {
                log::debug!("config: loading {}", p.display());
                Self::from_file(&p)?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        cfg.apply_overrides(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `ORDERBENCH_*` variables through `get`.
    ///
    /// # Errors
    /// Returns `BenchError::Config` for a value that does not parse.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, get: F) -> Result<(), BenchError> {
        if let Some(s) = get("ORDERBENCH_SEED") {
            self.seed = parse_env("ORDERBENCH_SEED", &s)?;
        }
        if let Some(s) = get("ORDERBENCH_CHUNK_SIZE") {
            self.chunk_size = parse_env("ORDERBENCH_CHUNK_SIZE", &s)?;
        }
        if let Some(s) = get("ORDERBENCH_DATA_DIR") {
            self.data_dir = PathBuf::from(s);
        }
        if let Some(s) = get("ORDERBENCH_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(s);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, o: &ConfigOverrides) {
        if let Some(v) = &o.dataset_sizes {
            self.dataset_sizes = v.clone();
        }
        if let Some(v) = &o.partitions {
            self.partitions = v.clone();
        }
        if let Some(v) = o.chunk_size {
            self.chunk_size = v;
        }
        if let Some(v) = o.seed {
            self.seed = v;
        }
        if let Some(v) = &o.data_dir {
            self.data_dir = v.clone();
        }
        if let Some(v) = &o.output_dir {
            self.output_dir = v.clone();
        }
        if let Some(v) = o.engine {
            self.engine = v;
        }
    }

    /// # Errors
    /// Returns `BenchError::Config` describing the first invalid setting.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.dataset_sizes.is_empty() || self.partitions.is_empty() {
            return Err(BenchError::Config("dataset_sizes and partitions must be non-empty".into()));
        }
        if self.dataset_sizes.contains(&0) {
            return Err(BenchError::Config("dataset sizes must be > 0".into()));
        }
        if self.partitions.contains(&0) {
            return Err(BenchError::Config("partitions must be > 0".into()));
        }
        if self.chunk_size == 0 {
            return Err(BenchError::Config("chunk_size must be > 0".into()));
        }
        if self.engine == EngineKind::Command && self.command.is_empty() {
            return Err(BenchError::Config("engine = \"command\" requires a command".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn harness_options(&self) -> HarnessOptions {
        HarnessOptions {
            data_dir: self.data_dir.clone(),
            chunk_size: self.chunk_size,
            seed: self.seed,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, BenchError> {
    raw.trim()
        .parse()
        .map_err(|_| BenchError::Config(format!("{key}: invalid value {raw:?}")))
}

fn find_config_file(cli_config: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = cli_config {
        // explicit path is returned even if missing so the read error surfaces
        return Some(p.to_path_buf());
    }
    let mut paths: Vec<PathBuf> = vec![];
    if let Ok(p) = std::env::var("ORDERBENCH_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join("orderbench.toml"));
    }
    paths.into_iter().find(|p| p.exists())
}

/// Split a comma-separated list of positive integers, e.g. `10,50,100`.
///
/// # Errors
/// Returns `BenchError::Config` for an empty list or a non-numeric item.
pub fn parse_list(s: &str) -> Result<Vec<usize>, BenchError> {
    let out = s
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.replace('_', "")
                .parse::<usize>()
                .map_err(|_| BenchError::Config(format!("not a number: {p:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if out.is_empty() {
        return Err(BenchError::Config("empty list".into()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parsing() {
        assert_eq!(parse_list("10, 50,100").unwrap(), vec![10, 50, 100]);
        assert_eq!(parse_list("50_000").unwrap(), vec![50_000]);
        assert!(parse_list("").is_err());
        assert!(parse_list("10,x").is_err());
    }

    #[test]
    fn env_layer_parses_and_rejects() {
        let mut cfg = BenchConfig::default();
        cfg.apply_env(|k| match k {
            "ORDERBENCH_SEED" => Some("7".into()),
            "ORDERBENCH_DATA_DIR" => Some("/tmp/d".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/d"));
        let err = cfg.apply_env(|k| (k == "ORDERBENCH_CHUNK_SIZE").then(|| "lots".to_string()));
        assert!(matches!(err, Err(BenchError::Config(_))));
    }
}
