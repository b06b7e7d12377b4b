use clap::{Parser, Subcommand, ValueEnum};
use orderbench::cli::{self as prog_cli, Command, OutputMode};
use orderbench::config::{BenchConfig, ConfigOverrides, EngineKind, parse_list};
use orderbench::logger::LogSettings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "orderbench",
    version,
    about = "Synthetic order dataset generator and scalability benchmark",
    long_about = None
)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(
        long,
        global = true,
        help = "Path to a config file (TOML). If omitted, ./orderbench.toml or defaults are used."
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = Format::Human, help = "Output format")]
    format: Format,
    #[arg(
        long,
        global = true,
        help = "Directory for app.log and metrics.log (overrides env/config)"
    )]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Human,
    Plain,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Generate a synthetic order dataset (csv) in chunks")]
    Generate {
        #[arg(help = "Destination csv path; an existing file is replaced")]
        path: PathBuf,
        #[arg(long, help = "Number of data rows")]
        rows: usize,
        #[arg(long, help = "Rows per appended chunk; defaults to config chunk_size")]
        chunk_size: Option<usize>,
        #[arg(long, help = "Random seed; defaults to config seed")]
        seed: Option<u64>,
    },
    #[command(about = "Check a generated dataset against the file contract")]
    Verify {
        #[arg(help = "Dataset csv path")]
        path: PathBuf,
    },
    #[command(about = "Run the scalability sweep (sizes x partitions) and save results")]
    Run {
        #[arg(long, help = "Comma-separated dataset sizes, e.g. 50000,100000")]
        sizes: Option<String>,
        #[arg(long, help = "Comma-separated partition counts, e.g. 10,50,100")]
        partitions: Option<String>,
        #[arg(long, help = "Rows per appended chunk")]
        chunk_size: Option<usize>,
        #[arg(long, help = "Random seed")]
        seed: Option<u64>,
        #[arg(long, help = "Directory for generated datasets")]
        data_dir: Option<PathBuf>,
        #[arg(long, help = "Directory for engine output and results")]
        output_dir: Option<PathBuf>,
        #[arg(long, help = "Analysis engine: local|command")]
        engine: Option<String>,
    },
    #[command(name = "config", about = "Print the effective configuration")]
    ShowConfig,
}

fn parse_engine(s: &str) -> Result<EngineKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "local" => Ok(EngineKind::Local),
        "command" | "cmd" => Ok(EngineKind::Command),
        other => Err(format!("unknown engine: {other}")),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = real_main(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut overrides = ConfigOverrides::default();
    if let Commands::Run {
        sizes,
        partitions,
        chunk_size,
        seed,
        data_dir,
        output_dir,
        engine,
    } = &cli.command
    {
        overrides.dataset_sizes = sizes.as_deref().map(parse_list).transpose()?;
        overrides.partitions = partitions.as_deref().map(parse_list).transpose()?;
        overrides.chunk_size = *chunk_size;
        overrides.seed = *seed;
        overrides.data_dir = data_dir.clone();
        overrides.output_dir = output_dir.clone();
        overrides.engine = engine.as_deref().map(parse_engine).transpose()?;
    }
    let cfg = BenchConfig::load(cli.config.as_deref(), &overrides)?;

    let log = LogSettings::resolve(
        LogSettings {
            dir: cli.log_dir.clone(),
            level: cli.log_level.clone(),
            retention: None,
        },
        LogSettings {
            dir: cfg.log_dir.clone(),
            level: cfg.log_level.clone(),
            retention: None,
        },
        |key| std::env::var(key).ok(),
    );
    if let Err(e) = log.install() {
        eprintln!("warning: logging disabled: {e}");
    }

    let mode = match cli.format {
        Format::Human => OutputMode::Human,
        Format::Plain => OutputMode::Plain,
        Format::Json => OutputMode::Json,
    };
    let cmd = match cli.command {
        Commands::Generate { path, rows, chunk_size, seed } => Command::Generate {
            path,
            rows,
            chunk_size: chunk_size.unwrap_or(cfg.chunk_size),
            seed: seed.unwrap_or(cfg.seed),
        },
        Commands::Verify { path } => Command::Verify { path },
        Commands::Run { .. } => Command::Run { config: cfg },
        Commands::ShowConfig => Command::ShowConfig { config: cfg },
    };
    prog_cli::run_with_format(cmd, mode)
}
