use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_BYTES: u64 = 10 * 1024 * 1024;

/// Target for per-configuration timing samples, routed to `metrics.log` only.
pub const METRICS_TARGET: &str = "orderbench::metrics";

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(
    base: &Path,
    name: &str,
    keep: u32,
) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{name}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_BYTES)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{name}.log")), Box::new(policy))?)
}

/// Configure process logging.
/// - dir: base directory for `app.log` / `metrics.log`; current directory if None.
/// - level: off|error|warn|info|debug|trace (default info)
/// - retention: number of rolled files to keep (default 7)
///
/// App messages also go to stderr.
///
/// # Errors
/// Returns an error if the directory or appenders cannot be created, or a
/// global logger is already installed.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);

    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} [{l}] {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(
            Appender::builder().build("metrics", Box::new(rolling(&base, "metrics", keep)?)),
        )
        .appender(Appender::builder().build("console", Box::new(console)))
        .logger(
            Logger::builder()
                .appender("metrics")
                .additive(false)
                .build(METRICS_TARGET, lvl),
        )
        .build(Root::builder().appender("app").appender("console").build(lvl))?;
    log4rs::init_config(config)?;
    Ok(())
}

/// Logging settings merged from CLI flags, `ORDERBENCH_LOG_*` variables and
/// the config file, in that order of precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub dir: Option<PathBuf>,
    pub level: Option<String>,
    pub retention: Option<usize>,
}

impl LogSettings {
    /// Merge `cli` over the environment (read through `env`) over `file`.
    /// Retention only comes from `ORDERBENCH_LOG_RETENTION`.
    pub fn resolve<F>(cli: LogSettings, file: LogSettings, env: F) -> LogSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        LogSettings {
            dir: cli
                .dir
                .or_else(|| env("ORDERBENCH_LOG_DIR").map(PathBuf::from))
                .or(file.dir),
            level: cli.level.or_else(|| env("ORDERBENCH_LOG_LEVEL")).or(file.level),
            retention: cli
                .retention
                .or_else(|| env("ORDERBENCH_LOG_RETENTION").and_then(|s| s.parse().ok()))
                .or(file.retention),
        }
    }

    /// # Errors
    /// Same as [`configure_logging`].
    pub fn install(&self) -> Result<(), Box<dyn std::error::Error>> {
        configure_logging(self.dir.as_deref(), self.level.as_deref(), self.retention)
    }
}
