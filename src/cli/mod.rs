mod command;
mod runner;

pub use command::Command;
pub use runner::{OutputMode, build_engine, run, run_with_format};
