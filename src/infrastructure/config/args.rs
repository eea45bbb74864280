use super::app_config::LogLevel;
use super::duration::parse_duration;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line overrides for [`AppConfig`](super::AppConfig).
#[derive(Debug, Parser)]
#[command(
    name = "intensify",
    version,
    about = "Turns an uploaded image into a shaking \"[noun intensifies]\" GIF",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Caption font (TrueType/OpenType).
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Bind address.
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Artifact age before removal, e.g. `14d` or `1d12h`.
    #[arg(long, value_parser = parse_duration)]
    pub expire: Option<Duration>,

    /// Artifact directory.
    #[arg(long, value_name = "PATH")]
    pub work_dir: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Store caption masks next to artifacts.
    #[arg(long)]
    pub debug_masks: bool,
}
