//! Application configuration.

pub mod app_config;
/// Command-line arguments.
pub mod args;
pub mod duration;
/// Config file loading and the work directory.
pub mod storage;

pub use app_config::{AppConfig, CacheConfig, LogLevel, RenderConfig, ServerConfig};
pub use args::CliArgs;
pub use duration::{DurationParseError, format_duration, parse_duration};
pub use storage::{ConfigError, ConfigLoader, ConfigSource, prepare_work_dir};
