//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use super::ConfigError;
use super::args::CliArgs;
use super::duration;
use crate::domain::services::{CompositorSettings, DEFAULT_DELAY_CS, DEFAULT_FRAMES, DEFAULT_SHAKE};
use crate::infrastructure::font::{DEFAULT_DPI, DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE};
use crate::infrastructure::image::DEFAULT_UPLOAD_LIMIT;

const APP_NAME: &str = "intensify";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Artifact directory and retention.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Caption and animation parameters.
    #[serde(default)]
    pub render: RenderConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port. Also keys the default work directory.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body in bytes.
    #[serde(default = "default_upload_limit")]
    pub upload_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }
}

/// Artifact cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Artifact directory. Defaults to a per-port temp directory.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Age after which artifacts are swept.
    #[serde(default = "default_expire", deserialize_with = "duration::deserialize")]
    pub expire: Duration,

    /// Time between sweeps.
    #[serde(
        default = "default_sweep_interval",
        deserialize_with = "duration::deserialize"
    )]
    pub sweep_interval: Duration,

    /// Deletions per batch before yielding.
    #[serde(default = "default_sweep_batch")]
    pub sweep_batch: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            expire: default_expire(),
            sweep_interval: default_sweep_interval(),
            sweep_batch: default_sweep_batch(),
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// TrueType/OpenType font used for captions.
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,

    /// Caption size in points.
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Rendering resolution.
    #[serde(default = "default_dpi")]
    pub dpi: f32,

    /// Frames per animation.
    #[serde(default = "default_frames")]
    pub frames: usize,

    /// Maximum jitter per axis in pixels.
    #[serde(default = "default_shake")]
    pub shake: u32,

    /// Frame delay in centiseconds.
    #[serde(default = "default_delay")]
    pub delay: u16,

    /// Store each caption mask as a PNG next to its artifact.
    #[serde(default)]
    pub debug_masks: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            font_size: DEFAULT_FONT_SIZE,
            dpi: DEFAULT_DPI,
            frames: DEFAULT_FRAMES,
            shake: DEFAULT_SHAKE,
            delay: DEFAULT_DELAY_CS,
            debug_masks: false,
        }
    }
}

impl RenderConfig {
    /// Animation parameters for the compositor.
    #[must_use]
    pub const fn compositor_settings(&self) -> CompositorSettings {
        CompositorSettings {
            frames: self.frames,
            shake: self.shake,
            delay_cs: self.delay,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

const fn default_upload_limit() -> usize {
    DEFAULT_UPLOAD_LIMIT
}

const fn default_expire() -> Duration {
    Duration::from_secs(14 * 24 * 60 * 60)
}

const fn default_sweep_interval() -> Duration {
    Duration::from_secs(30 * 60)
}

const fn default_sweep_batch() -> usize {
    10
}

fn default_font_path() -> PathBuf {
    PathBuf::from(DEFAULT_FONT_PATH)
}

const fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

const fn default_dpi() -> f32 {
    DEFAULT_DPI
}

const fn default_frames() -> usize {
    DEFAULT_FRAMES
}

const fn default_shake() -> u32 {
    DEFAULT_SHAKE
}

const fn default_delay() -> u16 {
    DEFAULT_DELAY_CS
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(host) = args.host {
            self.server.host = host;
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(work_dir) = args.work_dir {
            self.cache.work_dir = Some(work_dir);
        }
        if let Some(expire) = args.expire {
            self.cache.expire = expire;
        }
        if let Some(font) = args.font {
            self.render.font_path = font;
        }
        if args.debug_masks {
            self.render.debug_masks = true;
        }
    }

    /// Rejects values the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &'static str, reason: &str| {
            Err(ConfigError::Invalid {
                key,
                reason: reason.to_string(),
            })
        };

        if self.server.upload_limit == 0 {
            return invalid("server.upload_limit", "must be greater than zero");
        }
        if self.cache.sweep_interval.is_zero() {
            return invalid("cache.sweep_interval", "must be greater than zero");
        }
        if self.cache.sweep_batch == 0 {
            return invalid("cache.sweep_batch", "must be greater than zero");
        }
        if self.render.frames == 0 {
            return invalid("render.frames", "must be at least 1");
        }
        if !(self.render.font_size.is_finite() && self.render.font_size > 0.0) {
            return invalid("render.font_size", "must be a positive number");
        }
        if !(self.render.dpi.is_finite() && self.render.dpi > 0.0) {
            return invalid("render.dpi", "must be a positive number");
        }
        Ok(())
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the work directory: configured, or `<temp>/intensify-<port>`.
    #[must_use]
    pub fn effective_work_dir(&self) -> PathBuf {
        self.cache.work_dir.clone().unwrap_or_else(|| {
            std::env::temp_dir().join(format!("{APP_NAME}-{}", self.server.port))
        })
    }

    /// Returns the `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
