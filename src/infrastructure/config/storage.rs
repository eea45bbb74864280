use super::app_config::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while loading configuration or preparing directories.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("config file not found: {}", path.display())]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },
    /// Filesystem failure.
    #[error("io error on {}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A setting is out of range.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Config key.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Where a loaded configuration came from.
#[derive(Debug)]
pub enum ConfigSource {
    /// No file was found.
    Defaults,
    /// Parsed from this file.
    File(PathBuf),
    /// The file did not parse and defaults were used instead.
    Malformed {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser error.
        error: toml::de::Error,
    },
}

impl ConfigSource {
    /// Logs how the configuration was obtained.
    ///
    /// Loading happens before the subscriber exists, so callers report the
    /// outcome once logging is initialized.
    pub fn log(&self) {
        match self {
            Self::Defaults => debug!("No config file found, using defaults"),
            Self::File(path) => info!("Loaded config from {:?}", path),
            Self::Malformed { path, error } => warn!(
                path = %path.display(),
                "Failed to parse config file: {}. Using defaults.",
                error
            ),
        }
    }
}

/// Reads `config.toml` from an explicit path or the platform config directory.
pub struct ConfigLoader {
    config_dir: Option<PathBuf>,
}

impl ConfigLoader {
    /// Creates a loader for the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: AppConfig::default_config_dir(),
        }
    }

    /// Creates a loader with a specific directory (useful for testing).
    #[must_use]
    pub fn with_dir(path: PathBuf) -> Self {
        Self {
            config_dir: Some(path),
        }
    }

    /// Loads the configuration and reports where it came from.
    ///
    /// An explicit path must exist. Without one, a missing default file
    /// yields defaults. A file that does not parse is replaced by defaults
    /// and reported as [`ConfigSource::Malformed`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an explicit file is missing or a file cannot be read.
    pub fn load(
        &self,
        path_override: Option<&Path>,
    ) -> Result<(AppConfig, ConfigSource), ConfigError> {
        let config_path = match path_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                path.to_path_buf()
            }
            None => {
                let Some(path) = self
                    .config_dir
                    .as_ref()
                    .map(|dir| dir.join(CONFIG_FILE_NAME))
                    .filter(|path| path.exists())
                else {
                    return Ok((AppConfig::default(), ConfigSource::Defaults));
                };
                path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        let (mut config, source) = match toml::from_str::<AppConfig>(&content) {
            Ok(config) => (config, ConfigSource::File(config_path.clone())),
            Err(error) => (
                AppConfig::default(),
                ConfigSource::Malformed {
                    path: config_path.clone(),
                    error,
                },
            ),
        };
        config.config = Some(config_path);
        Ok((config, source))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the work directory if needed, owner-only on unix.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the directory cannot be created.
pub fn prepare_work_dir(path: &Path) -> Result<(), ConfigError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Work directory ready at {:?}", path);
    Ok(())
}
