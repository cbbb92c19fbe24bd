use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Errors that can occur while loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to serialize or write the configuration file.
    Write {
        path: PathBuf,
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path_display(path), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path_display(path), source)
            }
            ConfigError::Write { path, source } => {
                write!(f, "Failed to write config at {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Write { source, .. } => Some(source.as_ref()),
        }
    }
}

/// `<config dir>/config.toml`, or `config.toml` in the working directory when
/// the platform has no home directory.
pub fn default_config_path() -> PathBuf {
    match ProjectDirs::from("org", "palaver", "palaver") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

impl Config {
    /// Read the config; a missing file yields the defaults.
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Like [`Config::load_from_path`], but writes the defaults out when the
    /// file does not exist yet.
    pub fn load_or_init(config_path: &Path) -> Result<Config, ConfigError> {
        if config_path.exists() {
            return Self::load_from_path(config_path);
        }
        let config = Config::default();
        config.save_to_path(config_path)?;
        info!(path = %path_display(config_path), "created default config");
        Ok(config)
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), ConfigError> {
        let wrap = |source: Box<dyn StdError + Send + Sync>| ConfigError::Write {
            path: config_path.to_path_buf(),
            source,
        };

        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|e| wrap(Box::new(e)))?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| wrap(Box::new(e)))?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new_in("."),
        }
        .map_err(|e| wrap(Box::new(e)))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| wrap(Box::new(e)))?;
        temp_file
            .as_file_mut()
            .sync_all()
            .map_err(|e| wrap(Box::new(e)))?;
        temp_file
            .persist(config_path)
            .map_err(|e| wrap(Box::new(e.error)))?;
        debug!(path = %path_display(config_path), "saved config");
        Ok(())
    }
}
