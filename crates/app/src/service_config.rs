use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_DATASTORE: &str = "memory://";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    // storage
    /// location of the datastore to read blobs from,
    ///  see `common::datastore` for the accepted forms
    pub datastore: String,
    /// entrypoint text `/` redirects to
    pub entrypoint: String,

    // http server configuration
    pub port: u16,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datastore: DEFAULT_DATASTORE.to_string(),
            entrypoint: String::new(),
            port: DEFAULT_PORT,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}

/// Optional on-disk configuration. Every field may be overridden from the
/// command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub datastore: Option<String>,
    pub entrypoint: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply the file on top of the defaults.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let log_level = match self.log_level {
            Some(level) => level
                .parse()
                .map_err(|_| ConfigError::InvalidLogLevel(level))?,
            None => defaults.log_level,
        };

        Ok(Config {
            datastore: self.datastore.unwrap_or(defaults.datastore),
            entrypoint: self.entrypoint.unwrap_or(defaults.entrypoint),
            port: self.port.unwrap_or(defaults.port),
            log_level,
            log_dir: self.log_dir.or(defaults.log_dir),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default().into_config().unwrap();
        assert_eq!(config.datastore, "memory://");
        assert_eq!(config.entrypoint, "");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.log_level, tracing::Level::INFO);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blobview.toml");
        std::fs::write(
            &path,
            "datastore = \"file:///srv/blobs\"\nport = 9000\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap().into_config().unwrap();
        assert_eq!(config.datastore, "file:///srv/blobs");
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blobview.toml");

        std::fs::write(&path, "unknown = 1\n").unwrap();
        assert!(matches!(
            FileConfig::load(&path),
            Err(ConfigError::TomlDe(_))
        ));

        let file = FileConfig {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            file.into_config(),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        assert!(matches!(
            FileConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
