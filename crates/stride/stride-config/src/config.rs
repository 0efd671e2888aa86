use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that points the layer at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "STRIDE_LAYER_CONFIG";

const DATA_DIR_NAME: &str = "StrideLayer";
const CONFIG_FILE_NAME: &str = "layer.toml";
const LOG_FILE_NAME: &str = "layer_log.txt";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    /// Logical name of the producer's shared region.
    #[serde(default = "defaults::shm_name")]
    pub shm_name: String,
    /// Unix only: directory the named region lives in.
    #[serde(default = "defaults::shm_dir")]
    pub shm_dir: PathBuf,
    /// Minimum spacing between two connection attempts.
    #[serde(default = "defaults::retry_interval_ms")]
    pub retry_interval_ms: u64,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    use std::path::PathBuf;

    pub fn shm_name() -> String {
        "TreadmillDriverVelocity".into()
    }

    pub fn shm_dir() -> PathBuf {
        "/dev/shm".into()
    }

    pub fn retry_interval_ms() -> u64 {
        2000
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            shm_name: defaults::shm_name(),
            shm_dir: defaults::shm_dir(),
            retry_interval_ms: defaults::retry_interval_ms(),
            log_level: defaults::log_level(),
            log_file: None,
        }
    }
}

/// `<local data dir>/StrideLayer`, if the platform has one.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(DATA_DIR_NAME))
}

impl LayerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let toml_to_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&toml_to_str)
    }

    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let layer_config: LayerConfig = toml::from_str(toml_str)?;
        Ok(layer_config)
    }

    /// Resolves the config the layer runs with.
    ///
    /// An explicit `STRIDE_LAYER_CONFIG` path must load. The default location
    /// is optional: when the file does not exist the defaults apply. Any
    /// error is handed back next to the defaults so the caller can log it
    /// once logging is up.
    pub fn discover() -> (Self, Option<ConfigError>) {
        let explicit = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::discover_from(explicit, data_dir().map(|dir| dir.join(CONFIG_FILE_NAME)))
    }

    fn discover_from(explicit: Option<PathBuf>, fallback: Option<PathBuf>) -> (Self, Option<ConfigError>) {
        let path = match (explicit, fallback) {
            (Some(path), _) => path,
            (None, Some(path)) if path.is_file() => path,
            _ => return (Self::default(), None),
        };

        match Self::load(&path) {
            Ok(config) => (config, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Where the layer writes its log: `log_file` if set, otherwise
    /// `<local data dir>/StrideLayer/layer_log.txt`.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join(LOG_FILE_NAME)))
    }
}
