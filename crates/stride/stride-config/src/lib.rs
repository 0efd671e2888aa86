mod config;

pub use config::{CONFIG_ENV_VAR, ConfigError, LayerConfig, data_dir};
