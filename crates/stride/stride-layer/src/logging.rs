//! File logging for the layer.
//!
//! The host application owns stdout and stderr, so everything goes to a
//! plain-text file. If another component in the process already installed
//! a global subscriber, that one wins and the layer logs through it.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use stride_config::LayerConfig;
use tracing_subscriber::EnvFilter;

const FALLBACK_FILTER: &str = "info";

/// Installs the global subscriber. Returns the log file path on success,
/// `None` if no file could be opened or a subscriber was already set.
pub fn init(config: &LayerConfig) -> Option<PathBuf> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = File::create(&path).ok()?;

    let filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;

    Some(path)
}
