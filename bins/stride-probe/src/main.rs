//! Watches the velocity region the way the layer would, without an OpenXR
//! runtime. Useful to check a producer is publishing where the layer looks.
//!
//! Reads the same config as the layer (`STRIDE_LAYER_CONFIG` or the default
//! location). Never creates or writes the region.

use anyhow::Context;
use std::thread;
use std::time::{Duration, Instant};
use stride_config::LayerConfig;
use stride_signal::{NamedRegionConnector, SignalReader, SignalSource};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const HEARTBEAT: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::var_os(stride_config::CONFIG_ENV_VAR) {
        Some(path) => LayerConfig::load(&path).with_context(|| format!("loading {}", path.to_string_lossy()))?,
        None => {
            let (config, err) = LayerConfig::discover();
            if let Some(err) = err {
                warn!(error = %err, "using default config");
            }
            config
        }
    };

    let connector = NamedRegionConnector::new(config.shm_name.clone(), config.shm_dir.clone());
    let reader = SignalReader::new(connector, config.retry_interval());
    info!(
        shm_name = %config.shm_name,
        retry_ms = config.retry_interval_ms,
        "probing velocity region"
    );

    let mut last_report = Instant::now();
    let mut last_seen = f32::NAN;
    loop {
        let value = reader.read();
        let changed = value.to_bits() != last_seen.to_bits();
        if changed || last_report.elapsed() >= HEARTBEAT {
            info!(
                velocity = value,
                last_value = reader.last_value(),
                connected = reader.is_connected(),
                attempts = reader.attempts(),
                "signal"
            );
            last_report = Instant::now();
            last_seen = value;
        }
        thread::sleep(POLL_INTERVAL);
    }
}
