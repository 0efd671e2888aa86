//! Process-wide home of the layer.
//!
//! The loader only ever talks to free functions, so something has to be
//! reachable from them. That is the `Layer`: configuration, the signal
//! reader (which outlives sessions) and the slot holding the active
//! `LayerSession`. The session itself is created and dropped by the
//! instance lifecycle, never by static initialization.

use crate::logging;
use crate::session::LayerSession;
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};
use stride_abi::InstanceHandle;
use stride_config::LayerConfig;
use stride_signal::{NamedRegionConnector, SignalReader};
use tracing::{info, warn};

pub type LayerSignal = SignalReader<NamedRegionConnector>;

static LAYER: OnceLock<Layer> = OnceLock::new();

/// The layer of this process, set up on first use.
pub fn layer() -> &'static Layer {
    LAYER.get_or_init(Layer::from_environment)
}

pub struct Layer {
    config: LayerConfig,
    signal: Arc<LayerSignal>,
    active: RwLock<Option<Arc<LayerSession>>>,
}

impl Layer {
    pub fn new(config: LayerConfig) -> Self {
        let connector = NamedRegionConnector::new(config.shm_name.clone(), config.shm_dir.clone());
        let signal = Arc::new(SignalReader::new(connector, config.retry_interval()));
        Self {
            config,
            signal,
            active: RwLock::new(None),
        }
    }

    fn from_environment() -> Self {
        let (config, config_error) = LayerConfig::discover();
        let log_path = logging::init(&config);

        if let Some(err) = config_error {
            warn!(error = %err, "ignoring layer config, using defaults");
        }
        info!(
            version = env!("CARGO_PKG_VERSION"),
            log = ?log_path,
            shm_name = %config.shm_name,
            retry_ms = config.retry_interval_ms,
            "stride layer loaded"
        );
        Self::new(config)
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn signal(&self) -> &Arc<LayerSignal> {
        &self.signal
    }

    /// The session of the live instance, if any.
    pub fn active(&self) -> Option<Arc<LayerSession>> {
        self.active.read().clone()
    }

    /// Makes `session` the active one. A session still installed is
    /// replaced; the loader never runs two instances through one layer.
    pub fn install(&self, session: LayerSession) -> Arc<LayerSession> {
        let session = Arc::new(session);
        let previous = self.active.write().replace(session.clone());
        if let Some(previous) = previous {
            warn!(
                previous = previous.instance().0,
                current = session.instance().0,
                "replacing a session that was never destroyed"
            );
        }
        session
    }

    /// Takes the session of `instance` out of the slot. Leaves the slot
    /// alone when another instance is active.
    pub fn retire(&self, instance: InstanceHandle) -> Option<Arc<LayerSession>> {
        let mut active = self.active.write();
        match active.as_ref() {
            Some(session) if session.instance() == instance => active.take(),
            _ => None,
        }
    }
}
