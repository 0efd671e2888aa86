//! OpenXR implicit API layer that adds an external treadmill velocity to
//! the left thumbstick.
//!
//! The loader finds the layer through its manifest and calls
//! [`xrNegotiateLoaderApiLayerInterface`]. From there on the layer sits
//! between the application and the runtime: it forwards every call, watches
//! binding suggestions to learn which actions are the left stick, and adds
//! the shared-memory signal to their state after the runtime answered.

pub mod chain;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod negotiate;
pub mod registry;
pub mod session;

pub use chain::{Downstream, ProviderChain};
pub use dispatch::{INTERCEPTED, Lookup, lookup};
pub use error::LayerError;
pub use negotiate::{LAYER_NAME, check_loader_info, xrNegotiateLoaderApiLayerInterface};
pub use registry::{Layer, LayerSignal, layer};
pub use session::LayerSession;
