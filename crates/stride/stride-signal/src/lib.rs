//! Consumer side of the velocity signal a companion process publishes in a
//! named shared-memory region.

mod reader;
mod region;
mod shm_layout;

pub use reader::{SignalReader, SignalSource};
pub use region::{NamedRegion, NamedRegionConnector, RegionConnector, SignalRegion};
pub use shm_layout::{SIGNAL_RECORD_SIZE, SignalRecord};
