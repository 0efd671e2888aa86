//! `#[repr(C)]` definitions of the slice of the OpenXR 1.0 ABI that the
//! stride layer touches: handles, result codes, action-state queries,
//! suggested bindings and the loader/API-layer negotiation structures.
//!
//! Handles are modelled the way the runtime hands them out on 64-bit
//! targets: opaque 64-bit values, compared by bit pattern only.

#![deny(unsafe_code)]

#[cfg(not(target_pointer_width = "64"))]
compile_error!("stride-abi models OpenXR handles as u64 and only supports 64-bit targets");

pub mod handles;
pub mod input;
pub mod loader;
pub mod pfn;
pub mod result;

pub use handles::{ActionHandle, InstanceHandle, Path, SessionHandle};
pub use input::{
    ActionStateFloat, ActionStateGetInfo, ActionStateVector2f, ActionSuggestedBinding, Bool32,
    InteractionProfileSuggestedBinding, StructureType, Time, Vector2f,
};
pub use loader::{
    ApiLayerCreateInfo, ApiLayerNextInfo, InstanceCreateInfo, LoaderInterfaceStruct,
    NegotiateApiLayerRequest, NegotiateLoaderInfo, Version, CURRENT_API_VERSION,
    CURRENT_LOADER_API_LAYER_VERSION, MAX_API_LAYER_NAME_SIZE,
};
pub use pfn::*;
pub use result::XrResult;
