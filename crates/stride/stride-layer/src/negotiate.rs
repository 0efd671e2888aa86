//! `xrNegotiateLoaderApiLayerInterface`, the one symbol the library exports.

use crate::dispatch::{xr_create_api_layer_instance, xr_get_instance_proc_addr};
use crate::error::LayerError;
use crate::registry::layer;
use std::ffi::{CStr, c_char};
use stride_abi::{
    CURRENT_API_VERSION, CURRENT_LOADER_API_LAYER_VERSION, LoaderInterfaceStruct, NegotiateApiLayerRequest,
    NegotiateLoaderInfo, PfnCreateApiLayerInstance, PfnGetInstanceProcAddr, XrResult,
};
use tracing::{info, warn};

/// Name the layer is registered under in its manifest.
pub const LAYER_NAME: &str = "XR_APILAYER_STRIDE_treadmill";

/// Whether the loader can talk to us at all.
pub fn check_loader_info(loader_info: &NegotiateLoaderInfo) -> Result<(), LayerError> {
    if loader_info.struct_type != LoaderInterfaceStruct::LOADER_INFO {
        return Err(LayerError::LoaderStruct(loader_info.struct_type.0));
    }
    let (min, max) = (
        loader_info.min_interface_version,
        loader_info.max_interface_version,
    );
    if !(min..=max).contains(&CURRENT_LOADER_API_LAYER_VERSION) {
        return Err(LayerError::InterfaceVersion { min, max });
    }
    Ok(())
}

unsafe fn negotiate(
    loader_info: *const NegotiateLoaderInfo,
    layer_name: *const c_char,
    request: *mut NegotiateApiLayerRequest,
) -> Result<(), LayerError> {
    // SAFETY: null or the loader's struct.
    let loader_info = unsafe { loader_info.as_ref() }.ok_or(LayerError::NullArgument("loaderInfo"))?;
    // SAFETY: null or the loader's struct, which we fill in.
    let request = unsafe { request.as_mut() }.ok_or(LayerError::NullArgument("apiLayerRequest"))?;
    if layer_name.is_null() {
        return Err(LayerError::NullArgument("layerName"));
    }
    // SAFETY: NUL-terminated name from the loader.
    let name = unsafe { CStr::from_ptr(layer_name) };
    if name.to_bytes() != LAYER_NAME.as_bytes() {
        warn!(requested = %name.to_string_lossy(), "negotiating under an unexpected layer name");
    }

    check_loader_info(loader_info)?;
    if request.struct_type != LoaderInterfaceStruct::API_LAYER_REQUEST {
        return Err(LayerError::LoaderStruct(request.struct_type.0));
    }

    request.layer_interface_version = CURRENT_LOADER_API_LAYER_VERSION;
    request.layer_api_version = CURRENT_API_VERSION;
    request.get_instance_proc_addr = Some(xr_get_instance_proc_addr as PfnGetInstanceProcAddr);
    request.create_api_layer_instance = Some(xr_create_api_layer_instance as PfnCreateApiLayerInstance);
    Ok(())
}

/// Entry point named in the layer manifest.
///
/// # Safety
/// Called by the OpenXR loader with pointers that are either null or valid
/// for the duration of the call.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "system" fn xrNegotiateLoaderApiLayerInterface(
    loader_info: *const NegotiateLoaderInfo,
    layer_name: *const c_char,
    api_layer_request: *mut NegotiateApiLayerRequest,
) -> XrResult {
    // Brings up config and logging before anything can be logged.
    let layer = layer();

    // SAFETY: the loader's pointers, passed through.
    match unsafe { negotiate(loader_info, layer_name, api_layer_request) } {
        Ok(()) => {
            info!(
                layer = LAYER_NAME,
                shm_name = %layer.config().shm_name,
                "negotiated with loader"
            );
            XrResult::SUCCESS
        }
        Err(err) => {
            warn!(error = %err, "loader negotiation rejected");
            XrResult::ERROR_INITIALIZATION_FAILED
        }
    }
}
