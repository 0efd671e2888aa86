//! The exported surface the loader and the application call into.
//!
//! Lookup is dispatch by name: five names are answered with the layer's own
//! shims, everything else is delegated to the next link's lookup. Each shim
//! checks its pointers, finds the active session and hands over to it.

use crate::chain::ProviderChain;
use crate::error::LayerError;
use crate::registry::layer;
use crate::session::LayerSession;
use std::ffi::{CStr, c_char};
use std::mem;
use stride_abi::{
    ActionStateFloat, ActionStateGetInfo, ActionStateVector2f, ApiLayerCreateInfo, InstanceCreateInfo,
    InstanceHandle, InteractionProfileSuggestedBinding, LoaderInterfaceStruct, Path, PfnDestroyInstance,
    PfnGetActionStateFloat, PfnGetActionStateVector2f, PfnGetInstanceProcAddr,
    PfnSuggestInteractionProfileBindings, PfnVoidFunction, SessionHandle, XrResult,
};
use stride_core::LEFT_HAND_PATH;
use tracing::{debug, error, info, trace};

/// How a name is answered.
#[derive(Clone, Copy, Debug)]
pub enum Lookup {
    Local(PfnVoidFunction),
    Delegate,
}

/// Names the layer answers itself.
pub const INTERCEPTED: [&CStr; 5] = [
    c"xrGetInstanceProcAddr",
    c"xrDestroyInstance",
    c"xrSuggestInteractionProfileBindings",
    c"xrGetActionStateVector2f",
    c"xrGetActionStateFloat",
];

pub fn lookup(name: &CStr) -> Lookup {
    // SAFETY (all arms): every shim is an `unsafe extern "system" fn`; the
    // caller casts the pointer back to the type registered for its name.
    let function = match name.to_bytes() {
        b"xrGetInstanceProcAddr" => unsafe {
            mem::transmute::<PfnGetInstanceProcAddr, PfnVoidFunction>(xr_get_instance_proc_addr)
        },
        b"xrDestroyInstance" => unsafe {
            mem::transmute::<PfnDestroyInstance, PfnVoidFunction>(xr_destroy_instance)
        },
        b"xrSuggestInteractionProfileBindings" => unsafe {
            mem::transmute::<PfnSuggestInteractionProfileBindings, PfnVoidFunction>(
                xr_suggest_interaction_profile_bindings,
            )
        },
        b"xrGetActionStateVector2f" => unsafe {
            mem::transmute::<PfnGetActionStateVector2f, PfnVoidFunction>(xr_get_action_state_vector2f)
        },
        b"xrGetActionStateFloat" => unsafe {
            mem::transmute::<PfnGetActionStateFloat, PfnVoidFunction>(xr_get_action_state_float)
        },
        _ => return Lookup::Delegate,
    };
    Lookup::Local(function)
}

pub unsafe extern "system" fn xr_get_instance_proc_addr(
    instance: InstanceHandle,
    name: *const c_char,
    function: *mut Option<PfnVoidFunction>,
) -> XrResult {
    if function.is_null() {
        return XrResult::ERROR_VALIDATION_FAILURE;
    }
    // SAFETY: checked for null above; the caller owns the slot.
    let function = unsafe { &mut *function };
    *function = None;

    if name.is_null() {
        return XrResult::ERROR_VALIDATION_FAILURE;
    }
    // SAFETY: the loader passes a NUL-terminated name.
    let name = unsafe { CStr::from_ptr(name) };

    let Some(session) = layer().active() else {
        return XrResult::ERROR_FUNCTION_UNSUPPORTED;
    };

    match lookup(name) {
        Lookup::Local(shim) => {
            trace!(name = %name.to_string_lossy(), "answered locally");
            *function = Some(shim);
            XrResult::SUCCESS
        }
        Lookup::Delegate => session.delegate_lookup(instance, name, function),
    }
}

pub unsafe extern "system" fn xr_destroy_instance(instance: InstanceHandle) -> XrResult {
    let layer = layer();
    if let Some(session) = layer.retire(instance) {
        return session.destroy(instance);
    }
    // Not ours to tear down; let the runtime judge the handle.
    match layer.active() {
        Some(session) => {
            debug!(instance = instance.0, "destroy for an unknown instance, forwarding");
            session.forward_destroy(instance)
        }
        None => XrResult::ERROR_HANDLE_INVALID,
    }
}

pub unsafe extern "system" fn xr_suggest_interaction_profile_bindings(
    instance: InstanceHandle,
    suggested: *const InteractionProfileSuggestedBinding,
) -> XrResult {
    let Some(session) = layer().active() else {
        return XrResult::ERROR_HANDLE_INVALID;
    };
    // SAFETY: null or a valid struct, per the API contract.
    let Some(suggested) = (unsafe { suggested.as_ref() }) else {
        return XrResult::ERROR_VALIDATION_FAILURE;
    };
    session.suggest_interaction_profile_bindings(instance, suggested)
}

pub unsafe extern "system" fn xr_get_action_state_vector2f(
    session_handle: SessionHandle,
    get_info: *const ActionStateGetInfo,
    state: *mut ActionStateVector2f,
) -> XrResult {
    let Some(session) = layer().active() else {
        return XrResult::ERROR_HANDLE_INVALID;
    };
    // SAFETY: null or valid, per the API contract.
    let (Some(get_info), Some(state)) = (unsafe { get_info.as_ref() }, unsafe { state.as_mut() }) else {
        return XrResult::ERROR_VALIDATION_FAILURE;
    };
    session.get_action_state_vector2f(session_handle, get_info, state)
}

pub unsafe extern "system" fn xr_get_action_state_float(
    session_handle: SessionHandle,
    get_info: *const ActionStateGetInfo,
    state: *mut ActionStateFloat,
) -> XrResult {
    let Some(session) = layer().active() else {
        return XrResult::ERROR_HANDLE_INVALID;
    };
    // SAFETY: null or valid, per the API contract.
    let (Some(get_info), Some(state)) = (unsafe { get_info.as_ref() }, unsafe { state.as_mut() }) else {
        return XrResult::ERROR_VALIDATION_FAILURE;
    };
    session.get_action_state_float(session_handle, get_info, state)
}

/// `xrCreateApiLayerInstance`: step the chain, create downstream, adopt.
pub unsafe extern "system" fn xr_create_api_layer_instance(
    info: *const InstanceCreateInfo,
    layer_info: *const ApiLayerCreateInfo,
    instance: *mut InstanceHandle,
) -> XrResult {
    // SAFETY: pointers come straight from the loader.
    match unsafe { create_instance(info, layer_info, instance) } {
        Ok(handle) => {
            info!(instance = handle.0, "instance created");
            XrResult::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "instance creation failed");
            err.to_result()
        }
    }
}

unsafe fn create_instance(
    info: *const InstanceCreateInfo,
    layer_info: *const ApiLayerCreateInfo,
    instance: *mut InstanceHandle,
) -> Result<InstanceHandle, LayerError> {
    if instance.is_null() {
        return Err(LayerError::NullArgument("instance"));
    }
    // SAFETY: null or the loader's struct.
    let layer_info = unsafe { layer_info.as_ref() }.ok_or(LayerError::NullArgument("layerInfo"))?;
    if layer_info.struct_type != LoaderInterfaceStruct::API_LAYER_CREATE_INFO {
        return Err(LayerError::LoaderStruct(layer_info.struct_type.0));
    }

    // SAFETY: null or the loader's link for this layer.
    let next = unsafe { layer_info.next_info.as_ref() }.ok_or(LayerError::NextInfoMissing)?;
    let (Some(next_gipa), Some(next_create)) =
        (next.next_get_instance_proc_addr, next.next_create_api_layer_instance)
    else {
        return Err(LayerError::NextEntryPointsMissing);
    };

    // The next link sees the chain starting after itself.
    let mut stepped = *layer_info;
    stepped.next_info = next.next;

    // SAFETY: forwarding the loader's arguments with the stepped chain.
    let result = unsafe { next_create(info, &stepped, instance) };
    if result.failed() {
        return Err(LayerError::Downstream(result));
    }
    // SAFETY: checked for null above, filled by the next link.
    let handle = unsafe { *instance };

    let chain = match ProviderChain::resolve(next_gipa, handle) {
        Ok(chain) => chain,
        Err(err) => {
            let destroyed = ProviderChain::destroy_orphan(next_gipa, handle);
            debug!(destroyed, "dropped downstream instance after failed resolution");
            return Err(err);
        }
    };

    let left_hand = chain.string_to_path(handle, LEFT_HAND_PATH).unwrap_or(Path::NULL);
    debug!(left_hand = left_hand.0, "resolved left hand path");

    let layer = layer();
    let session = layer.install(LayerSession::new(
        handle,
        Box::new(chain),
        layer.signal().clone(),
        left_hand,
    ));
    let connected = session.prime_signal();
    debug!(connected, "signal primed");
    Ok(handle)
}
