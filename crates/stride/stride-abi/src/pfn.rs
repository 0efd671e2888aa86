//! Function-pointer types of the entry points the layer exports, resolves
//! or forwards. `"system"` is `__stdcall` on 32-bit Windows and the C ABI
//! everywhere else, matching `XRAPI_PTR`.

use crate::handles::{InstanceHandle, Path, SessionHandle};
use crate::input::{
    ActionStateFloat, ActionStateGetInfo, ActionStateVector2f, InteractionProfileSuggestedBinding,
};
use crate::loader::{ApiLayerCreateInfo, InstanceCreateInfo, NegotiateApiLayerRequest, NegotiateLoaderInfo};
use crate::result::XrResult;
use std::ffi::c_char;

pub type PfnVoidFunction = unsafe extern "system" fn();

pub type PfnGetInstanceProcAddr = unsafe extern "system" fn(
    instance: InstanceHandle,
    name: *const c_char,
    function: *mut Option<PfnVoidFunction>,
) -> XrResult;

pub type PfnCreateApiLayerInstance = unsafe extern "system" fn(
    info: *const InstanceCreateInfo,
    layer_info: *const ApiLayerCreateInfo,
    instance: *mut InstanceHandle,
) -> XrResult;

pub type PfnNegotiateLoaderApiLayerInterface = unsafe extern "system" fn(
    loader_info: *const NegotiateLoaderInfo,
    layer_name: *const c_char,
    api_layer_request: *mut NegotiateApiLayerRequest,
) -> XrResult;

pub type PfnDestroyInstance = unsafe extern "system" fn(instance: InstanceHandle) -> XrResult;

pub type PfnPathToString = unsafe extern "system" fn(
    instance: InstanceHandle,
    path: Path,
    buffer_capacity_input: u32,
    buffer_count_output: *mut u32,
    buffer: *mut c_char,
) -> XrResult;

pub type PfnStringToPath = unsafe extern "system" fn(
    instance: InstanceHandle,
    path_string: *const c_char,
    path: *mut Path,
) -> XrResult;

pub type PfnSuggestInteractionProfileBindings = unsafe extern "system" fn(
    instance: InstanceHandle,
    suggested_bindings: *const InteractionProfileSuggestedBinding,
) -> XrResult;

pub type PfnGetActionStateFloat = unsafe extern "system" fn(
    session: SessionHandle,
    get_info: *const ActionStateGetInfo,
    state: *mut ActionStateFloat,
) -> XrResult;

pub type PfnGetActionStateVector2f = unsafe extern "system" fn(
    session: SessionHandle,
    get_info: *const ActionStateGetInfo,
    state: *mut ActionStateVector2f,
) -> XrResult;
