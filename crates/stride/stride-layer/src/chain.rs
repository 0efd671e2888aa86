//! The next link in the chain, as seen from an intercepted call.
//!
//! `Downstream` is the seam every handler forwards through. `ProviderChain`
//! implements it with the entry points resolved from the next link's
//! `xrGetInstanceProcAddr` when the instance is created.

use crate::error::LayerError;
use std::ffi::{CStr, CString, c_char};
use std::mem;
use std::ptr;
use stride_abi::{
    ActionStateFloat, ActionStateGetInfo, ActionStateVector2f, InstanceHandle,
    InteractionProfileSuggestedBinding, Path, PfnDestroyInstance, PfnGetActionStateFloat,
    PfnGetActionStateVector2f, PfnGetInstanceProcAddr, PfnPathToString, PfnStringToPath,
    PfnSuggestInteractionProfileBindings, PfnVoidFunction, SessionHandle, XrResult,
};
use tracing::{debug, warn};

pub trait Downstream: Send + Sync {
    /// Forwards a lookup the layer does not handle itself.
    fn get_instance_proc_addr(
        &self,
        instance: InstanceHandle,
        name: &CStr,
        function: &mut Option<PfnVoidFunction>,
    ) -> XrResult;

    fn destroy_instance(&self, instance: InstanceHandle) -> XrResult;

    /// Whether `path_to_string` is backed by the next link at all.
    fn can_resolve_paths(&self) -> bool;

    fn path_to_string(&self, instance: InstanceHandle, path: Path) -> Result<String, XrResult>;

    fn suggest_interaction_profile_bindings(
        &self,
        instance: InstanceHandle,
        suggested: &InteractionProfileSuggestedBinding,
    ) -> XrResult;

    fn get_action_state_vector2f(
        &self,
        session: SessionHandle,
        get_info: &ActionStateGetInfo,
        state: &mut ActionStateVector2f,
    ) -> XrResult;

    fn get_action_state_float(
        &self,
        session: SessionHandle,
        get_info: &ActionStateGetInfo,
        state: &mut ActionStateFloat,
    ) -> XrResult;
}

/// Entry points of the next link, resolved once per instance.
#[derive(Clone, Copy)]
pub struct ProviderChain {
    get_instance_proc_addr: PfnGetInstanceProcAddr,
    destroy_instance: PfnDestroyInstance,
    path_to_string: Option<PfnPathToString>,
    string_to_path: Option<PfnStringToPath>,
    suggest_interaction_profile_bindings: PfnSuggestInteractionProfileBindings,
    get_action_state_vector2f: PfnGetActionStateVector2f,
    get_action_state_float: PfnGetActionStateFloat,
}

/// Asks `gipa` for `name`; `None` on failure or a null answer.
fn lookup(gipa: PfnGetInstanceProcAddr, instance: InstanceHandle, name: &CStr) -> Option<PfnVoidFunction> {
    let mut function = None;
    // SAFETY: gipa is the next link's lookup, called with a valid C string
    // and a valid out pointer.
    let result = unsafe { gipa(instance, name.as_ptr(), &mut function) };
    if result.failed() {
        debug!(name = %name.to_string_lossy(), %result, "next link has no entry point");
        return None;
    }
    function
}

macro_rules! resolve_as {
    ($gipa:expr, $instance:expr, $name:literal, $pfn:ty) => {
        lookup($gipa, $instance, $name).map(|f| {
            // SAFETY: the loader ABI guarantees the pointer returned for
            // this name has this signature.
            unsafe { mem::transmute::<PfnVoidFunction, $pfn>(f) }
        })
    };
}

fn required<T>(entry: Option<T>, name: &'static str) -> Result<T, LayerError> {
    entry.ok_or(LayerError::Unresolved(name))
}

impl ProviderChain {
    /// Resolves every entry point the layer forwards to.
    ///
    /// `xrPathToString` and `xrStringToPath` are optional: without them the
    /// layer cannot classify bindings or scope to the left hand, but it can
    /// still run. Anything else missing is fatal.
    pub fn resolve(gipa: PfnGetInstanceProcAddr, instance: InstanceHandle) -> Result<Self, LayerError> {
        let chain = Self {
            get_instance_proc_addr: gipa,
            destroy_instance: required(
                resolve_as!(gipa, instance, c"xrDestroyInstance", PfnDestroyInstance),
                "xrDestroyInstance",
            )?,
            path_to_string: resolve_as!(gipa, instance, c"xrPathToString", PfnPathToString),
            string_to_path: resolve_as!(gipa, instance, c"xrStringToPath", PfnStringToPath),
            suggest_interaction_profile_bindings: required(
                resolve_as!(
                    gipa,
                    instance,
                    c"xrSuggestInteractionProfileBindings",
                    PfnSuggestInteractionProfileBindings
                ),
                "xrSuggestInteractionProfileBindings",
            )?,
            get_action_state_vector2f: required(
                resolve_as!(gipa, instance, c"xrGetActionStateVector2f", PfnGetActionStateVector2f),
                "xrGetActionStateVector2f",
            )?,
            get_action_state_float: required(
                resolve_as!(gipa, instance, c"xrGetActionStateFloat", PfnGetActionStateFloat),
                "xrGetActionStateFloat",
            )?,
        };

        if chain.path_to_string.is_none() {
            warn!("next link has no xrPathToString, binding classification disabled");
        }
        Ok(chain)
    }

    /// Destroys an instance the next link created but the layer could not
    /// adopt. Returns whether a destroy entry point was found.
    pub fn destroy_orphan(gipa: PfnGetInstanceProcAddr, instance: InstanceHandle) -> bool {
        match resolve_as!(gipa, instance, c"xrDestroyInstance", PfnDestroyInstance) {
            Some(destroy) => {
                // SAFETY: resolved from the link that created `instance`.
                let result = unsafe { destroy(instance) };
                debug!(%result, "destroyed orphaned downstream instance");
                true
            }
            None => false,
        }
    }

    /// Interns `path` through the next link's `xrStringToPath`.
    pub fn string_to_path(&self, instance: InstanceHandle, path: &str) -> Option<Path> {
        let string_to_path = self.string_to_path?;
        let path_string = CString::new(path).ok()?;
        let mut out = Path::NULL;
        // SAFETY: NUL-terminated input, valid out pointer.
        let result = unsafe { string_to_path(instance, path_string.as_ptr(), &mut out) };
        result.succeeded().then_some(out)
    }
}

impl Downstream for ProviderChain {
    fn get_instance_proc_addr(
        &self,
        instance: InstanceHandle,
        name: &CStr,
        function: &mut Option<PfnVoidFunction>,
    ) -> XrResult {
        // SAFETY: forwarding the caller's arguments unchanged.
        unsafe { (self.get_instance_proc_addr)(instance, name.as_ptr(), function) }
    }

    fn destroy_instance(&self, instance: InstanceHandle) -> XrResult {
        // SAFETY: forwarding the caller's handle unchanged.
        unsafe { (self.destroy_instance)(instance) }
    }

    fn can_resolve_paths(&self) -> bool {
        self.path_to_string.is_some()
    }

    /// Two-call idiom: size query, then fill.
    fn path_to_string(&self, instance: InstanceHandle, path: Path) -> Result<String, XrResult> {
        let Some(path_to_string) = self.path_to_string else {
            return Err(XrResult::ERROR_FUNCTION_UNSUPPORTED);
        };

        let mut count = 0u32;
        // SAFETY: zero capacity with a null buffer is the documented size query.
        let result = unsafe { path_to_string(instance, path, 0, &mut count, ptr::null_mut()) };
        if result.failed() {
            return Err(result);
        }
        if count == 0 {
            return Ok(String::new());
        }

        let mut buffer = vec![0u8; count as usize];
        // SAFETY: buffer holds `count` bytes.
        let result = unsafe {
            path_to_string(instance, path, count, &mut count, buffer.as_mut_ptr() as *mut c_char)
        };
        if result.failed() {
            return Err(result);
        }

        let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
        Ok(String::from_utf8_lossy(&buffer[..end]).into_owned())
    }

    fn suggest_interaction_profile_bindings(
        &self,
        instance: InstanceHandle,
        suggested: &InteractionProfileSuggestedBinding,
    ) -> XrResult {
        // SAFETY: forwarding the caller's arguments unchanged.
        unsafe { (self.suggest_interaction_profile_bindings)(instance, suggested) }
    }

    fn get_action_state_vector2f(
        &self,
        session: SessionHandle,
        get_info: &ActionStateGetInfo,
        state: &mut ActionStateVector2f,
    ) -> XrResult {
        // SAFETY: forwarding the caller's arguments unchanged.
        unsafe { (self.get_action_state_vector2f)(session, get_info, state) }
    }

    fn get_action_state_float(
        &self,
        session: SessionHandle,
        get_info: &ActionStateGetInfo,
        state: &mut ActionStateFloat,
    ) -> XrResult {
        // SAFETY: forwarding the caller's arguments unchanged.
        unsafe { (self.get_action_state_float)(session, get_info, state) }
    }
}
