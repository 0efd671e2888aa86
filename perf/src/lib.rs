//! Fixtures shared by the benches: a runtime that answers instantly and a
//! signal that never touches shared memory, so only the layer's own work
//! is measured.

use std::ffi::CStr;
use std::sync::Arc;
use stride_abi::{
    ActionHandle, ActionStateFloat, ActionStateGetInfo, ActionStateVector2f, ActionSuggestedBinding, Bool32,
    InstanceHandle, InteractionProfileSuggestedBinding, Path, PfnVoidFunction, SessionHandle, Vector2f, XrResult,
};
use stride_layer::{Downstream, LayerSession};
use stride_signal::SignalSource;

pub const LEFT_HAND: Path = Path(1);
pub const RIGHT_HAND: Path = Path(2);

/// Path atoms the bench runtime knows.
const PATHS: &[(u64, &str)] = &[
    (1, "/user/hand/left"),
    (2, "/user/hand/right"),
    (10, "/user/hand/left/input/thumbstick"),
    (11, "/user/hand/left/input/thumbstick/y"),
    (12, "/user/hand/left/input/thumbstick/x"),
    (13, "/user/hand/right/input/thumbstick"),
    (14, "/user/hand/left/input/trigger/value"),
];

pub struct BenchRuntime;

impl Downstream for BenchRuntime {
    fn get_instance_proc_addr(
        &self,
        _instance: InstanceHandle,
        _name: &CStr,
        function: &mut Option<PfnVoidFunction>,
    ) -> XrResult {
        *function = None;
        XrResult::ERROR_FUNCTION_UNSUPPORTED
    }

    fn destroy_instance(&self, _instance: InstanceHandle) -> XrResult {
        XrResult::SUCCESS
    }

    fn can_resolve_paths(&self) -> bool {
        true
    }

    fn path_to_string(&self, _instance: InstanceHandle, path: Path) -> Result<String, XrResult> {
        PATHS
            .iter()
            .find(|(atom, _)| *atom == path.0)
            .map(|(_, s)| s.to_string())
            .ok_or(XrResult::ERROR_PATH_INVALID)
    }

    fn suggest_interaction_profile_bindings(
        &self,
        _instance: InstanceHandle,
        _suggested: &InteractionProfileSuggestedBinding,
    ) -> XrResult {
        XrResult::SUCCESS
    }

    fn get_action_state_vector2f(
        &self,
        _session: SessionHandle,
        _get_info: &ActionStateGetInfo,
        state: &mut ActionStateVector2f,
    ) -> XrResult {
        state.current_state = Vector2f { x: 0.1, y: 0.2 };
        state.is_active = Bool32::TRUE;
        XrResult::SUCCESS
    }

    fn get_action_state_float(
        &self,
        _session: SessionHandle,
        _get_info: &ActionStateGetInfo,
        state: &mut ActionStateFloat,
    ) -> XrResult {
        state.current_state = 0.2;
        state.is_active = Bool32::TRUE;
        XrResult::SUCCESS
    }
}

pub struct ConstantSignal(pub f32);

impl SignalSource for ConstantSignal {
    fn read(&self) -> f32 {
        self.0
    }

    fn prime(&self) -> bool {
        true
    }

    fn disconnect(&self) {}
}

pub fn session(velocity: f32) -> LayerSession {
    LayerSession::new(
        InstanceHandle(1),
        Box::new(BenchRuntime),
        Arc::new(ConstantSignal(velocity)),
        LEFT_HAND,
    )
}

/// Actions `100..100+actions`, cycling through the paths 10..=14: stick,
/// stick Y, stick X, right stick, trigger.
pub fn profile_bindings(actions: u64) -> Vec<ActionSuggestedBinding> {
    (0..actions)
        .map(|i| ActionSuggestedBinding {
            action: ActionHandle(100 + i),
            binding: Path(10 + i % 5),
        })
        .collect()
}

/// Session that has already seen `profile_bindings(actions)`.
pub fn classified_session(velocity: f32, actions: u64) -> LayerSession {
    let session = session(velocity);
    let bindings = profile_bindings(actions);
    let suggested = InteractionProfileSuggestedBinding::new(Path(500), &bindings);
    session.suggest_interaction_profile_bindings(session.instance(), &suggested);
    session
}
