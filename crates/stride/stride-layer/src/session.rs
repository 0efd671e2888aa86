//! Per-instance interception context.
//!
//! A `LayerSession` is created when the next link has created an instance
//! and its entry points are resolved, and retired by `xrDestroyInstance`.
//! Every intercepted call forwards first and only then, on success, looks
//! at the classification and the signal.

use crate::chain::Downstream;
use std::ffi::CStr;
use std::sync::Arc;
use stride_abi::{
    ActionHandle, ActionStateFloat, ActionStateGetInfo, ActionStateVector2f, InstanceHandle,
    InteractionProfileSuggestedBinding, Path, PfnVoidFunction, SessionHandle, XrResult,
};
use stride_core::{AxisQuery, BindingClassifier, apply_float, apply_vector2f, has_signal, should_inject};
use stride_signal::SignalSource;
use tracing::{debug, info, trace, warn};

pub struct LayerSession {
    instance: InstanceHandle,
    downstream: Box<dyn Downstream>,
    classifier: BindingClassifier,
    signal: Arc<dyn SignalSource>,
    /// `/user/hand/left` as interned by the runtime, `Path::NULL` if it
    /// could not be resolved.
    left_hand: Path,
}

impl LayerSession {
    pub fn new(
        instance: InstanceHandle,
        downstream: Box<dyn Downstream>,
        signal: Arc<dyn SignalSource>,
        left_hand: Path,
    ) -> Self {
        Self {
            instance,
            downstream,
            classifier: BindingClassifier::new(),
            signal,
            left_hand,
        }
    }

    pub fn instance(&self) -> InstanceHandle {
        self.instance
    }

    pub fn left_hand_path(&self) -> Path {
        self.left_hand
    }

    pub fn classifier(&self) -> &BindingClassifier {
        &self.classifier
    }

    pub fn delegate_lookup(
        &self,
        instance: InstanceHandle,
        name: &CStr,
        function: &mut Option<PfnVoidFunction>,
    ) -> XrResult {
        self.downstream.get_instance_proc_addr(instance, name, function)
    }

    /// `xrSuggestInteractionProfileBindings`: forward, then classify.
    pub fn suggest_interaction_profile_bindings(
        &self,
        instance: InstanceHandle,
        suggested: &InteractionProfileSuggestedBinding,
    ) -> XrResult {
        let result = self
            .downstream
            .suggest_interaction_profile_bindings(instance, suggested);
        if result.failed() {
            warn!(%result, "binding suggestion rejected downstream");
            return result;
        }
        if !self.downstream.can_resolve_paths() {
            debug!("no xrPathToString, skipping binding scan");
            return result;
        }

        // SAFETY: the runtime just accepted this suggestion, so the array
        // it points to is valid for the rest of this call.
        let bindings = unsafe { suggested.bindings() };

        let resolved: Vec<(ActionHandle, String)> = bindings
            .iter()
            .filter_map(|binding| {
                match self.downstream.path_to_string(instance, binding.binding) {
                    Ok(path) if !path.is_empty() => Some((binding.action, path)),
                    Ok(_) => None,
                    Err(err) => {
                        debug!(path = binding.binding.0, %err, "could not resolve binding path");
                        None
                    }
                }
            })
            .collect();

        let tracked = self
            .classifier
            .observe(resolved.iter().map(|(action, path)| (*action, path.as_str())));
        debug!(suggested = bindings.len(), tracked, "binding suggestion scanned");
        result
    }

    /// `xrGetActionStateVector2f`: forward, then maybe add the signal to Y.
    pub fn get_action_state_vector2f(
        &self,
        session: SessionHandle,
        get_info: &ActionStateGetInfo,
        state: &mut ActionStateVector2f,
    ) -> XrResult {
        let result = self
            .downstream
            .get_action_state_vector2f(session, get_info, state);
        if let Some(velocity) = self.injectable(result, get_info, AxisQuery::Vector2f) {
            apply_vector2f(state, velocity);
            trace!(action = get_info.action.0, velocity, y = state.current_state.y, "injected vector2f");
        }
        result
    }

    /// `xrGetActionStateFloat`: forward, then maybe add the signal.
    pub fn get_action_state_float(
        &self,
        session: SessionHandle,
        get_info: &ActionStateGetInfo,
        state: &mut ActionStateFloat,
    ) -> XrResult {
        let result = self.downstream.get_action_state_float(session, get_info, state);
        if let Some(velocity) = self.injectable(result, get_info, AxisQuery::Float) {
            apply_float(state, velocity);
            trace!(action = get_info.action.0, velocity, value = state.current_state, "injected float");
        }
        result
    }

    /// `xrDestroyInstance`: drop local state, then forward.
    pub fn destroy(&self, instance: InstanceHandle) -> XrResult {
        self.classifier.clear();
        self.signal.disconnect();
        let result = self.downstream.destroy_instance(instance);
        info!(instance = instance.0, %result, "instance destroyed");
        result
    }

    /// Forwards a destroy for a handle this session does not own.
    pub fn forward_destroy(&self, instance: InstanceHandle) -> XrResult {
        self.downstream.destroy_instance(instance)
    }

    /// Early connection attempt right after instance creation.
    pub fn prime_signal(&self) -> bool {
        self.signal.prime()
    }

    /// The signal to inject for a forwarded query, if any.
    fn injectable(&self, forwarded: XrResult, get_info: &ActionStateGetInfo, query: AxisQuery) -> Option<f32> {
        if forwarded.failed() || !self.in_scope(get_info.subaction_path) {
            return None;
        }

        // Read before taking the classification lock; the two never nest.
        let velocity = self.signal.read();
        if !has_signal(velocity) {
            return None;
        }

        let membership = self.classifier.membership(get_info.action);
        should_inject(query, velocity, membership).then_some(velocity)
    }

    /// "any" or the left hand; every other subaction path is not ours.
    fn in_scope(&self, subaction_path: Path) -> bool {
        subaction_path.is_null() || subaction_path == self.left_hand
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use stride_abi::{ActionSuggestedBinding, Bool32, Vector2f};

    pub const LEFT: Path = Path(1);
    pub const RIGHT: Path = Path(2);

    /// Call log shared between the fakes, to check ordering.
    pub type Journal = Arc<Mutex<Vec<&'static str>>>;

    pub struct FakeRuntime {
        pub journal: Journal,
        pub paths: HashMap<Path, String>,
        pub resolves_paths: bool,
        pub suggest_result: XrResult,
        pub get_result: XrResult,
        pub forwarded_xy: Vector2f,
        pub forwarded_float: f32,
    }

    impl FakeRuntime {
        pub fn new(journal: Journal) -> Self {
            let paths = [
                (Path(10), "/user/hand/left/input/thumbstick"),
                (Path(11), "/user/hand/left/input/thumbstick/y"),
                (Path(12), "/user/hand/left/input/thumbstick/x"),
                (Path(13), "/user/hand/right/input/thumbstick"),
                (Path(14), ""),
            ]
            .into_iter()
            .map(|(path, s)| (path, s.to_string()))
            .collect();

            Self {
                journal,
                paths,
                resolves_paths: true,
                suggest_result: XrResult::SUCCESS,
                get_result: XrResult::SUCCESS,
                forwarded_xy: Vector2f { x: 0.25, y: 0.1 },
                forwarded_float: 0.1,
            }
        }
    }

    impl Downstream for FakeRuntime {
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
            self.journal.lock().push("destroy");
            XrResult::SUCCESS
        }

        fn can_resolve_paths(&self) -> bool {
            self.resolves_paths
        }

        fn path_to_string(&self, _instance: InstanceHandle, path: Path) -> Result<String, XrResult> {
            self.paths
                .get(&path)
                .cloned()
                .ok_or(XrResult::ERROR_PATH_INVALID)
        }

        fn suggest_interaction_profile_bindings(
            &self,
            _instance: InstanceHandle,
            _suggested: &InteractionProfileSuggestedBinding,
        ) -> XrResult {
            self.journal.lock().push("suggest");
            self.suggest_result
        }

        fn get_action_state_vector2f(
            &self,
            _session: SessionHandle,
            _get_info: &ActionStateGetInfo,
            state: &mut ActionStateVector2f,
        ) -> XrResult {
            if self.get_result.succeeded() {
                state.current_state = self.forwarded_xy;
                state.is_active = Bool32::TRUE;
                state.changed_since_last_sync = Bool32::FALSE;
            }
            self.get_result
        }

        fn get_action_state_float(
            &self,
            _session: SessionHandle,
            _get_info: &ActionStateGetInfo,
            state: &mut ActionStateFloat,
        ) -> XrResult {
            if self.get_result.succeeded() {
                state.current_state = self.forwarded_float;
                state.is_active = Bool32::FALSE;
                state.changed_since_last_sync = Bool32::FALSE;
            }
            self.get_result
        }
    }

    pub struct FixedSignal {
        pub value: Mutex<f32>,
        pub journal: Journal,
    }

    impl SignalSource for FixedSignal {
        fn read(&self) -> f32 {
            self.journal.lock().push("read");
            *self.value.lock()
        }

        fn prime(&self) -> bool {
            true
        }

        fn disconnect(&self) {
            self.journal.lock().push("disconnect");
        }
    }

    struct Harness {
        session: LayerSession,
        signal: Arc<FixedSignal>,
        journal: Journal,
    }

    fn harness_with(velocity: f32, configure: impl FnOnce(&mut FakeRuntime)) -> Harness {
        let journal: Journal = Arc::default();
        let mut runtime = FakeRuntime::new(journal.clone());
        configure(&mut runtime);
        let signal = Arc::new(FixedSignal {
            value: Mutex::new(velocity),
            journal: journal.clone(),
        });
        let session = LayerSession::new(InstanceHandle(0x1000), Box::new(runtime), signal.clone(), LEFT);
        Harness {
            session,
            signal,
            journal,
        }
    }

    fn harness(velocity: f32) -> Harness {
        harness_with(velocity, |_| {})
    }

    fn suggest(session: &LayerSession, bindings: &[(u64, u64)]) -> XrResult {
        let list: Vec<ActionSuggestedBinding> = bindings
            .iter()
            .map(|&(action, path)| ActionSuggestedBinding {
                action: ActionHandle(action),
                binding: Path(path),
            })
            .collect();
        let suggested = InteractionProfileSuggestedBinding::new(Path(100), &list);
        session.suggest_interaction_profile_bindings(session.instance(), &suggested)
    }

    fn get_xy(session: &LayerSession, action: u64, subaction: Path) -> (XrResult, ActionStateVector2f) {
        let info = ActionStateGetInfo::new(ActionHandle(action), subaction);
        let mut state = ActionStateVector2f::default();
        let result = session.get_action_state_vector2f(SessionHandle(7), &info, &mut state);
        (result, state)
    }

    fn get_float(session: &LayerSession, action: u64, subaction: Path) -> (XrResult, ActionStateFloat) {
        let info = ActionStateGetInfo::new(ActionHandle(action), subaction);
        let mut state = ActionStateFloat::default();
        let result = session.get_action_state_float(SessionHandle(7), &info, &mut state);
        (result, state)
    }

    #[test]
    fn zero_signal_returns_forwarded_state_untouched() {
        let h = harness(0.0);
        let (result, state) = get_xy(&h.session, 1, Path::NULL);

        let mut expected = ActionStateVector2f::default();
        expected.current_state = Vector2f { x: 0.25, y: 0.1 };
        expected.is_active = Bool32::TRUE;
        expected.changed_since_last_sync = Bool32::FALSE;

        assert_eq!(result, XrResult::SUCCESS);
        assert_eq!(state, expected);
    }

    #[test]
    fn vector_query_injects_everything_before_bindings() {
        let h = harness(0.5);
        for action in [1, 2, 99] {
            let (_, state) = get_xy(&h.session, action, Path::NULL);
            assert!((state.current_state.y - 0.6).abs() < 1e-6);
            assert_eq!(state.current_state.x, 0.25);
            assert_eq!(state.changed_since_last_sync, Bool32::TRUE);
        }
    }

    #[test]
    fn vector_query_injects_only_tracked_after_bindings() {
        let h = harness(0.5);
        assert_eq!(suggest(&h.session, &[(1, 10), (2, 11), (3, 12), (4, 13)]), XrResult::SUCCESS);

        let (_, tracked) = get_xy(&h.session, 1, Path::NULL);
        assert!((tracked.current_state.y - 0.6).abs() < 1e-6);

        for other in [2, 3, 4, 99] {
            let (_, state) = get_xy(&h.session, other, Path::NULL);
            assert_eq!(state.current_state.y, 0.1, "action {other}");
            assert_eq!(state.changed_since_last_sync, Bool32::FALSE);
        }
    }

    #[test]
    fn scalar_query_injects_only_y_axis_actions() {
        let h = harness(0.5);

        // nothing observed yet: no fallback for the scalar query
        let (_, state) = get_float(&h.session, 2, Path::NULL);
        assert_eq!(state.current_state, 0.1);
        assert_eq!(state.is_active, Bool32::FALSE);

        suggest(&h.session, &[(1, 10), (2, 11), (3, 12)]);

        let (_, state) = get_float(&h.session, 2, Path::NULL);
        assert!((state.current_state - 0.6).abs() < 1e-6);
        assert_eq!(state.is_active, Bool32::TRUE);
        assert_eq!(state.changed_since_last_sync, Bool32::TRUE);

        for other in [1, 3] {
            let (_, state) = get_float(&h.session, other, Path::NULL);
            assert_eq!(state.current_state, 0.1);
        }
    }

    #[test]
    fn injection_clamps() {
        let h = harness(0.95);
        let (_, state) = get_xy(&h.session, 1, Path::NULL);
        assert_eq!(state.current_state.y, 1.0);

        *h.signal.value.lock() = -3.0;
        let (_, state) = get_xy(&h.session, 1, Path::NULL);
        assert_eq!(state.current_state.y, -1.0);
    }

    #[test]
    fn subaction_scope_filters_injection() {
        let h = harness(0.5);

        let (_, any) = get_xy(&h.session, 1, Path::NULL);
        let (_, left) = get_xy(&h.session, 1, LEFT);
        let (_, right) = get_xy(&h.session, 1, RIGHT);

        assert!((any.current_state.y - 0.6).abs() < 1e-6);
        assert!((left.current_state.y - 0.6).abs() < 1e-6);
        assert_eq!(right.current_state.y, 0.1);
    }

    #[test]
    fn out_of_scope_query_does_not_touch_the_signal() {
        let h = harness(0.5);
        get_xy(&h.session, 1, RIGHT);
        assert!(h.journal.lock().is_empty());
    }

    #[test]
    fn unresolved_left_hand_only_accepts_any() {
        let journal: Journal = Arc::default();
        let signal = Arc::new(FixedSignal {
            value: Mutex::new(0.5),
            journal: journal.clone(),
        });
        let session = LayerSession::new(
            InstanceHandle(1),
            Box::new(FakeRuntime::new(journal)),
            signal,
            Path::NULL,
        );

        let (_, left) = get_xy(&session, 1, LEFT);
        let (_, any) = get_xy(&session, 1, Path::NULL);
        assert_eq!(left.current_state.y, 0.1);
        assert!((any.current_state.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn upstream_failure_is_returned_untouched() {
        let h = harness_with(0.5, |rt| rt.get_result = XrResult::ERROR_HANDLE_INVALID);

        let (result, state) = get_xy(&h.session, 1, Path::NULL);
        assert_eq!(result, XrResult::ERROR_HANDLE_INVALID);
        assert_eq!(state, ActionStateVector2f::default());

        let (result, state) = get_float(&h.session, 1, Path::NULL);
        assert_eq!(result, XrResult::ERROR_HANDLE_INVALID);
        assert_eq!(state, ActionStateFloat::default());
        assert!(!h.journal.lock().contains(&"read"));
    }

    #[test]
    fn qualified_success_still_injects() {
        // XR_SESSION_LOSS_PENDING
        let h = harness_with(0.5, |rt| rt.get_result = XrResult(3));
        let (result, state) = get_xy(&h.session, 1, Path::NULL);
        assert_eq!(result, XrResult(3));
        assert!((state.current_state.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn rejected_suggestion_is_not_classified() {
        let h = harness_with(0.5, |rt| rt.suggest_result = XrResult::ERROR_PATH_INVALID);

        assert_eq!(suggest(&h.session, &[(1, 10)]), XrResult::ERROR_PATH_INVALID);
        assert!(!h.session.classifier().snapshot().bindings_observed());
    }

    #[test]
    fn suggestion_forwards_before_classifying() {
        let h = harness(0.5);
        suggest(&h.session, &[(1, 10)]);
        assert_eq!(h.journal.lock().as_slice(), &["suggest"]);
        assert!(h.session.classifier().membership(ActionHandle(1)).in_vector2f);
    }

    #[test]
    fn missing_path_resolver_keeps_fallback() {
        let h = harness_with(0.5, |rt| rt.resolves_paths = false);

        assert_eq!(suggest(&h.session, &[(1, 10), (2, 11)]), XrResult::SUCCESS);
        assert!(!h.session.classifier().snapshot().bindings_observed());

        let (_, state) = get_xy(&h.session, 42, Path::NULL);
        assert!((state.current_state.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn unresolvable_and_empty_paths_are_skipped() {
        let h = harness(0.5);
        // 14 resolves to "", 77 is unknown to the runtime
        suggest(&h.session, &[(5, 14), (6, 77), (7, 11)]);

        let snapshot = h.session.classifier().snapshot();
        assert_eq!(snapshot.float_y_actions().len(), 1);
        assert!(snapshot.float_y_actions().contains(&ActionHandle(7)));
        assert!(snapshot.vector2f_actions().is_empty());
    }

    #[test]
    fn repeated_suggestion_changes_nothing() {
        let h = harness(0.5);
        let bindings = [(1, 10), (2, 11), (3, 12)];
        suggest(&h.session, &bindings);
        let first = h.session.classifier().snapshot();
        suggest(&h.session, &bindings);
        assert_eq!(h.session.classifier().snapshot(), first);
    }

    #[test]
    fn destroy_clears_state_before_forwarding() {
        let h = harness(0.5);
        suggest(&h.session, &[(1, 10), (2, 11)]);
        h.journal.lock().clear();

        assert_eq!(h.session.destroy(h.session.instance()), XrResult::SUCCESS);
        assert_eq!(h.journal.lock().as_slice(), &["disconnect", "destroy"]);
        assert_eq!(h.session.classifier().snapshot(), Default::default());
    }
}
