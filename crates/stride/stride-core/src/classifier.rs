// Which actions are "the left thumbstick"?
//
// The application tells the runtime once per interaction profile which
// control path each action is bound to (xrSuggestInteractionProfileBindings).
// We watch those suggestions and keep two sets:
//
//   vector2f  actions bound to the whole left stick   .../left/input/thumbstick
//   float_y   actions bound to the left stick Y axis  .../left/input/thumbstick/y
//
// An explicit X binding is of interest (it proves bindings were seen) but
// lands in neither set. Entries only ever get added; the whole state is
// dropped at instance teardown.
//
// Path strings are resolved by the caller before the lock is taken, so the
// lock never spans a call into the runtime.

use parking_lot::Mutex;
use std::collections::HashSet;
use stride_abi::ActionHandle;
use tracing::debug;

/// Top-level user path of the left hand.
pub const LEFT_HAND_PATH: &str = "/user/hand/left";

const THUMBSTICK: &str = "thumbstick";
const THUMBSTICK_X: &str = "thumbstick/x";
const THUMBSTICK_Y: &str = "thumbstick/y";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// Whole stick, 2-D state.
    Vector2f,
    /// Y component as a scalar.
    FloatY,
    /// X component as a scalar. Never injected into.
    FloatX,
}

impl BindingKind {
    /// `None` unless the path is a left-hand thumbstick control.
    pub fn classify(path: &str) -> Option<Self> {
        if !path.contains(LEFT_HAND_PATH) || !path.contains(THUMBSTICK) {
            return None;
        }

        Some(if path.contains(THUMBSTICK_Y) {
            Self::FloatY
        } else if path.contains(THUMBSTICK_X) {
            Self::FloatX
        } else {
            Self::Vector2f
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classification {
    vector2f: HashSet<ActionHandle>,
    float_y: HashSet<ActionHandle>,
    bindings_observed: bool,
}

impl Classification {
    pub fn vector2f_actions(&self) -> &HashSet<ActionHandle> {
        &self.vector2f
    }

    pub fn float_y_actions(&self) -> &HashSet<ActionHandle> {
        &self.float_y
    }

    pub fn bindings_observed(&self) -> bool {
        self.bindings_observed
    }

    pub fn membership(&self, action: ActionHandle) -> Membership {
        Membership {
            in_vector2f: self.vector2f.contains(&action),
            in_float_y: self.float_y.contains(&action),
            bindings_observed: self.bindings_observed,
        }
    }

    fn record(&mut self, action: ActionHandle, kind: BindingKind) {
        match kind {
            BindingKind::Vector2f => {
                self.vector2f.insert(action);
            }
            BindingKind::FloatY => {
                self.float_y.insert(action);
            }
            BindingKind::FloatX => {}
        }
        self.bindings_observed = true;
    }
}

/// What the classification says about one action, captured under the lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Membership {
    pub in_vector2f: bool,
    pub in_float_y: bool,
    pub bindings_observed: bool,
}

/// Process-side classification shared by every intercepted call of one
/// instance. One writer (binding suggestions), many readers (get-state).
#[derive(Debug, Default)]
pub struct BindingClassifier {
    state: Mutex<Classification>,
}

impl BindingClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one suggestion event into the classification.
    ///
    /// `bindings` yields each suggested action with its resolved path string.
    /// Empty strings are skipped. Returns how many bindings were of interest.
    pub fn observe<'a, I>(&self, bindings: I) -> usize
    where
        I: IntoIterator<Item = (ActionHandle, &'a str)>,
    {
        let tracked: Vec<(ActionHandle, BindingKind)> = bindings
            .into_iter()
            .filter(|(_, path)| !path.is_empty())
            .filter_map(|(action, path)| {
                let kind = BindingKind::classify(path)?;
                debug!(path, action = action.0, ?kind, "tracked binding");
                Some((action, kind))
            })
            .collect();

        if tracked.is_empty() {
            return 0;
        }

        let mut state = self.state.lock();
        for &(action, kind) in &tracked {
            state.record(action, kind);
        }
        tracked.len()
    }

    pub fn membership(&self, action: ActionHandle) -> Membership {
        self.state.lock().membership(action)
    }

    pub fn snapshot(&self) -> Classification {
        self.state.lock().clone()
    }

    pub fn clear(&self) {
        *self.state.lock() = Classification::default();
    }
}
