//! Injection policy: whether to add the signal to a forwarded result, and
//! what the result becomes when we do.
//!
//! Only the decision and the arithmetic live here; forwarding and the
//! subaction filter belong to the dispatcher.

use crate::classifier::Membership;
use stride_abi::{ActionStateFloat, ActionStateVector2f, Bool32};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisQuery {
    /// `xrGetActionStateVector2f`
    Vector2f,
    /// `xrGetActionStateFloat`
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Injection {
    pub value: f32,
    pub is_active: bool,
    pub changed_since_last_sync: bool,
}

/// Whether a read value carries anything to add.
#[inline]
pub fn has_signal(velocity: f32) -> bool {
    velocity != 0.0 && velocity.is_finite()
}

/// Decides whether a successful query gets the signal added.
///
/// A zero (or non-finite) signal never injects. The 2-D query falls back
/// to injecting when no binding has been observed yet; the scalar query
/// has no such fallback.
pub fn should_inject(query: AxisQuery, velocity: f32, membership: Membership) -> bool {
    if !has_signal(velocity) {
        return false;
    }

    match query {
        AxisQuery::Vector2f => membership.in_vector2f || !membership.bindings_observed,
        AxisQuery::Float => membership.in_float_y,
    }
}

/// `clamp(current + velocity, -1, 1)`, flagged fresh.
///
/// The freshness flags are set even if clamping leaves the number as it was.
#[inline]
pub fn inject(current: f32, velocity: f32) -> Injection {
    Injection {
        value: (current + velocity).clamp(-1.0, 1.0),
        is_active: true,
        changed_since_last_sync: true,
    }
}

/// Injects into the Y component only; X is left as forwarded.
pub fn apply_vector2f(state: &mut ActionStateVector2f, velocity: f32) {
    let injection = inject(state.current_state.y, velocity);
    state.current_state.y = injection.value;
    state.is_active = Bool32::from(injection.is_active);
    state.changed_since_last_sync = Bool32::from(injection.changed_since_last_sync);
}

pub fn apply_float(state: &mut ActionStateFloat, velocity: f32) {
    let injection = inject(state.current_state, velocity);
    state.current_state = injection.value;
    state.is_active = Bool32::from(injection.is_active);
    state.changed_since_last_sync = Bool32::from(injection.changed_since_last_sync);
}
