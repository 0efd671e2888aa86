pub mod classifier;
pub mod policy;

pub use classifier::{BindingClassifier, BindingKind, Classification, LEFT_HAND_PATH, Membership};
pub use policy::{AxisQuery, Injection, apply_float, apply_vector2f, has_signal, inject, should_inject};
