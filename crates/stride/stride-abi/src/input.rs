use crate::handles::{ActionHandle, Path};
use std::ffi::c_void;
use std::ptr;

/// `XrStructureType`, restricted to the tags the layer reads or writes.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StructureType(pub i32);

impl StructureType {
    pub const ACTION_STATE_FLOAT: Self = Self(24);
    pub const ACTION_STATE_VECTOR2F: Self = Self(25);
    pub const ACTION_STATE_GET_INFO: Self = Self(58);
    pub const INTERACTION_PROFILE_SUGGESTED_BINDING: Self = Self(51);
}

/// `XrBool32`
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Bool32(pub u32);

impl Bool32 {
    pub const FALSE: Self = Self(0);
    pub const TRUE: Self = Self(1);
}

impl From<bool> for Bool32 {
    fn from(value: bool) -> Self {
        if value { Self::TRUE } else { Self::FALSE }
    }
}

/// `XrTime`, nanoseconds on the runtime's clock.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(pub i64);

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

/// `XrActionStateGetInfo`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ActionStateGetInfo {
    pub ty: StructureType,
    pub next: *const c_void,
    pub action: ActionHandle,
    /// `Path::NULL` means "any subaction path".
    pub subaction_path: Path,
}

impl ActionStateGetInfo {
    pub fn new(action: ActionHandle, subaction_path: Path) -> Self {
        Self {
            ty: StructureType::ACTION_STATE_GET_INFO,
            next: ptr::null(),
            action,
            subaction_path,
        }
    }
}

/// `XrActionStateFloat`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionStateFloat {
    pub ty: StructureType,
    pub next: *mut c_void,
    pub current_state: f32,
    pub changed_since_last_sync: Bool32,
    pub last_change_time: Time,
    pub is_active: Bool32,
}

impl Default for ActionStateFloat {
    fn default() -> Self {
        Self {
            ty: StructureType::ACTION_STATE_FLOAT,
            next: ptr::null_mut(),
            current_state: 0.0,
            changed_since_last_sync: Bool32::FALSE,
            last_change_time: Time::default(),
            is_active: Bool32::FALSE,
        }
    }
}

/// `XrActionStateVector2f`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionStateVector2f {
    pub ty: StructureType,
    pub next: *mut c_void,
    pub current_state: Vector2f,
    pub changed_since_last_sync: Bool32,
    pub last_change_time: Time,
    pub is_active: Bool32,
}

impl Default for ActionStateVector2f {
    fn default() -> Self {
        Self {
            ty: StructureType::ACTION_STATE_VECTOR2F,
            next: ptr::null_mut(),
            current_state: Vector2f::default(),
            changed_since_last_sync: Bool32::FALSE,
            last_change_time: Time::default(),
            is_active: Bool32::FALSE,
        }
    }
}

/// `XrActionSuggestedBinding`: one action → control path proposal.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionSuggestedBinding {
    pub action: ActionHandle,
    pub binding: Path,
}

/// `XrInteractionProfileSuggestedBinding`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct InteractionProfileSuggestedBinding {
    pub ty: StructureType,
    pub next: *const c_void,
    pub interaction_profile: Path,
    pub count_suggested_bindings: u32,
    pub suggested_bindings: *const ActionSuggestedBinding,
}

impl InteractionProfileSuggestedBinding {
    /// Builds a suggestion that borrows `bindings`; the returned value must
    /// not outlive the slice.
    pub fn new(interaction_profile: Path, bindings: &[ActionSuggestedBinding]) -> Self {
        Self {
            ty: StructureType::INTERACTION_PROFILE_SUGGESTED_BINDING,
            next: ptr::null(),
            interaction_profile,
            count_suggested_bindings: bindings.len() as u32,
            suggested_bindings: bindings.as_ptr(),
        }
    }

    /// Views the suggested-binding array.
    ///
    /// # Safety
    /// `suggested_bindings` must point to `count_suggested_bindings` valid
    /// entries that stay alive and unmodified for the returned lifetime.
    /// A null pointer or a zero count yields an empty slice.
    #[allow(unsafe_code)]
    pub unsafe fn bindings(&self) -> &[ActionSuggestedBinding] {
        if self.suggested_bindings.is_null() || self.count_suggested_bindings == 0 {
            return &[];
        }
        // SAFETY: upheld by the caller, see above.
        unsafe {
            std::slice::from_raw_parts(
                self.suggested_bindings,
                self.count_suggested_bindings as usize,
            )
        }
    }
}
