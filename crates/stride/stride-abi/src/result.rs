use std::fmt;

/// `XrResult`. Non-negative values are successes (including qualified
/// successes), negative values are failures.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct XrResult(pub i32);

impl XrResult {
    pub const SUCCESS: Self = Self(0);
    pub const ERROR_VALIDATION_FAILURE: Self = Self(-1);
    pub const ERROR_FUNCTION_UNSUPPORTED: Self = Self(-7);
    pub const ERROR_HANDLE_INVALID: Self = Self(-12);
    pub const ERROR_PATH_INVALID: Self = Self(-19);
    pub const ERROR_PATH_FORMAT_INVALID: Self = Self(-21);
    pub const ERROR_INITIALIZATION_FAILED: Self = Self(-6);

    #[inline]
    pub fn succeeded(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub fn failed(self) -> bool {
        self.0 < 0
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::SUCCESS => "XR_SUCCESS",
            Self::ERROR_VALIDATION_FAILURE => "XR_ERROR_VALIDATION_FAILURE",
            Self::ERROR_FUNCTION_UNSUPPORTED => "XR_ERROR_FUNCTION_UNSUPPORTED",
            Self::ERROR_HANDLE_INVALID => "XR_ERROR_HANDLE_INVALID",
            Self::ERROR_PATH_INVALID => "XR_ERROR_PATH_INVALID",
            Self::ERROR_PATH_FORMAT_INVALID => "XR_ERROR_PATH_FORMAT_INVALID",
            Self::ERROR_INITIALIZATION_FAILED => "XR_ERROR_INITIALIZATION_FAILED",
            _ => return None,
        })
    }
}

impl fmt::Debug for XrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "XrResult({})", self.0),
        }
    }
}

impl fmt::Display for XrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
