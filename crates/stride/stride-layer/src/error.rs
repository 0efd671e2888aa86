use stride_abi::XrResult;

/// Why bringing the layer up failed. Everything except a downstream
/// failure surfaces to the loader as `XR_ERROR_INITIALIZATION_FAILED`.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("null {0} pointer")]
    NullArgument(&'static str),

    #[error("unexpected loader struct type {0}")]
    LoaderStruct(i32),

    #[error("loader interface versions {min}..={max} do not include version 1")]
    InterfaceVersion { min: u32, max: u32 },

    #[error("loader handed over no next-link info")]
    NextInfoMissing,

    #[error("next link is missing its create or lookup entry point")]
    NextEntryPointsMissing,

    #[error("next link failed with {0}")]
    Downstream(XrResult),

    #[error("next link does not provide {0}")]
    Unresolved(&'static str),
}

impl LayerError {
    /// The status the loader sees. A failing next link keeps its own code.
    pub fn to_result(&self) -> XrResult {
        match self {
            Self::Downstream(code) => *code,
            _ => XrResult::ERROR_INITIALIZATION_FAILED,
        }
    }
}
