use thiserror::Error;

/// Errors from the core generation and meshing operations. Degenerate inputs
/// (empty grids, fully solid grids, lone tiles) are never errors, they just
/// produce degenerate output. These only indicate a bug in the caller's
/// input, so nothing here is retryable.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenError {
    /// An argument was outside its allowed range, e.g. a zero-width grid
    #[error("invalid argument `{name}`: {message}")]
    InvalidArgument {
        name: &'static str,
        message: String,
    },

    /// A value was internally inconsistent, e.g. a chunk whose grid doesn't
    /// match its declared dimensions
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl GenError {
    pub(crate) fn invalid_argument(
        name: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }
}
