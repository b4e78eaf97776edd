use thiserror::Error;

/// Errors returned by matcher operations.
///
/// Conditions caused by insufficient data (empty registry, no reference
/// set, too few samples) are not errors; they are reported through the
/// result types of the corresponding operation.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl MatchError {
    pub(crate) fn check_dim(expected: usize, got: usize) -> Result<(), MatchError> {
        if expected != got {
            return Err(MatchError::DimensionMismatch { expected, got });
        }
        Ok(())
    }
}
