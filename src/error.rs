//! Error type shared by the filters, the pipeline and the bindings.

use thiserror::Error;

/// Errors raised by grain outline processing.
#[derive(Debug, Error)]
pub enum GrainError {
    /// An image index outside the workbench.
    #[error("image index {index} out of range (have {len} images)")]
    InvalidIndex { index: usize, len: usize },

    /// Kernel weights do not form an odd-sided square.
    #[error("invalid kernel: {len} weights do not form an odd-sided square")]
    InvalidKernel { len: usize },

    /// Gaussian sigma that is not finite or exceeds [`MAX_BLUR_SIGMA`].
    ///
    /// [`MAX_BLUR_SIGMA`]: crate::filters::kernel::MAX_BLUR_SIGMA
    #[error("invalid blur sigma {sigma}")]
    InvalidSigma { sigma: f32 },

    /// The session at `index` has no source image.
    #[error("image {index} has no source pixels")]
    MissingSource { index: usize },

    /// Raw pixel data does not match the declared size.
    #[error("pixel data of length {len} does not match {width}x{height} RGBA")]
    InvalidDimensions { width: usize, height: usize, len: usize },

    /// The point sampler would exceed its configured work bound.
    #[error("point sampling needs {work} comparisons, budget is {budget}")]
    SamplingBudgetExceeded { work: u64, budget: u64 },

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl GrainError {
    /// Whether a host binding may treat this error as a no-op.
    ///
    /// Bad indices and missing images come from user input and are ignored;
    /// everything else points at a programming or configuration mistake.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GrainError::InvalidIndex { .. } | GrainError::MissingSource { .. }
        )
    }
}

/// Result type for grain outline operations.
pub type GrainResult<T> = Result<T, GrainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(GrainError::InvalidIndex { index: 3, len: 1 }.is_recoverable());
        assert!(GrainError::MissingSource { index: 0 }.is_recoverable());
        assert!(!GrainError::InvalidKernel { len: 8 }.is_recoverable());
        assert!(!GrainError::InvalidSigma { sigma: f32::NAN }.is_recoverable());
        assert!(!GrainError::InvalidConfig("x".into()).is_recoverable());
    }

    #[test]
    fn test_display_mentions_values() {
        let msg = GrainError::InvalidDimensions { width: 2, height: 3, len: 5 }.to_string();
        assert!(msg.contains("2x3"));
        assert!(msg.contains('5'));
    }
}
