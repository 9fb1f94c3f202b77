//! Top-level cost-engine error, mapping every failure mode of §7 onto the
//! reserved result codes the compiler-side caller switches on.

use thiserror::Error;

use crate::predictor::PredictorError;
use crate::tensor::TensorError;
use crate::validator::ValidationReport;

/// Stable error code surfaced alongside [`CostError`] for callers that
/// branch on an integer rather than match the Rust enum (the serializer
/// and CLI both print this).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoError,
    ErrInvalidInputConfiguration,
    ErrInputTooBig,
    ErrInferenceNotPossible,
    ErrProfilingService,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoError => "NO_ERROR",
            ErrorCode::ErrInvalidInputConfiguration => "ERR_INVALID_INPUT_CONFIGURATION",
            ErrorCode::ErrInputTooBig => "ERR_INPUT_TOO_BIG",
            ErrorCode::ErrInferenceNotPossible => "ERR_INFERENCE_NOT_POSSIBLE",
            ErrorCode::ErrProfilingService => "ERR_PROFILING_SERVICE",
        }
    }
}

#[derive(Debug, Error)]
pub enum CostError {
    #[error("workload failed validation: {0:?}")]
    InvalidConfiguration(ValidationReport),

    #[error("workload input/output memory exceeds the device's CMX budget: needs {needed} bytes, budget is {budget} bytes")]
    InputTooBig { needed: u64, budget: u64 },

    #[error("tensor is not representable: {0}")]
    NotRepresentable(#[from] TensorError),

    #[error("cost prediction is not possible for this workload: {0}")]
    InferenceNotPossible(String),

    #[error("remote profiling service error: {0}")]
    ProfilingService(#[from] PredictorError),
}

impl CostError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CostError::InvalidConfiguration(_) => ErrorCode::ErrInvalidInputConfiguration,
            CostError::InputTooBig { .. } => ErrorCode::ErrInputTooBig,
            CostError::NotRepresentable(_) => ErrorCode::ErrInvalidInputConfiguration,
            CostError::InferenceNotPossible(_) => ErrorCode::ErrInferenceNotPossible,
            CostError::ProfilingService(_) => ErrorCode::ErrProfilingService,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_round_trip_to_stable_strings() {
        assert_eq!(ErrorCode::NoError.as_str(), "NO_ERROR");
        assert_eq!(ErrorCode::ErrInputTooBig.as_str(), "ERR_INPUT_TOO_BIG");
    }

    #[test]
    fn input_too_big_maps_to_its_code() {
        let err = CostError::InputTooBig { needed: 100, budget: 50 };
        assert_eq!(err.code(), ErrorCode::ErrInputTooBig);
    }
}
