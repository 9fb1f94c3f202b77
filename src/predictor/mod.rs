//! Cost predictor abstraction (C10): once a workload has been validated and
//! fits the device's CMX budget, something still has to turn it into a
//! cycle count. That "something" is out of scope for this engine — it's
//! either a learned regression model trained elsewhere or a live HTTP
//! profiling service — so this module only defines the seam.

pub mod local;
pub mod remote;

use thiserror::Error;

use crate::workload::OperationRecord;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("local predictor has no model loaded")]
    ModelNotLoaded,

    #[error("remote profiling request failed: {0}")]
    Network(String),

    #[error("remote profiling service returned HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },

    #[error("remote profiling service response could not be parsed: {0}")]
    MalformedResponse(String),

    #[error("remote profiling service reported the workload could not be run: {0}")]
    Unrunnable(String),
}

/// A predicted cost in device cycles, plus whatever confidence signal the
/// backing predictor can offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub cycles: f64,
    /// `1.0` for an exact remote measurement, `< 1.0` for a model's
    /// self-reported confidence; `None` when the predictor doesn't know.
    pub confidence: Option<f32>,
}

/// Implemented by anything that can turn a validated, in-budget operation
/// into a cycle-count estimate.
pub trait Predictor {
    fn predict(&self, record: &OperationRecord) -> Result<CostEstimate, PredictorError>;

    /// Human-readable identifier surfaced in diagnostics (`cost_info`).
    fn name(&self) -> &str;
}
