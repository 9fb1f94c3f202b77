//! Deterministic placeholder predictor.
//!
//! The real cost model is a regression network trained offline on
//! profiled hardware runs; shipping it is out of scope here (see
//! `DESIGN.md`). This implementation stands in for it with a simple,
//! fully deterministic estimate derived from compute volume and
//! datatype width, so the rest of the engine (validation, memory
//! accounting, fingerprinting) can be exercised end to end without a
//! network dependency or a trained model file.

use crate::behavior::{behavior_for, deduce_weight};
use crate::predictor::{CostEstimate, Predictor, PredictorError};
use crate::workload::OperationRecord;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPredictor;

impl LocalPredictor {
    pub fn new() -> Self {
        Self
    }
}

impl Predictor for LocalPredictor {
    fn predict(&self, record: &OperationRecord) -> Result<CostEstimate, PredictorError> {
        let behavior = behavior_for(record.op);
        let output_volume = record.output_0.volume();
        let weight_volume = if behavior.is_weightless() {
            1
        } else {
            behavior.weight_volume(&deduce_weight(record)).max(1)
        };
        let kernel_area = (record.kernel.h as u64 * record.kernel.w as u64).max(1);
        let macs = output_volume * weight_volume * kernel_area;
        let bits = record.input_0.dtype.bits() as f64;
        // Wider types cost proportionally more cycles per MAC; this is a
        // rough placeholder, not a trained relationship.
        let cycles = (macs as f64) * (bits / 8.0).max(0.125);
        Ok(CostEstimate { cycles, confidence: Some(0.0) })
    }

    fn name(&self) -> &str {
        "local-placeholder"
    }
}
