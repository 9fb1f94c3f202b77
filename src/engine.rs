//! Cost engine orchestration (C8): validate, size against CMX, fingerprint,
//! then hand off to a [`Predictor`]. Grounded on `compile/engine.rs`'s
//! staged pipeline shape (parse → analyze → generate), reused here for
//! validate → size → predict.

use thiserror::Error;

use crate::behavior::{behavior_for, deduce_weight};
use crate::device::DeviceLimits;
use crate::error::CostError;
use crate::predictor::{CostEstimate, Predictor};
use crate::sep::Sep;
use crate::tensor::Tensor;
use crate::types::{DIM_B, DIM_C, DIM_H, DIM_W};
use crate::validator::{self, ValidationReport};
use crate::workload::{OperationRecord, Workload};

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("workload needs {needed} bytes of CMX, device budget is {budget} bytes")]
    ExceedsBudget { needed: u64, budget: u64 },
}

/// Rounds `value` up to the next multiple of `multiple` (no-op if
/// `multiple` is zero).
fn align_to(value: u64, multiple: u64) -> u64 {
    if multiple == 0 {
        return value;
    }
    value.div_ceil(multiple) * multiple
}

/// `elements` packed at `dtype`'s bit width, rounding any partial trailing
/// byte up (mirrors the packmode-0 contract `Tensor::size_bytes` applies
/// per-row, collapsed to a flat element count for weight-table/sparsity
/// bookkeeping where there's no shape to pack against).
fn raw_bytes(elements: u64, dtype: crate::types::DataType) -> u64 {
    let bits = dtype.bits() as u64;
    if bits >= 8 {
        return elements * dtype.bytes() as u64;
    }
    let per_byte = 8 / bits;
    let complete = elements / per_byte;
    let tail = elements % per_byte;
    complete + if tail == 0 { 0 } else { 1 }
}

/// Per-role memory footprint of a validated operation, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryBreakdown {
    pub input_0_bytes: u64,
    pub output_0_bytes: u64,
    pub weight_bytes: u64,
    pub sep_pointer_table_bytes: u64,
}

impl MemoryBreakdown {
    pub fn total_bytes(&self) -> u64 {
        self.input_0_bytes + self.output_0_bytes + self.weight_bytes + self.sep_pointer_table_bytes
    }

    /// Sum of each role's footprint after independently page-aligning it
    /// to `limits.alignment_size_bytes` — the quantity actually compared
    /// against a device's CMX budget, mirroring the `*_aligned_size_bytes`
    /// wrappers that page-align each `*_contiguous_size_bytes` role before
    /// summing for the CMX fit check.
    pub fn aligned_total_bytes(&self, limits: &DeviceLimits) -> u64 {
        let page = limits.alignment_size_bytes as u64;
        align_to(self.input_0_bytes, page)
            + align_to(self.output_0_bytes, page)
            + align_to(self.weight_bytes, page)
            + align_to(self.sep_pointer_table_bytes, page)
    }
}

/// Full diagnostic result of costing one operation: the validation report,
/// the memory accounting, the fingerprint, and (if costing succeeded) the
/// predicted cycle count. Returned by [`CostEngine::cost_info`] for callers
/// that want the "why" alongside the number.
#[derive(Debug, Clone)]
pub struct CostInfo {
    pub report: ValidationReport,
    pub memory: MemoryBreakdown,
    pub fingerprint: u32,
    pub estimate: Option<CostEstimate>,
}

/// `input_0`'s compute-tensor volume used for sparsity-map sizing, with
/// CM_CONV's channel clamp applied (its control mask only ever reads 4 or
/// 16 lanes, never the tensor's declared channel count).
fn input_0_sparsity_volume(record: &OperationRecord) -> u64 {
    let shape = record.input_0.shape;
    let channels = behavior_for(record.op).input_0_memory_channels(shape[DIM_C]);
    shape[DIM_W] as u64 * shape[DIM_H] as u64 * channels as u64 * shape[DIM_B] as u64
}

fn memory_breakdown(record: &OperationRecord) -> MemoryBreakdown {
    let sparsity_volume = input_0_sparsity_volume(record);

    let (input_0_bytes, sep_pointer_table_bytes) = if record.sep.enabled {
        let data_bytes = actual_input_tensor(record, &record.sep).size_bytes();
        let sparsity_bytes = if record.sep.no_sparse_map { 0 } else { align_to(sparsity_volume / 8, 16) };
        (data_bytes + sparsity_bytes, record.sep.pointer_table_bytes())
    } else {
        let data_bytes = Tensor { shape: record.input_0_memory_dense, ..record.input_0 }.size_bytes();
        let sparsity_bytes = if record.input_0.sparse { align_to(sparsity_volume / 8, 16) } else { 0 };
        (data_bytes + sparsity_bytes, 0)
    };

    let output_0_memory_volume: u64 = record.output_0_memory_dense.iter().map(|&d| d as u64).product();
    let output_0_data_bytes = Tensor { shape: record.output_0_memory_dense, ..record.output_0 }.size_bytes();
    let output_0_sparsity_bytes =
        if record.output_0.sparse { align_to(output_0_memory_volume / 8, 16) } else { 0 };
    let output_0_bytes = output_0_data_bytes + output_0_sparsity_bytes;

    let behavior = behavior_for(record.op);
    let weight_bytes = if behavior.is_weightless() {
        0
    } else {
        let weight = deduce_weight(record);
        let elements = behavior.weight_volume(&weight);
        let mut bytes = raw_bytes(elements, record.effective_weight_type());

        if record.weight_sparsity_enabled {
            bytes -= (bytes as f64 * record.weight_sparsity as f64).floor() as u64;
            let kernel_bits = record.input_0.shape[DIM_C] * record.kernel.h * record.kernel.w;
            let one_output_sparse_bitmap = align_to(kernel_bits as u64 / 8, 16);
            bytes += record.output_0.shape[DIM_C] as u64 * one_output_sparse_bitmap;
        }

        // Weight-table overhead: one 16-byte entry per output channel.
        bytes + record.output_0.shape[DIM_C] as u64 * 16
    };

    MemoryBreakdown { input_0_bytes, output_0_bytes, weight_bytes, sep_pointer_table_bytes }
}

fn actual_input_tensor(record: &OperationRecord, sep: &Sep) -> Tensor {
    Tensor { shape: sep.actual_input_shape, ..record.input_0 }
}

/// Orchestrates the full validate → size → fingerprint → predict pipeline
/// against one backing [`Predictor`].
pub struct CostEngine<P: Predictor> {
    predictor: P,
}

impl<P: Predictor> CostEngine<P> {
    pub fn new(predictor: P) -> Self {
        Self { predictor }
    }

    /// Full diagnostic view: runs validation and memory accounting
    /// regardless of outcome, and only calls the predictor if both pass.
    pub fn cost_info(&self, workload: &Workload) -> CostInfo {
        let record = OperationRecord::from_workload(workload);
        let limits: DeviceLimits = record.device.limits();
        tracing::trace!(op = ?record.op, device = ?record.device, "cost_info: validating");
        let report = validator::validate(&record, &limits);
        let memory = memory_breakdown(&record);
        let fp = record.fingerprint();

        let aligned_bytes = memory.aligned_total_bytes(&limits);
        let estimate = if report.is_valid() && aligned_bytes <= limits.cmx_size_bytes {
            self.predictor.predict(&record).ok()
        } else {
            tracing::debug!(aligned_bytes, valid = report.is_valid(), "cost_info: skipping predictor");
            None
        };

        CostInfo { report, memory, fingerprint: fp, estimate }
    }

    /// Costs a single workload, short-circuiting on the first failure
    /// mode in validate → size → predict order.
    pub fn cost(&self, workload: &Workload) -> Result<CostEstimate, CostError> {
        let record = OperationRecord::from_workload(workload);
        let limits = record.device.limits();

        let report = validator::validate(&record, &limits);
        if !report.is_valid() {
            tracing::warn!(op = ?record.op, issues = report.issues.len(), "cost: workload failed validation");
            return Err(CostError::InvalidConfiguration(report));
        }

        let memory = memory_breakdown(&record);
        let needed = memory.aligned_total_bytes(&limits);
        if needed > limits.cmx_size_bytes {
            tracing::warn!(needed, budget = limits.cmx_size_bytes, "cost: workload exceeds CMX budget");
            return Err(CostError::InputTooBig { needed, budget: limits.cmx_size_bytes });
        }

        tracing::debug!(predictor = self.predictor.name(), "cost: handing off to predictor");
        self.predictor.predict(&record).map_err(CostError::from)
    }

    /// Costs a batch; each workload's outcome is independent of the
    /// others' (no early return on the first failure).
    pub fn cost_batch(&self, workloads: &[Workload]) -> Vec<Result<CostEstimate, CostError>> {
        workloads.iter().map(|w| self.cost(w)).collect()
    }
}
