//! Canonical per-operation descriptor (C3), grounded on
//! `include/vpu/dpu_workload.h` / `src/vpu/dpu_workload.cpp`.

use crate::halo::Halo;
use crate::sep::Sep;
use crate::tensor::Tensor;
use crate::types::{ActivationFunction, DataType, Device, ISIStrategy, Operation, Swizzling};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Kernel {
    pub h: u32,
    pub w: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stride {
    pub h: u32,
    pub w: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// DPU execution engine variant used for the rare MPE-engine-sensitive
/// ops; a small closed set rather than a free-form string, per the
/// original's `hash_enum(h, mpe_engine)` (always present, never `Option`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MpeEngine {
    #[default]
    Default,
    Sparse,
    DensePrecomputed,
}

/// The compiler-facing per-operation descriptor submitted to the cost
/// engine (§3.5).
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    pub device: Device,
    pub op: Operation,
    pub input_0: Tensor,
    pub output_0: Tensor,
    pub kernel: Kernel,
    pub stride: Stride,
    pub pad: Padding,
    pub exec_mode: crate::types::ExecutionMode,
    pub act_fn: ActivationFunction,
    pub act_sparsity: f32,
    pub weight_sparsity: f32,
    pub input_swizzling: [Swizzling; 2],
    pub output_swizzling: [Swizzling; 1],
    pub output_write_tiles: u32,
    pub isi_strategy: ISIStrategy,
    pub weight_sparsity_enabled: bool,
    pub halo: Halo,
    pub sep: Sep,
    pub weight_type: Option<DataType>,
    pub weightless_op: Option<bool>,
    pub in_place_output: Option<bool>,
    pub superdense: Option<bool>,
    pub input_autopad: Option<bool>,
    pub output_autopad: Option<bool>,
    pub mpe_engine: MpeEngine,
    pub reduce_minmax_op: bool,
    /// Intra-tile split bookkeeping. NOT fingerprint-visible.
    pub offsets: [u32; 4],
    /// Diagnostic only. NOT fingerprint-visible.
    pub layer_info: String,
}

impl Workload {
    /// The dtype used for weight role computations: `weight_type` if set,
    /// else `input_0.dtype`.
    pub fn effective_weight_type(&self) -> DataType {
        self.weight_type.unwrap_or(self.input_0.dtype)
    }
}

/// Field-addressable mirror of a [`Workload`], built at validator entry,
/// carrying the derived dense memory-tensor shapes (§3.6). The reverse
/// conversion ([`OperationRecord::to_workload`]) is lossy only in the
/// diagnostic `offsets`/`layer_info` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub device: Device,
    pub op: Operation,
    pub input_0: Tensor,
    pub output_0: Tensor,
    pub kernel: Kernel,
    pub stride: Stride,
    pub pad: Padding,
    pub exec_mode: crate::types::ExecutionMode,
    pub act_fn: ActivationFunction,
    pub act_sparsity: f32,
    pub weight_sparsity: f32,
    pub input_swizzling: [Swizzling; 2],
    pub output_swizzling: [Swizzling; 1],
    pub output_write_tiles: u32,
    pub isi_strategy: ISIStrategy,
    pub weight_sparsity_enabled: bool,
    pub halo: Halo,
    pub sep: Sep,
    pub weight_type: Option<DataType>,
    pub weightless_op: Option<bool>,
    pub in_place_output: Option<bool>,
    pub superdense: Option<bool>,
    pub input_autopad: Option<bool>,
    pub output_autopad: Option<bool>,
    pub mpe_engine: MpeEngine,
    pub reduce_minmax_op: bool,
    /// Input memory tensor shape after applying halo, ignoring sparsity/SEP.
    pub input_0_memory_dense: [u32; 4],
    /// Output memory tensor shape after applying halo, ignoring sparsity/SEP.
    pub output_0_memory_dense: [u32; 4],
}

impl OperationRecord {
    pub fn from_workload(w: &Workload) -> Self {
        let input_0_memory_dense = w.halo.input_memory_dim(w.input_0.shape);
        let output_0_memory_dense = w.halo.output_memory_dim(w.output_0.shape);
        OperationRecord {
            device: w.device,
            op: w.op,
            input_0: w.input_0,
            output_0: w.output_0,
            kernel: w.kernel,
            stride: w.stride,
            pad: w.pad,
            exec_mode: w.exec_mode,
            act_fn: w.act_fn,
            act_sparsity: w.act_sparsity,
            weight_sparsity: w.weight_sparsity,
            input_swizzling: w.input_swizzling,
            output_swizzling: w.output_swizzling,
            output_write_tiles: w.output_write_tiles,
            isi_strategy: w.isi_strategy,
            weight_sparsity_enabled: w.weight_sparsity_enabled,
            halo: w.halo,
            sep: w.sep,
            weight_type: w.weight_type,
            weightless_op: w.weightless_op,
            in_place_output: w.in_place_output,
            superdense: w.superdense,
            input_autopad: w.input_autopad,
            output_autopad: w.output_autopad,
            mpe_engine: w.mpe_engine,
            reduce_minmax_op: w.reduce_minmax_op,
            input_0_memory_dense,
            output_0_memory_dense,
        }
    }

    /// Lossy only in `offsets` (zeroed) and `layer_info` (emptied).
    pub fn to_workload(&self) -> Workload {
        Workload {
            device: self.device,
            op: self.op,
            input_0: self.input_0,
            output_0: self.output_0,
            kernel: self.kernel,
            stride: self.stride,
            pad: self.pad,
            exec_mode: self.exec_mode,
            act_fn: self.act_fn,
            act_sparsity: self.act_sparsity,
            weight_sparsity: self.weight_sparsity,
            input_swizzling: self.input_swizzling,
            output_swizzling: self.output_swizzling,
            output_write_tiles: self.output_write_tiles,
            isi_strategy: self.isi_strategy,
            weight_sparsity_enabled: self.weight_sparsity_enabled,
            halo: self.halo,
            sep: self.sep,
            weight_type: self.weight_type,
            weightless_op: self.weightless_op,
            in_place_output: self.in_place_output,
            superdense: self.superdense,
            input_autopad: self.input_autopad,
            output_autopad: self.output_autopad,
            mpe_engine: self.mpe_engine,
            reduce_minmax_op: self.reduce_minmax_op,
            offsets: [0; 4],
            layer_info: String::new(),
        }
    }

    pub fn effective_weight_type(&self) -> DataType {
        self.weight_type.unwrap_or(self.input_0.dtype)
    }

    /// The workload fingerprint (C9); stable across the diagnostic-only
    /// `offsets`/`layer_info` fields by construction.
    pub fn fingerprint(&self) -> u32 {
        crate::fingerprint::fingerprint(&self.to_workload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExecutionMode, Layout};

    fn sample_workload() -> Workload {
        Workload {
            device: Device::Gen2_7,
            op: Operation::Conv,
            input_0: Tensor::new([56, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            output_0: Tensor::new([56, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            kernel: Kernel { h: 3, w: 3 },
            stride: Stride { h: 1, w: 1 },
            pad: Padding { top: 1, bottom: 1, left: 1, right: 1 },
            exec_mode: ExecutionMode::Cuboid16x16,
            act_fn: ActivationFunction::None,
            act_sparsity: 0.0,
            weight_sparsity: 0.0,
            input_swizzling: [Swizzling::Key0, Swizzling::Key0],
            output_swizzling: [Swizzling::Key0],
            output_write_tiles: 1,
            isi_strategy: ISIStrategy::Clustering,
            weight_sparsity_enabled: false,
            halo: Halo::default(),
            sep: Sep::default(),
            weight_type: None,
            weightless_op: None,
            in_place_output: None,
            superdense: None,
            input_autopad: None,
            output_autopad: None,
            mpe_engine: MpeEngine::Default,
            reduce_minmax_op: false,
            offsets: [0, 0, 0, 0],
            layer_info: String::new(),
        }
    }

    #[test]
    fn operation_round_trip_preserves_semantic_fields() {
        let w = sample_workload();
        let op = OperationRecord::from_workload(&w);
        let back = op.to_workload();
        assert_eq!(back.device, w.device);
        assert_eq!(back.input_0, w.input_0);
        assert_eq!(back.offsets, [0; 4]);
        assert_eq!(back.layer_info, "");
    }

    #[test]
    fn fingerprint_matches_across_round_trip() {
        let w = sample_workload();
        let op = OperationRecord::from_workload(&w);
        let refingerprinted = OperationRecord::from_workload(&op.to_workload()).fingerprint();
        assert_eq!(op.fingerprint(), refingerprinted);
    }

    #[test]
    fn effective_weight_type_defaults_to_input() {
        let w = sample_workload();
        assert_eq!(w.effective_weight_type(), DataType::U8);
    }
}
