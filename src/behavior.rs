//! Per-operation dynamic behavior registry (C5), grounded on
//! `include/vpu/validation/interface_operations_behavior.h`'s
//! `IOperationDynamicConstraints`.
//!
//! Every [`Operation`] dispatches to one [`OperationBehavior`] impl through
//! [`behavior_for`]; the validator and cost engine never special-case an
//! operation directly, they ask its behavior object.

use crate::tensor::Tensor;
use crate::types::{DataType, Device, ISIStrategy, Operation, DIM_C};
use crate::workload::{Kernel, OperationRecord};

/// Rounds `value` up to the next multiple of `multiple` (no-op if
/// `multiple` is zero).
fn align_up(value: u32, multiple: u32) -> u32 {
    if multiple == 0 {
        return value;
    }
    value.div_ceil(multiple) * multiple
}

/// Operation-specific rules that can't be read off a flat valid-values
/// table: weight-shape deduction, sparsity applicability, and the few
/// strategy/kernel normalizations particular ops require.
pub trait OperationBehavior {
    /// Deduces the weight (`input_1`) tensor's shape from the input/output
    /// activation tensors, kernel geometry, and device (alignment is
    /// generation-specific). Per §4.4, every weight tensor collapses its
    /// kernel footprint into a single aligned channel dimension:
    /// `h = w = 1`, with `c` and `b` assigned per operation family. Ops
    /// with no weight tensor (pooling) return [`Tensor::sentinel`].
    fn deduce_weight_shape(&self, device: Device, input_0: &Tensor, output_0: &Tensor, kernel: Kernel) -> Tensor;

    /// Number of weight elements actually read per output channel group;
    /// differs from `deduce_weight_shape(..).volume()` only for grouped
    /// convolutions (depthwise: one filter per channel, not per pair).
    fn weight_volume(&self, weight: &Tensor) -> u64;

    /// Whether this op reads a weight tensor at all.
    fn is_weightless(&self) -> bool;

    /// Restricts the ISI strategies legal for this operation (e.g.
    /// elementwise ops cannot split over K, there is no output channel
    /// axis to split).
    fn filter_isi_strategies(&self, options: &[ISIStrategy]) -> Vec<ISIStrategy>;

    /// Rewrites the kernel when a given strategy forces a stricter shape
    /// (e.g. SplitOverH pooling requires a square kernel). Returns `true`
    /// iff it changed anything.
    fn normalize_kernel_for_strategy(&self, strategy: ISIStrategy, kernel: &mut Kernel) -> bool {
        let _ = (strategy, kernel);
        false
    }

    /// Whether weight sparsity is a meaningful concept for this op.
    fn supports_weight_sparsity(&self) -> bool {
        !self.is_weightless()
    }

    /// Largest `output_write_tiles` this operation can legally use,
    /// independent of what the device's valid-values table otherwise
    /// allows. Elementwise ops have no output-channel axis to split
    /// writes over, so they cap at one tile regardless of device.
    fn max_output_write_tiles(&self) -> u32 {
        u32::MAX
    }

    /// Minimum output channel count this operation requires under
    /// `ISIStrategy::SplitOverK` (irrelevant for other strategies): the
    /// MAC grid needs at least two full output-channel groups to split.
    fn min_channels_for_split_over_k(&self) -> u32 {
        32
    }

    /// Whether this operation requires `output_0`'s channel count to
    /// equal `input_0`'s (depthwise convolution: one filter per channel,
    /// no cross-channel mixing to change the count).
    fn requires_matching_channels(&self) -> bool {
        false
    }

    /// Effective channel count used when sizing `input_0`'s memory
    /// footprint. Every operation but CM_CONV reads exactly the tensor's
    /// own channel count; CM_CONV's control-mask hardware only ever reads
    /// 4 or 16 lanes regardless of the declared channel count.
    fn input_0_memory_channels(&self, channels: u32) -> u32 {
        channels
    }
}

struct ConvLike;
struct DepthwiseConv;
struct CmConvBehavior;
struct Eltwise;
struct Pool;
struct LayerNormBehavior;

/// Weight alignment in elements for a `dtype_to_bytes(dtype) > 1` weight
/// tensor is always 16; for single-byte weights it falls back to the
/// device's generation-specific alignment.
fn weights_alignment(device: Device, dtype: DataType) -> u32 {
    if dtype.bytes() > 1 {
        16
    } else {
        device.limits().weights_alignment
    }
}

impl OperationBehavior for ConvLike {
    fn deduce_weight_shape(&self, device: Device, input_0: &Tensor, output_0: &Tensor, kernel: Kernel) -> Tensor {
        let in_channels = input_0.shape[DIM_C];
        let out_channels = output_0.shape[DIM_C];
        let multiple = weights_alignment(device, input_0.dtype);
        Tensor {
            shape: [1, 1, align_up(in_channels * kernel.h * kernel.w, multiple), out_channels],
            dtype: input_0.dtype,
            layout: input_0.layout,
            sparse: false,
        }
    }

    fn weight_volume(&self, weight: &Tensor) -> u64 {
        weight.volume()
    }

    fn is_weightless(&self) -> bool {
        false
    }

    fn filter_isi_strategies(&self, options: &[ISIStrategy]) -> Vec<ISIStrategy> {
        options.to_vec()
    }
}

impl OperationBehavior for DepthwiseConv {
    fn deduce_weight_shape(&self, device: Device, input_0: &Tensor, output_0: &Tensor, kernel: Kernel) -> Tensor {
        let out_channels = output_0.shape[DIM_C];
        let multiple = weights_alignment(device, input_0.dtype);
        Tensor {
            // No input-channel factor: one filter per channel, not per pair.
            shape: [1, 1, align_up(kernel.h * kernel.w, multiple), out_channels],
            dtype: input_0.dtype,
            layout: input_0.layout,
            sparse: false,
        }
    }

    fn weight_volume(&self, weight: &Tensor) -> u64 {
        weight.volume()
    }

    fn is_weightless(&self) -> bool {
        false
    }

    fn filter_isi_strategies(&self, options: &[ISIStrategy]) -> Vec<ISIStrategy> {
        options.to_vec()
    }

    fn requires_matching_channels(&self) -> bool {
        true
    }

    fn normalize_kernel_for_strategy(&self, strategy: ISIStrategy, kernel: &mut Kernel) -> bool {
        if strategy == ISIStrategy::SplitOverH && kernel.h != kernel.w {
            let side = kernel.h.max(kernel.w);
            kernel.h = side;
            kernel.w = side;
            true
        } else {
            false
        }
    }
}

impl OperationBehavior for CmConvBehavior {
    fn deduce_weight_shape(&self, _device: Device, input_0: &Tensor, output_0: &Tensor, kernel: Kernel) -> Tensor {
        let in_channels = input_0.shape[DIM_C];
        let out_channels = output_0.shape[DIM_C];
        // CM_CONV's control-mask weights align to 8 (wide dtype) or 16
        // (single byte), independent of the device generation.
        let multiple = if input_0.dtype.bytes() > 1 { 8 } else { 16 };
        Tensor {
            shape: [1, 1, align_up(in_channels * kernel.h * kernel.w, multiple), out_channels],
            dtype: input_0.dtype,
            layout: input_0.layout,
            sparse: false,
        }
    }

    fn weight_volume(&self, weight: &Tensor) -> u64 {
        weight.volume()
    }

    fn is_weightless(&self) -> bool {
        false
    }

    fn filter_isi_strategies(&self, options: &[ISIStrategy]) -> Vec<ISIStrategy> {
        options.to_vec()
    }

    fn input_0_memory_channels(&self, channels: u32) -> u32 {
        if channels < 5 {
            4
        } else {
            16
        }
    }
}

impl OperationBehavior for Eltwise {
    fn deduce_weight_shape(&self, _device: Device, input_0: &Tensor, _output_0: &Tensor, _kernel: Kernel) -> Tensor {
        // The second operand mirrors input_0's shape exactly.
        *input_0
    }

    fn weight_volume(&self, weight: &Tensor) -> u64 {
        weight.volume()
    }

    fn is_weightless(&self) -> bool {
        false
    }

    fn filter_isi_strategies(&self, options: &[ISIStrategy]) -> Vec<ISIStrategy> {
        // No output-channel axis distinct from input channels to split over.
        options.iter().copied().filter(|&s| s != ISIStrategy::SplitOverK).collect()
    }

    fn supports_weight_sparsity(&self) -> bool {
        false
    }

    fn max_output_write_tiles(&self) -> u32 {
        // No output-channel axis distinct from input channels to divide
        // writes across.
        1
    }
}

impl OperationBehavior for Pool {
    fn deduce_weight_shape(&self, _device: Device, _input_0: &Tensor, _output_0: &Tensor, _kernel: Kernel) -> Tensor {
        Tensor::sentinel()
    }

    fn weight_volume(&self, _weight: &Tensor) -> u64 {
        0
    }

    fn is_weightless(&self) -> bool {
        true
    }

    fn filter_isi_strategies(&self, options: &[ISIStrategy]) -> Vec<ISIStrategy> {
        options.iter().copied().filter(|&s| s != ISIStrategy::SplitOverK).collect()
    }

    fn normalize_kernel_for_strategy(&self, strategy: ISIStrategy, kernel: &mut Kernel) -> bool {
        if strategy == ISIStrategy::SplitOverH && kernel.h != kernel.w {
            let side = kernel.h.max(kernel.w);
            kernel.h = side;
            kernel.w = side;
            true
        } else {
            false
        }
    }
}

impl OperationBehavior for LayerNormBehavior {
    fn deduce_weight_shape(&self, _device: Device, _input_0: &Tensor, _output_0: &Tensor, _kernel: Kernel) -> Tensor {
        Tensor::sentinel()
    }

    fn weight_volume(&self, _weight: &Tensor) -> u64 {
        0
    }

    fn is_weightless(&self) -> bool {
        true
    }

    fn filter_isi_strategies(&self, options: &[ISIStrategy]) -> Vec<ISIStrategy> {
        options.iter().copied().filter(|&s| *s == ISIStrategy::Clustering).collect()
    }
}

/// Dispatches to the behavior object for an operation family.
pub fn behavior_for(op: Operation) -> &'static dyn OperationBehavior {
    match op {
        Operation::Conv => &ConvLike,
        Operation::CmConv => &CmConvBehavior,
        Operation::DwConv => &DepthwiseConv,
        Operation::EltwiseAdd | Operation::EltwiseMul => &Eltwise,
        Operation::Maxpool | Operation::Avgpool => &Pool,
        Operation::LayerNorm => &LayerNormBehavior,
    }
}

/// Applies the weight-shape deduction for an [`OperationRecord`], returning
/// the tensor that should be used as its weight role.
pub fn deduce_weight(record: &OperationRecord) -> Tensor {
    behavior_for(record.op).deduce_weight_shape(record.device, &record.input_0, &record.output_0, record.kernel)
}
