//! Per-generation valid-values registry (C6), grounded on
//! `include/vpu/validation/device_valid_valuesVPU2_7.h`'s
//! `VPU2_7_WorkloadValidValues`.
//!
//! Each [`Device`] owns one static [`DeviceLimits`] describing which
//! enum values, alignments and CMX budget apply to it. The validator (C7)
//! consults this registry; it never hardcodes per-device numbers itself.

use crate::range::{MultiRange, Range};
use crate::types::{DataType, Device, ExecutionMode, ISIStrategy, Layout, Operation, Swizzling};

/// Valid-values table for one NPU generation.
#[derive(Debug, Clone)]
pub struct DeviceLimits {
    pub valid_execution_modes: &'static [ExecutionMode],
    pub valid_layouts: &'static [Layout],
    pub valid_swizzlings: &'static [Swizzling],
    pub valid_activation_datatypes: &'static [DataType],
    pub valid_weight_datatypes: &'static [DataType],
    pub valid_output_write_tiles: &'static [u32],
    pub valid_isi_strategies: &'static [ISIStrategy],
    pub cmx_size_bytes: u64,
    pub weights_alignment: u32,
    pub alignment_size_bytes: u32,
    pub input_height_start_factor_soh: u32,
    pub max_input_spatial_dim: u32,
}

const EXEC_MODES_V2: [ExecutionMode; 2] = [ExecutionMode::Vector, ExecutionMode::Matrix];
const EXEC_MODES_V2_7: [ExecutionMode; 3] =
    [ExecutionMode::Cuboid4x16, ExecutionMode::Cuboid8x16, ExecutionMode::Cuboid16x16];
const EXEC_MODES_V4_PLUS: [ExecutionMode; 4] = [
    ExecutionMode::Cuboid4x16,
    ExecutionMode::Cuboid8x16,
    ExecutionMode::Cuboid16x16,
    ExecutionMode::VectorFp16,
];

const LAYOUTS_V2: [Layout; 2] = [Layout::ZMajor, Layout::CMajor];
const LAYOUTS_MODERN: [Layout; 6] =
    [Layout::Zxy, Layout::Xyz, Layout::Xzy, Layout::Yxz, Layout::Yzx, Layout::Zyx];

const SWIZZLINGS_V2: [Swizzling; 1] = [Swizzling::Key0];
const SWIZZLINGS_ALL: [Swizzling; 6] =
    [Swizzling::Key0, Swizzling::Key1, Swizzling::Key2, Swizzling::Key3, Swizzling::Key4, Swizzling::Key5];

const IN_OUT_TYPES_V2_7: [DataType; 4] = [DataType::I8, DataType::U8, DataType::F16, DataType::BF16];
const WEIGHT_TYPES_V2_7: [DataType; 6] =
    [DataType::I4, DataType::U4, DataType::I8, DataType::U8, DataType::F16, DataType::BF16];

const IN_OUT_TYPES_V4_PLUS: [DataType; 6] =
    [DataType::I8, DataType::U8, DataType::F16, DataType::BF16, DataType::HF8, DataType::BF8];
const WEIGHT_TYPES_V4_PLUS: [DataType; 10] = [
    DataType::I1,
    DataType::U1,
    DataType::I2,
    DataType::U2,
    DataType::I4,
    DataType::U4,
    DataType::I8,
    DataType::U8,
    DataType::F16,
    DataType::BF16,
];

const OWT_SINGLE_TILE: [u32; 1] = [1];
const OWT_DUAL_TILE: [u32; 2] = [1, 2];

const ISI_ALL: [ISIStrategy; 3] = [ISIStrategy::Clustering, ISIStrategy::SplitOverH, ISIStrategy::SplitOverK];
const ISI_CLUSTERING_ONLY: [ISIStrategy; 1] = [ISIStrategy::Clustering];

impl Device {
    /// The valid-values table for this generation.
    pub fn limits(self) -> DeviceLimits {
        match self {
            Device::Gen2_0 | Device::Gen2_1 => DeviceLimits {
                valid_execution_modes: &EXEC_MODES_V2,
                valid_layouts: &LAYOUTS_V2,
                valid_swizzlings: &SWIZZLINGS_V2,
                valid_activation_datatypes: &IN_OUT_TYPES_V2_7,
                valid_weight_datatypes: &WEIGHT_TYPES_V2_7,
                valid_output_write_tiles: &OWT_SINGLE_TILE,
                valid_isi_strategies: &ISI_CLUSTERING_ONLY,
                cmx_size_bytes: 1024 * 1024,
                weights_alignment: 16,
                alignment_size_bytes: 16384,
                input_height_start_factor_soh: 1,
                max_input_spatial_dim: 8192,
            },
            Device::Gen2_7 => DeviceLimits {
                valid_execution_modes: &EXEC_MODES_V2_7,
                valid_layouts: &LAYOUTS_MODERN,
                valid_swizzlings: &SWIZZLINGS_ALL,
                valid_activation_datatypes: &IN_OUT_TYPES_V2_7,
                valid_weight_datatypes: &WEIGHT_TYPES_V2_7,
                valid_output_write_tiles: &OWT_DUAL_TILE,
                valid_isi_strategies: &ISI_ALL,
                cmx_size_bytes: 2 * 1024 * 1024,
                weights_alignment: 16,
                alignment_size_bytes: 16384,
                input_height_start_factor_soh: 1,
                max_input_spatial_dim: 8192,
            },
            Device::Gen4_0 => DeviceLimits {
                valid_execution_modes: &EXEC_MODES_V4_PLUS,
                valid_layouts: &LAYOUTS_MODERN,
                valid_swizzlings: &SWIZZLINGS_ALL,
                valid_activation_datatypes: &IN_OUT_TYPES_V4_PLUS,
                valid_weight_datatypes: &WEIGHT_TYPES_V4_PLUS,
                valid_output_write_tiles: &OWT_DUAL_TILE,
                valid_isi_strategies: &ISI_ALL,
                cmx_size_bytes: 2 * 1024 * 1024,
                weights_alignment: 16,
                alignment_size_bytes: 16384,
                input_height_start_factor_soh: 1,
                max_input_spatial_dim: 8192,
            },
            Device::Gen5_0 | Device::ReservedA | Device::ReservedB => DeviceLimits {
                valid_execution_modes: &EXEC_MODES_V4_PLUS,
                valid_layouts: &LAYOUTS_MODERN,
                valid_swizzlings: &SWIZZLINGS_ALL,
                valid_activation_datatypes: &IN_OUT_TYPES_V4_PLUS,
                valid_weight_datatypes: &WEIGHT_TYPES_V4_PLUS,
                valid_output_write_tiles: &OWT_DUAL_TILE,
                valid_isi_strategies: &ISI_ALL,
                cmx_size_bytes: 4 * 1024 * 1024,
                weights_alignment: 32,
                alignment_size_bytes: 16384,
                input_height_start_factor_soh: 1,
                max_input_spatial_dim: 8192,
            },
        }
    }

    /// Valid channel-count range for a given operation, per §4.6: multiples
    /// of 16 everywhere, with a secondary multiple-of-32 constraint once the
    /// channel count reaches 8192 on post-VPU2.7 silicon (wider MAC grid).
    pub fn valid_channels(self, op: Operation) -> MultiRange {
        let _ = op;
        match self {
            Device::Gen2_0 | Device::Gen2_1 => MultiRange::single(Range::with_divisor(16, 8192, 16)),
            _ => MultiRange::single(Range::with_secondary(16, 16384, 16, 32)),
        }
    }

    /// Valid batch range: always 1 (no cross-batch tiling modeled).
    pub fn valid_batch(self) -> Range {
        let _ = self;
        Range::new(1, 1)
    }

    /// Valid range for a spatial input dimension (height or width): `1` up
    /// to the hardware's maximum addressable spatial extent.
    pub fn valid_input_spatial_range(self) -> Range {
        Range::new(1, self.limits().max_input_spatial_dim as i64)
    }

    /// Folds a requested datatype to one this generation actually exposes,
    /// per §4.5 `restrict_datatype`: collapse signed/float aliases, then
    /// fall back to the widest compatible type the device supports.
    pub fn restrict_datatype(self, dtype: DataType) -> DataType {
        let restricted = dtype.restricted();
        let limits = self.limits();
        if limits
            .valid_activation_datatypes
            .iter()
            .chain(limits.valid_weight_datatypes.iter())
            .any(|&d| d.restricted() == restricted)
        {
            restricted
        } else {
            DataType::F16
        }
    }

    /// Clamps a sparsity ratio into `[0.0, 1.0]`, per §4.6
    /// `sanitize_sparsity`: devices before VPU4.0 do not model sparsity at
    /// all and always report zero.
    pub fn sanitize_sparsity(self, ratio: f32) -> f32 {
        match self {
            Device::Gen2_0 | Device::Gen2_1 | Device::Gen2_7 => 0.0,
            _ => ratio.clamp(0.0, 1.0),
        }
    }

    /// Output spatial dimension for a convolution-family op: the standard
    /// `floor((in + pad_lo + pad_hi - kernel) / stride) + 1` formula,
    /// shared across every generation. A zero stride has no valid output
    /// dimension and returns `0` rather than dividing by zero.
    pub fn compute_output_dim(self, input: u32, kernel: u32, stride: u32, pad_lo: u32, pad_hi: u32) -> u32 {
        let _ = self;
        if stride == 0 {
            return 0;
        }
        let padded = input + pad_lo + pad_hi;
        if padded < kernel {
            return 0;
        }
        (padded - kernel) / stride + 1
    }
}
