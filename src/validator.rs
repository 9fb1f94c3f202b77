//! Ordered, non-short-circuiting validation checklist (C7), grounded on
//! `include/vpu/validation/vpu_layer_validator.h` and
//! `device_valid_valuesVPU2_7.h`'s per-device tables.
//!
//! Every check runs regardless of earlier failures so a single call
//! surfaces every problem with a workload at once, rather than forcing the
//! caller through a fix-one-resubmit-repeat loop.

use crate::behavior::behavior_for;
use crate::device::DeviceLimits;
use crate::types::Operation;
use crate::workload::OperationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub check: &'static str,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    fn push(&mut self, check: &'static str, severity: Severity, message: impl Into<String>) {
        self.issues.push(ValidationIssue { check, severity, message: message.into() });
    }
}

/// Runs the full checklist against an operation and its device's
/// valid-values table.
pub fn validate(record: &OperationRecord, limits: &DeviceLimits) -> ValidationReport {
    tracing::trace!(op = ?record.op, device = ?record.device, "running validation checklist");
    let mut report = ValidationReport::default();

    check_execution_mode(record, limits, &mut report);
    check_layout(record, limits, &mut report);
    check_swizzling(record, limits, &mut report);
    check_activation_datatypes(record, limits, &mut report);
    check_weight_datatype(record, limits, &mut report);
    check_output_write_tiles(record, limits, &mut report);
    check_isi_strategy(record, limits, &mut report);
    check_kernel_stride_nonzero(record, &mut report);
    check_output_dim_correlation(record, &mut report);
    check_weight_sparsity_applicability(record, &mut report);
    check_act_sparsity_range(record, &mut report);
    check_halo_compatible_with_isi(record, &mut report);
    check_sep_not_with_dense_weight_role(record, &mut report);
    check_batch_is_one(record, &mut report);
    check_weightless_ops_have_sentinel_weight_type(record, &mut report);
    check_reduce_minmax_only_on_pool(record, &mut report);
    check_channel_counts(record, &mut report);
    check_matching_channels(record, &mut report);
    check_split_over_k_channel_minimum(record, &mut report);
    check_kernel_normalized_for_strategy(record, &mut report);
    check_padding_bound(record, &mut report);
    check_input_spatial_interval(record, &mut report);
    check_in_place_output_elementwise_only(record, &mut report);

    report
}

fn check_kernel_normalized_for_strategy(record: &OperationRecord, report: &mut ValidationReport) {
    let mut kernel = record.kernel;
    if behavior_for(record.op).normalize_kernel_for_strategy(record.isi_strategy, &mut kernel) {
        report.push(
            "kernel_normalized_for_strategy",
            Severity::Error,
            format!(
                "{:?} under {:?} requires a square kernel, found {}x{}",
                record.op, record.isi_strategy, record.kernel.h, record.kernel.w
            ),
        );
    }
}

fn check_padding_bound(record: &OperationRecord, report: &mut ValidationReport) {
    let max_h = record.kernel.h / 2;
    let max_w = record.kernel.w / 2;
    if record.pad.top > max_h || record.pad.bottom > max_h {
        report.push(
            "padding_bound_height",
            Severity::Error,
            format!(
                "padding top/bottom must not exceed floor(kernel_h/2)={}, found top={} bottom={}",
                max_h, record.pad.top, record.pad.bottom
            ),
        );
    }
    if record.pad.left > max_w || record.pad.right > max_w {
        report.push(
            "padding_bound_width",
            Severity::Error,
            format!(
                "padding left/right must not exceed floor(kernel_w/2)={}, found left={} right={}",
                max_w, record.pad.left, record.pad.right
            ),
        );
    }
}

fn check_input_spatial_interval(record: &OperationRecord, report: &mut ValidationReport) {
    use crate::types::{DIM_H, DIM_W};
    let range = record.device.valid_input_spatial_range();
    let h = record.input_0.shape[DIM_H] as i64;
    let w = record.input_0.shape[DIM_W] as i64;
    if !range.contains(h) {
        report.push(
            "input_height_interval",
            Severity::Error,
            format!("input height {} is outside the valid range [{}, {}]", h, range.lo, range.hi),
        );
    }
    if !range.contains(w) {
        report.push(
            "input_width_interval",
            Severity::Error,
            format!("input width {} is outside the valid range [{}, {}]", w, range.lo, range.hi),
        );
    }
}

fn check_in_place_output_elementwise_only(record: &OperationRecord, report: &mut ValidationReport) {
    if record.in_place_output != Some(true) {
        return;
    }
    if !record.op.is_eltwise() {
        report.push(
            "in_place_output_elementwise_only",
            Severity::Error,
            format!("in_place_output is only valid for elementwise operations, found {:?}", record.op),
        );
        return;
    }
    if record.input_0.layout != record.output_0.layout {
        report.push(
            "in_place_output_layout_match",
            Severity::Error,
            "in_place_output requires input_0 and output_0 to share the same layout",
        );
    }
    if record.input_0.size_bytes() != record.output_0.size_bytes() {
        report.push(
            "in_place_output_footprint_match",
            Severity::Error,
            "in_place_output requires input_0 and output_0 to have equal bit-footprint",
        );
    }
}

fn check_matching_channels(record: &OperationRecord, report: &mut ValidationReport) {
    use crate::types::DIM_C;
    if behavior_for(record.op).requires_matching_channels()
        && record.output_0.shape[DIM_C] != record.input_0.shape[DIM_C]
    {
        report.push(
            "dw_conv_channel_match",
            Severity::Error,
            "output_0.channels == input_0.channels",
        );
    }
}

fn check_split_over_k_channel_minimum(record: &OperationRecord, report: &mut ValidationReport) {
    use crate::types::{DIM_C, ISIStrategy};
    if record.isi_strategy != ISIStrategy::SplitOverK {
        return;
    }
    let min = behavior_for(record.op).min_channels_for_split_over_k();
    let channels = record.output_0.shape[DIM_C];
    if channels < min {
        report.push(
            "split_over_k_channel_minimum",
            Severity::Error,
            format!("SplitOverK requires at least {min} output channels, found {channels}"),
        );
    }
}

fn check_channel_counts(record: &OperationRecord, report: &mut ValidationReport) {
    use crate::types::DIM_C;
    let channels = record.output_0.shape[DIM_C];
    if !record.device.valid_channels(record.op).contains(channels as i64) {
        report.push(
            "channel_count",
            Severity::Error,
            format!("output channel count {} is not valid for {:?} on this device", channels, record.op),
        );
    }
    let input_channels = record.input_0.shape[DIM_C];
    if !record.device.valid_channels(record.op).contains(input_channels as i64) {
        report.push(
            "input_channel_count",
            Severity::Error,
            format!("input channel count {} is not valid for {:?} on this device", input_channels, record.op),
        );
    }
}

fn check_execution_mode(record: &OperationRecord, limits: &DeviceLimits, report: &mut ValidationReport) {
    if !limits.valid_execution_modes.contains(&record.exec_mode) {
        report.push(
            "execution_mode",
            Severity::Error,
            format!("{:?} is not a valid execution mode for this device", record.exec_mode),
        );
    }
}

fn check_layout(record: &OperationRecord, limits: &DeviceLimits, report: &mut ValidationReport) {
    if !limits.valid_layouts.contains(&record.input_0.layout) {
        report.push("input_layout", Severity::Error, format!("{:?} is not a valid input layout", record.input_0.layout));
    }
    if !limits.valid_layouts.contains(&record.output_0.layout) {
        report.push(
            "output_layout",
            Severity::Error,
            format!("{:?} is not a valid output layout", record.output_0.layout),
        );
    }
}

fn check_swizzling(record: &OperationRecord, limits: &DeviceLimits, report: &mut ValidationReport) {
    for swizz in record.input_swizzling {
        if !limits.valid_swizzlings.contains(&swizz) {
            report.push("input_swizzling", Severity::Error, format!("{:?} is not valid on this device", swizz));
        }
    }
    for swizz in record.output_swizzling {
        if !limits.valid_swizzlings.contains(&swizz) {
            report.push("output_swizzling", Severity::Error, format!("{:?} is not valid on this device", swizz));
        }
    }
}

fn check_activation_datatypes(record: &OperationRecord, limits: &DeviceLimits, report: &mut ValidationReport) {
    if !limits.valid_activation_datatypes.contains(&record.input_0.dtype) {
        report.push(
            "input_datatype",
            Severity::Error,
            format!("{:?} is not a valid activation datatype on this device", record.input_0.dtype),
        );
    }
    if !limits.valid_activation_datatypes.contains(&record.output_0.dtype) {
        report.push(
            "output_datatype",
            Severity::Error,
            format!("{:?} is not a valid activation datatype on this device", record.output_0.dtype),
        );
    }
}

fn check_weight_datatype(record: &OperationRecord, limits: &DeviceLimits, report: &mut ValidationReport) {
    if behavior_for(record.op).is_weightless() {
        return;
    }
    let wt = record.effective_weight_type();
    if !limits.valid_weight_datatypes.contains(&wt) {
        report.push("weight_datatype", Severity::Error, format!("{:?} is not a valid weight datatype on this device", wt));
    }
}

fn check_output_write_tiles(record: &OperationRecord, limits: &DeviceLimits, report: &mut ValidationReport) {
    if !limits.valid_output_write_tiles.contains(&record.output_write_tiles) {
        report.push(
            "output_write_tiles",
            Severity::Error,
            format!("{} output write tiles is not supported on this device", record.output_write_tiles),
        );
    }
    let max_for_op = behavior_for(record.op).max_output_write_tiles();
    if record.output_write_tiles > max_for_op {
        report.push(
            "output_write_tiles_op_compat",
            Severity::Error,
            format!("operation {:?} supports at most {} output write tiles, found {}", record.op, max_for_op, record.output_write_tiles),
        );
    }
}

fn check_isi_strategy(record: &OperationRecord, limits: &DeviceLimits, report: &mut ValidationReport) {
    if !limits.valid_isi_strategies.contains(&record.isi_strategy) {
        report.push(
            "isi_strategy",
            Severity::Error,
            format!("{:?} is not a valid ISI strategy on this device", record.isi_strategy),
        );
        return;
    }
    let allowed = behavior_for(record.op).filter_isi_strategies(limits.valid_isi_strategies);
    if !allowed.contains(&record.isi_strategy) {
        report.push(
            "isi_strategy_op_compat",
            Severity::Error,
            format!("{:?} is not compatible with operation {:?}", record.isi_strategy, record.op),
        );
    }
}

fn check_kernel_stride_nonzero(record: &OperationRecord, report: &mut ValidationReport) {
    if record.kernel.h == 0 || record.kernel.w == 0 {
        report.push("kernel_nonzero", Severity::Error, "kernel dimensions must be non-zero");
    }
    if record.stride.h == 0 || record.stride.w == 0 {
        report.push("stride_nonzero", Severity::Error, "stride dimensions must be non-zero");
    }
}

fn check_output_dim_correlation(record: &OperationRecord, report: &mut ValidationReport) {
    use crate::types::{DIM_H, DIM_W};
    let expected_h = record.device.compute_output_dim(
        record.input_0.shape[DIM_H],
        record.kernel.h,
        record.stride.h,
        record.pad.top,
        record.pad.bottom,
    );
    let expected_w = record.device.compute_output_dim(
        record.input_0.shape[DIM_W],
        record.kernel.w,
        record.stride.w,
        record.pad.left,
        record.pad.right,
    );
    if record.output_0.shape[DIM_H] != expected_h || record.output_0.shape[DIM_W] != expected_w {
        report.push(
            "output_dim_correlation",
            Severity::Error,
            format!(
                "output shape ({}, {}) does not match the shape implied by kernel/stride/pad ({}, {})",
                record.output_0.shape[DIM_H], record.output_0.shape[DIM_W], expected_h, expected_w
            ),
        );
    }
}

fn check_weight_sparsity_applicability(record: &OperationRecord, report: &mut ValidationReport) {
    if record.weight_sparsity_enabled && !behavior_for(record.op).supports_weight_sparsity() {
        report.push(
            "weight_sparsity_applicability",
            Severity::Error,
            format!("operation {:?} does not support weight sparsity", record.op),
        );
    }
}

fn check_act_sparsity_range(record: &OperationRecord, report: &mut ValidationReport) {
    if !(0.0..=1.0).contains(&record.act_sparsity) {
        report.push("act_sparsity_range", Severity::Error, format!("activation sparsity {} is out of [0, 1]", record.act_sparsity));
    }
    if !(0.0..=1.0).contains(&record.weight_sparsity) {
        report.push("weight_sparsity_range", Severity::Error, format!("weight sparsity {} is out of [0, 1]", record.weight_sparsity));
    }
}

fn check_halo_compatible_with_isi(record: &OperationRecord, report: &mut ValidationReport) {
    use crate::types::ISIStrategy;
    let has_vertical_halo = record.halo.in0_halo.top != 0
        || record.halo.in0_halo.bottom != 0
        || record.halo.out0_inbound_halo.top != 0
        || record.halo.out0_inbound_halo.bottom != 0;
    if has_vertical_halo && record.isi_strategy != ISIStrategy::SplitOverH {
        report.push(
            "halo_isi_compat",
            Severity::Warning,
            "vertical halo is set but ISI strategy is not SplitOverH; it will have no runtime effect",
        );
    }
}

fn check_sep_not_with_dense_weight_role(record: &OperationRecord, report: &mut ValidationReport) {
    if record.sep.enabled && behavior_for(record.op).is_weightless() && record.op == Operation::Avgpool {
        report.push(
            "sep_weightless_compat",
            Severity::Warning,
            "SEP is rarely meaningful for average pooling; verify the activator indirection is intentional",
        );
    }
}

fn check_batch_is_one(record: &OperationRecord, report: &mut ValidationReport) {
    use crate::types::DIM_B;
    if record.input_0.shape[DIM_B] != 1 || record.output_0.shape[DIM_B] != 1 {
        report.push("batch_is_one", Severity::Error, "this engine does not model batch sizes other than 1 per tile");
    }
}

fn check_weightless_ops_have_sentinel_weight_type(record: &OperationRecord, report: &mut ValidationReport) {
    if behavior_for(record.op).is_weightless() && record.weight_type.is_some() {
        report.push(
            "weightless_weight_type",
            Severity::Warning,
            "weight_type is set on a weightless operation and will be ignored",
        );
    }
}

fn check_reduce_minmax_only_on_pool(record: &OperationRecord, report: &mut ValidationReport) {
    if record.reduce_minmax_op && !behavior_for(record.op).is_weightless() {
        report.push(
            "reduce_minmax_op_scope",
            Severity::Warning,
            "reduce_minmax_op is typically only meaningful for pooling operations",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halo::Halo;
    use crate::sep::Sep;
    use crate::tensor::Tensor;
    use crate::types::{ActivationFunction, DataType, Device, ExecutionMode, ISIStrategy, Layout, Swizzling};
    use crate::workload::{Kernel, MpeEngine, Padding, Stride, Workload};

    fn valid_record() -> OperationRecord {
        let w = Workload {
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
        };
        OperationRecord::from_workload(&w)
    }

    #[test]
    fn well_formed_workload_is_valid() {
        let report = validate(&valid_record(), &Device::Gen2_7.limits());
        assert!(report.is_valid(), "{:?}", report.issues);
    }

    #[test]
    fn bad_execution_mode_is_flagged() {
        let mut r = valid_record();
        r.exec_mode = ExecutionMode::Vector;
        let report = validate(&r, &Device::Gen2_7.limits());
        assert!(!report.is_valid());
        assert!(report.issues.iter().any(|i| i.check == "execution_mode"));
    }

    #[test]
    fn mismatched_output_dim_is_flagged_without_short_circuiting_other_checks() {
        let mut r = valid_record();
        r.output_0 = Tensor::new([10, 10, 16, 1], DataType::U8, Layout::Zxy, false).unwrap();
        r.exec_mode = ExecutionMode::Vector; // also invalid, should still be reported
        let report = validate(&r, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "output_dim_correlation"));
        assert!(report.issues.iter().any(|i| i.check == "execution_mode"));
    }

    #[test]
    fn dw_conv_with_mismatched_channels_is_flagged() {
        let w = Workload {
            op: Operation::DwConv,
            output_0: Tensor::new([56, 56, 32, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            ..valid_record().to_workload()
        };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "dw_conv_channel_match"));
    }

    #[test]
    fn eltwise_with_two_output_write_tiles_is_flagged() {
        let w = Workload {
            op: Operation::EltwiseAdd,
            output_write_tiles: 2,
            ..valid_record().to_workload()
        };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "output_write_tiles_op_compat"));
    }

    #[test]
    fn split_over_k_below_channel_minimum_is_flagged() {
        let w = Workload {
            isi_strategy: ISIStrategy::SplitOverK,
            input_0: Tensor::new([56, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            output_0: Tensor::new([56, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            ..valid_record().to_workload()
        };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "split_over_k_channel_minimum"));
    }

    #[test]
    fn split_over_k_is_rejected_for_eltwise() {
        let w = Workload {
            op: Operation::EltwiseAdd,
            isi_strategy: ISIStrategy::SplitOverK,
            ..{
                let r = valid_record();
                r.to_workload()
            }
        };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "isi_strategy_op_compat"));
    }

    #[test]
    fn dw_conv_non_square_kernel_under_split_over_h_is_flagged() {
        let w = Workload {
            op: Operation::DwConv,
            kernel: Kernel { h: 2, w: 3 },
            isi_strategy: ISIStrategy::SplitOverH,
            output_0: Tensor::new([56, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            ..valid_record().to_workload()
        };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "kernel_normalized_for_strategy"));
    }

    #[test]
    fn padding_exceeding_half_kernel_is_flagged() {
        let w = Workload { pad: Padding { top: 2, bottom: 1, left: 1, right: 1 }, ..valid_record().to_workload() };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "padding_bound_height"));
    }

    #[test]
    fn input_spatial_dim_past_hardware_max_is_flagged() {
        let w = Workload {
            input_0: Tensor::new([8193, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            kernel: Kernel { h: 1, w: 1 },
            pad: Padding::default(),
            output_0: Tensor::new([8193, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            ..valid_record().to_workload()
        };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "input_width_interval"));
    }

    #[test]
    fn in_place_output_on_non_eltwise_op_is_flagged() {
        let w = Workload { in_place_output: Some(true), ..valid_record().to_workload() };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(report.issues.iter().any(|i| i.check == "in_place_output_elementwise_only"));
    }

    #[test]
    fn in_place_output_on_eltwise_with_matching_layout_and_footprint_is_valid() {
        let w = Workload {
            op: Operation::EltwiseAdd,
            in_place_output: Some(true),
            input_0: Tensor::new([56, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            output_0: Tensor::new([56, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            kernel: Kernel { h: 1, w: 1 },
            pad: Padding::default(),
            ..valid_record().to_workload()
        };
        let record = OperationRecord::from_workload(&w);
        let report = validate(&record, &Device::Gen2_7.limits());
        assert!(!report.issues.iter().any(|i| i.check.starts_with("in_place_output")));
    }
}
