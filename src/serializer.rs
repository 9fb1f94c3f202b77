//! CSV round-trip serialization for [`OperationRecord`] (§6), grounded on
//! the source model's `EnumName.VALUE` text convention already implemented
//! by the `text_enum!` macro in `types.rs`.
//!
//! One column per field of the abstract operation form; enums serialize
//! through their `Display`/`FromStr` impls so a row stays self-describing
//! without a side-channel schema file.

use std::str::FromStr;

use thiserror::Error;

use crate::halo::{Halo, HaloEdges};
use crate::sep::Sep;
use crate::tensor::Tensor;
use crate::types::{
    ActivationFunction, DataType, Device, ExecutionMode, ISIStrategy, Layout, Operation, Swizzling,
};
use crate::workload::{Kernel, MpeEngine, OperationRecord, Padding, Stride};

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCountMismatch { expected: usize, found: usize },
    #[error("column {index} ({name}): {message}")]
    Column { index: usize, name: &'static str, message: String },
}

const COLUMNS: usize = 82;

fn parse_col<T: FromStr>(fields: &[&str], index: usize, name: &'static str) -> Result<T, SerializeError>
where
    T::Err: std::fmt::Display,
{
    fields[index]
        .parse()
        .map_err(|e: T::Err| SerializeError::Column { index, name, message: e.to_string() })
}

fn parse_enum<T: FromStr<Err = crate::types::EnumParseError>>(
    fields: &[&str],
    index: usize,
    name: &'static str,
) -> Result<T, SerializeError> {
    fields[index]
        .parse()
        .map_err(|e: crate::types::EnumParseError| SerializeError::Column { index, name, message: e.to_string() })
}

fn bool_col(v: bool) -> &'static str {
    if v {
        "1"
    } else {
        "0"
    }
}

fn parse_bool(fields: &[&str], index: usize, name: &'static str) -> Result<bool, SerializeError> {
    match fields[index] {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(SerializeError::Column { index, name, message: format!("not a bool: {other:?}") }),
    }
}

fn opt_enum_cols<T: ToString>(v: Option<T>) -> (String, String) {
    match v {
        Some(x) => ("1".to_string(), x.to_string()),
        None => ("0".to_string(), String::new()),
    }
}

/// Serializes one [`OperationRecord`] as a single CSV row (no header, no
/// trailing newline). Use [`header`] for the matching column names.
pub fn to_csv_row(op: &OperationRecord) -> String {
    let mut cols: Vec<String> = Vec::with_capacity(COLUMNS);
    cols.push(op.device.to_string());
    cols.push(op.op.to_string());

    push_tensor(&mut cols, &op.input_0);
    push_tensor(&mut cols, &op.output_0);

    cols.push(op.kernel.h.to_string());
    cols.push(op.kernel.w.to_string());
    cols.push(op.stride.h.to_string());
    cols.push(op.stride.w.to_string());
    cols.push(op.pad.top.to_string());
    cols.push(op.pad.bottom.to_string());
    cols.push(op.pad.left.to_string());
    cols.push(op.pad.right.to_string());

    cols.push(op.exec_mode.to_string());
    cols.push(op.act_fn.to_string());
    cols.push(op.act_sparsity.to_string());
    cols.push(op.weight_sparsity.to_string());

    cols.push(op.input_swizzling[0].to_string());
    cols.push(op.input_swizzling[1].to_string());
    cols.push(op.output_swizzling[0].to_string());

    cols.push(op.output_write_tiles.to_string());
    cols.push(op.isi_strategy.to_string());
    cols.push(bool_col(op.weight_sparsity_enabled).to_string());

    push_halo(&mut cols, &op.halo);
    push_sep(&mut cols, &op.sep);

    let (wt_present, wt_value) = opt_enum_cols(op.weight_type);
    cols.push(wt_present);
    cols.push(wt_value);

    for flag in [op.weightless_op, op.in_place_output, op.superdense, op.input_autopad, op.output_autopad] {
        let (present, value) = match flag {
            Some(v) => ("1".to_string(), bool_col(v).to_string()),
            None => ("0".to_string(), String::new()),
        };
        cols.push(present);
        cols.push(value);
    }

    cols.push(match op.mpe_engine {
        MpeEngine::Default => "Default",
        MpeEngine::Sparse => "Sparse",
        MpeEngine::DensePrecomputed => "DensePrecomputed",
    }.to_string());
    cols.push(bool_col(op.reduce_minmax_op).to_string());

    cols.join(",")
}

fn push_tensor(cols: &mut Vec<String>, t: &Tensor) {
    for d in t.shape {
        cols.push(d.to_string());
    }
    cols.push(t.dtype.to_string());
    cols.push(t.layout.to_string());
    cols.push(bool_col(t.sparse).to_string());
}

fn push_halo(cols: &mut Vec<String>, halo: &Halo) {
    for edges in [halo.in0_halo, halo.out0_halo, halo.out0_broadcast_count, halo.out0_inbound_halo] {
        push_halo_edges(cols, &edges);
    }
}

fn push_halo_edges(cols: &mut Vec<String>, e: &HaloEdges) {
    cols.push(e.top.to_string());
    cols.push(e.bottom.to_string());
    cols.push(e.left.to_string());
    cols.push(e.right.to_string());
    cols.push(e.front.to_string());
    cols.push(e.back.to_string());
}

fn push_sep(cols: &mut Vec<String>, sep: &Sep) {
    cols.push(bool_col(sep.enabled).to_string());
    for d in sep.pointer_table_shape {
        cols.push(d.to_string());
    }
    for d in sep.actual_input_shape {
        cols.push(d.to_string());
    }
    cols.push(bool_col(sep.no_sparse_map).to_string());
}

/// Parses one CSV row produced by [`to_csv_row`] back into an
/// [`OperationRecord`]. The dense memory-tensor fields are recomputed from
/// halo, not read from the row.
pub fn from_csv_row(row: &str) -> Result<OperationRecord, SerializeError> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() != COLUMNS {
        return Err(SerializeError::ColumnCountMismatch { expected: COLUMNS, found: fields.len() });
    }

    let mut i = 0;
    let device: Device = parse_enum(&fields, i, "device")?;
    i += 1;
    let op: Operation = parse_enum(&fields, i, "op")?;
    i += 1;

    let (input_0, ni) = parse_tensor(&fields, i)?;
    i = ni;
    let (output_0, ni) = parse_tensor(&fields, i)?;
    i = ni;

    let kernel = Kernel {
        h: parse_col(&fields, i, "kernel.h")?,
        w: parse_col(&fields, i + 1, "kernel.w")?,
    };
    i += 2;
    let stride = Stride {
        h: parse_col(&fields, i, "stride.h")?,
        w: parse_col(&fields, i + 1, "stride.w")?,
    };
    i += 2;
    let pad = Padding {
        top: parse_col(&fields, i, "pad.top")?,
        bottom: parse_col(&fields, i + 1, "pad.bottom")?,
        left: parse_col(&fields, i + 2, "pad.left")?,
        right: parse_col(&fields, i + 3, "pad.right")?,
    };
    i += 4;

    let exec_mode: ExecutionMode = parse_enum(&fields, i, "exec_mode")?;
    i += 1;
    let act_fn: ActivationFunction = parse_enum(&fields, i, "act_fn")?;
    i += 1;
    let act_sparsity: f32 = parse_col(&fields, i, "act_sparsity")?;
    i += 1;
    let weight_sparsity: f32 = parse_col(&fields, i, "weight_sparsity")?;
    i += 1;

    let input_swizzling = [
        parse_enum::<Swizzling>(&fields, i, "input_swizzling[0]")?,
        parse_enum::<Swizzling>(&fields, i + 1, "input_swizzling[1]")?,
    ];
    i += 2;
    let output_swizzling = [parse_enum::<Swizzling>(&fields, i, "output_swizzling[0]")?];
    i += 1;

    let output_write_tiles: u32 = parse_col(&fields, i, "output_write_tiles")?;
    i += 1;
    let isi_strategy: ISIStrategy = parse_enum(&fields, i, "isi_strategy")?;
    i += 1;
    let weight_sparsity_enabled = parse_bool(&fields, i, "weight_sparsity_enabled")?;
    i += 1;

    let (halo, ni) = parse_halo(&fields, i)?;
    i = ni;
    let (sep, ni) = parse_sep(&fields, i)?;
    i = ni;

    let weight_type = parse_opt_enum::<DataType>(&fields, i, i + 1, "weight_type")?;
    i += 2;

    let mut opt_bools = [None; 5];
    for slot in &mut opt_bools {
        *slot = parse_opt_bool(&fields, i, i + 1, "optional_flag")?;
        i += 2;
    }
    let [weightless_op, in_place_output, superdense, input_autopad, output_autopad] = opt_bools;

    let mpe_engine = match fields[i] {
        "Sparse" => MpeEngine::Sparse,
        "DensePrecomputed" => MpeEngine::DensePrecomputed,
        _ => MpeEngine::Default,
    };
    i += 1;
    let reduce_minmax_op = parse_bool(&fields, i, "reduce_minmax_op")?;

    let workload = crate::workload::Workload {
        device,
        op,
        input_0,
        output_0,
        kernel,
        stride,
        pad,
        exec_mode,
        act_fn,
        act_sparsity,
        weight_sparsity,
        input_swizzling,
        output_swizzling,
        output_write_tiles,
        isi_strategy,
        weight_sparsity_enabled,
        halo,
        sep,
        weight_type,
        weightless_op,
        in_place_output,
        superdense,
        input_autopad,
        output_autopad,
        mpe_engine,
        reduce_minmax_op,
        offsets: [0; 4],
        layer_info: String::new(),
    };
    Ok(OperationRecord::from_workload(&workload))
}

fn parse_tensor(fields: &[&str], i: usize) -> Result<(Tensor, usize), SerializeError> {
    let shape = [
        parse_col(fields, i, "tensor.shape[0]")?,
        parse_col(fields, i + 1, "tensor.shape[1]")?,
        parse_col(fields, i + 2, "tensor.shape[2]")?,
        parse_col(fields, i + 3, "tensor.shape[3]")?,
    ];
    let dtype: DataType = parse_enum(fields, i + 4, "tensor.dtype")?;
    let layout: Layout = parse_enum(fields, i + 5, "tensor.layout")?;
    let sparse = parse_bool(fields, i + 6, "tensor.sparse")?;
    Ok((Tensor { shape, dtype, layout, sparse }, i + 7))
}

fn parse_halo_edges(fields: &[&str], i: usize) -> Result<(HaloEdges, usize), SerializeError> {
    Ok((
        HaloEdges {
            top: parse_col(fields, i, "halo.top")?,
            bottom: parse_col(fields, i + 1, "halo.bottom")?,
            left: parse_col(fields, i + 2, "halo.left")?,
            right: parse_col(fields, i + 3, "halo.right")?,
            front: parse_col(fields, i + 4, "halo.front")?,
            back: parse_col(fields, i + 5, "halo.back")?,
        },
        i + 6,
    ))
}

fn parse_halo(fields: &[&str], i: usize) -> Result<(Halo, usize), SerializeError> {
    let (in0_halo, i) = parse_halo_edges(fields, i)?;
    let (out0_halo, i) = parse_halo_edges(fields, i)?;
    let (out0_broadcast_count, i) = parse_halo_edges(fields, i)?;
    let (out0_inbound_halo, i) = parse_halo_edges(fields, i)?;
    Ok((Halo { in0_halo, out0_halo, out0_broadcast_count, out0_inbound_halo }, i))
}

fn parse_sep(fields: &[&str], i: usize) -> Result<(Sep, usize), SerializeError> {
    let enabled = parse_bool(fields, i, "sep.enabled")?;
    let pointer_table_shape = [
        parse_col(fields, i + 1, "sep.pointer_table_shape[0]")?,
        parse_col(fields, i + 2, "sep.pointer_table_shape[1]")?,
        parse_col(fields, i + 3, "sep.pointer_table_shape[2]")?,
        parse_col(fields, i + 4, "sep.pointer_table_shape[3]")?,
    ];
    let actual_input_shape = [
        parse_col(fields, i + 5, "sep.actual_input_shape[0]")?,
        parse_col(fields, i + 6, "sep.actual_input_shape[1]")?,
        parse_col(fields, i + 7, "sep.actual_input_shape[2]")?,
        parse_col(fields, i + 8, "sep.actual_input_shape[3]")?,
    ];
    let no_sparse_map = parse_bool(fields, i + 9, "sep.no_sparse_map")?;
    Ok((Sep { enabled, pointer_table_shape, actual_input_shape, no_sparse_map }, i + 10))
}

fn parse_opt_enum<T: FromStr<Err = crate::types::EnumParseError>>(
    fields: &[&str],
    present_i: usize,
    value_i: usize,
    name: &'static str,
) -> Result<Option<T>, SerializeError> {
    if fields[present_i] == "1" {
        Ok(Some(parse_enum(fields, value_i, name)?))
    } else {
        Ok(None)
    }
}

fn parse_opt_bool(
    fields: &[&str],
    present_i: usize,
    value_i: usize,
    name: &'static str,
) -> Result<Option<bool>, SerializeError> {
    if fields[present_i] == "1" {
        Ok(Some(parse_bool(fields, value_i, name)?))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivationFunction, DataType, Device, ExecutionMode, ISIStrategy, Layout, Operation, Swizzling};
    use crate::workload::{Kernel, Padding, Stride, Workload};

    fn sample() -> OperationRecord {
        let w = Workload {
            device: Device::Gen2_7,
            op: Operation::Conv,
            input_0: Tensor::new([56, 56, 16, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            output_0: Tensor::new([56, 56, 32, 1], DataType::U8, Layout::Zxy, false).unwrap(),
            kernel: Kernel { h: 3, w: 3 },
            stride: Stride { h: 1, w: 1 },
            pad: Padding { top: 1, bottom: 1, left: 1, right: 1 },
            exec_mode: ExecutionMode::Cuboid16x16,
            act_fn: ActivationFunction::Relu,
            act_sparsity: 0.25,
            weight_sparsity: 0.0,
            input_swizzling: [Swizzling::Key0, Swizzling::Key1],
            output_swizzling: [Swizzling::Key0],
            output_write_tiles: 1,
            isi_strategy: ISIStrategy::Clustering,
            weight_sparsity_enabled: false,
            halo: Halo::default(),
            sep: Sep::default(),
            weight_type: Some(DataType::I8),
            weightless_op: Some(false),
            in_place_output: None,
            superdense: None,
            input_autopad: None,
            output_autopad: None,
            mpe_engine: MpeEngine::Default,
            reduce_minmax_op: false,
            offsets: [9, 9, 9, 9],
            layer_info: "diagnostic-only".to_string(),
        };
        OperationRecord::from_workload(&w)
    }

    #[test]
    fn round_trips_through_csv() {
        let original = sample();
        let row = to_csv_row(&original);
        let parsed = from_csv_row(&row).unwrap();
        assert_eq!(parsed.device, original.device);
        assert_eq!(parsed.input_0, original.input_0);
        assert_eq!(parsed.weight_type, original.weight_type);
        assert_eq!(parsed.weightless_op, original.weightless_op);
        assert_eq!(parsed.in_place_output, None);
    }

    #[test]
    fn fingerprint_is_stable_across_csv_round_trip() {
        let original = sample();
        let row = to_csv_row(&original);
        let parsed = from_csv_row(&row).unwrap();
        assert_eq!(original.fingerprint(), parsed.fingerprint());
    }
}
