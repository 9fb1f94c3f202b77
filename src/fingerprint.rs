//! Stable FNV-1a workload fingerprint (C9), grounded on
//! `src/vpu/dpu_workload.cpp`'s `DPUWorkload::hash()`.
//!
//! Field order mirrors the original exactly, with one intentional
//! divergence: where the original resolves optional fields (`weight_type`,
//! `weightless_op`, `in_place_output`, `superdense`, `input_autopad`,
//! `output_autopad`) to a concrete value before hashing, this engine hashes
//! a presence byte ahead of each one and only the value when present. Two
//! workloads that differ only in whether such a field was explicitly pinned
//! are deliberately given different fingerprints; see the open question in
//! `DESIGN.md`.

use crate::halo::{Halo, HaloEdges};
use crate::sep::Sep;
use crate::tensor::Tensor;
use crate::workload::Workload;

const FNV_PRIME: u32 = 0x0100_0193;
const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

fn hash_uint32(h: u32, value: u32) -> u32 {
    let mut h = h;
    h = (h ^ (value & 0xFF)).wrapping_mul(FNV_PRIME);
    h = (h ^ ((value >> 8) & 0xFF)).wrapping_mul(FNV_PRIME);
    h = (h ^ ((value >> 16) & 0xFF)).wrapping_mul(FNV_PRIME);
    h = (h ^ (value >> 24)).wrapping_mul(FNV_PRIME);
    h
}

fn hash_float(h: u32, c: f32) -> u32 {
    let value = if c < 1.0 && c > -1.0 && c != 0.0 { (c * 100.0) as u32 } else { c as u32 };
    hash_uint32(h, value)
}

fn hash_enum(h: u32, value: u32) -> u32 {
    hash_uint32(h, value)
}

fn hash_bool(h: u32, value: bool) -> u32 {
    hash_uint32(h, value as u32)
}

fn hash_optional_bool(h: u32, value: Option<bool>) -> u32 {
    match value {
        Some(v) => hash_bool(hash_bool(h, true), v),
        None => hash_bool(h, false),
    }
}

fn hash_tensor(h: u32, tensor: &Tensor) -> u32 {
    let mut h = h;
    for &dim in &tensor.shape {
        h = hash_uint32(h, dim);
    }
    h = hash_enum(h, tensor.dtype as u32);
    h = hash_enum(h, tensor.layout as u32);
    h = hash_bool(h, tensor.sparse);
    h
}

fn hash_halo_edges(h: u32, edges: &HaloEdges) -> u32 {
    let mut h = h;
    h = hash_uint32(h, edges.top as u32);
    h = hash_uint32(h, edges.bottom as u32);
    h = hash_uint32(h, edges.left as u32);
    h = hash_uint32(h, edges.right as u32);
    h = hash_uint32(h, edges.front as u32);
    h = hash_uint32(h, edges.back as u32);
    h
}

fn hash_halo(h: u32, halo: &Halo) -> u32 {
    let mut h = h;
    h = hash_halo_edges(h, &halo.in0_halo);
    h = hash_halo_edges(h, &halo.out0_halo);
    h = hash_halo_edges(h, &halo.out0_broadcast_count);
    h = hash_halo_edges(h, &halo.out0_inbound_halo);
    h
}

fn hash_sep(h: u32, sep: &Sep) -> u32 {
    let mut h = h;
    h = hash_bool(h, sep.enabled);
    for &dim in &sep.pointer_table_shape {
        h = hash_uint32(h, dim);
    }
    for &dim in &sep.actual_input_shape {
        h = hash_uint32(h, dim);
    }
    h = hash_bool(h, sep.no_sparse_map);
    h
}

/// Computes the stable fingerprint of a workload. Identical for two
/// workloads differing only in the diagnostic `offsets`/`layer_info`
/// fields, by construction (those fields are never read here).
pub fn fingerprint(w: &Workload) -> u32 {
    let mut h = FNV_OFFSET_BASIS;

    h = hash_enum(h, w.device as u32);
    h = hash_enum(h, w.op as u32);

    h = hash_tensor(h, &w.input_0);
    h = hash_tensor(h, &w.output_0);

    h = hash_uint32(h, w.kernel.h);
    h = hash_uint32(h, w.kernel.w);
    h = hash_uint32(h, w.stride.h);
    h = hash_uint32(h, w.stride.w);
    h = hash_uint32(h, w.pad.top);
    h = hash_uint32(h, w.pad.bottom);
    h = hash_uint32(h, w.pad.left);
    h = hash_uint32(h, w.pad.right);

    h = hash_enum(h, w.exec_mode as u32);
    h = hash_enum(h, w.act_fn as u32);

    h = hash_float(h, w.act_sparsity);
    h = hash_float(h, w.weight_sparsity);

    for swizz in w.input_swizzling {
        h = hash_enum(h, swizz as u32);
    }
    for swizz in w.output_swizzling {
        h = hash_enum(h, swizz as u32);
    }

    h = hash_uint32(h, w.output_write_tiles);

    // offsets deliberately excluded: intratile-split bookkeeping, not part
    // of the cache key.

    h = hash_enum(h, w.isi_strategy as u32);
    h = hash_bool(h, w.weight_sparsity_enabled);

    h = hash_halo(h, &w.halo);
    h = hash_sep(h, &w.sep);

    h = match w.weight_type {
        Some(dt) => hash_enum(hash_bool(h, true), dt as u32),
        None => hash_bool(h, false),
    };

    // layer_info deliberately excluded: diagnostic only, not part of the
    // cache key.

    h = hash_optional_bool(h, w.weightless_op);
    h = hash_optional_bool(h, w.in_place_output);
    h = hash_optional_bool(h, w.superdense);
    h = hash_optional_bool(h, w.input_autopad);
    h = hash_optional_bool(h, w.output_autopad);

    h = hash_enum(h, w.mpe_engine as u32);
    h = hash_bool(h, w.reduce_minmax_op);

    h
}
