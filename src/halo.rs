//! Per-edge halo exchange vectors (C2), grounded on
//! `include/vpu/dpu_halo.h`'s `HaloWorkload`.

/// Six signed integers per edge-set: vertical/horizontal/channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HaloEdges {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
    pub front: i32,
    pub back: i32,
}

impl HaloEdges {
    pub fn is_all_positive(&self) -> bool {
        self.top >= 0 && self.bottom >= 0 && self.left >= 0 && self.right >= 0 && self.front >= 0 && self.back >= 0
    }

    pub fn set_vertical_no_halo(&mut self) {
        self.top = 0;
        self.bottom = 0;
    }
}

/// Halo descriptor for a split workload: four independent edge-sets, one
/// per role described in spec §3.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Halo {
    /// How much of the compute-tensor input is read from a neighbor tile
    /// (positive), or how much extra memory is present beyond compute
    /// (negative).
    pub in0_halo: HaloEdges,
    /// Compute-tensor output elements broadcast to neighbors (non-negative).
    pub out0_halo: HaloEdges,
    /// Per-edge replication fan-out (non-negative).
    pub out0_broadcast_count: HaloEdges,
    /// Elements written into this tile by neighbors; extends the memory
    /// tensor but is never consumed at runtime.
    pub out0_inbound_halo: HaloEdges,
}

impl Halo {
    /// Zero all top/bottom fields across all four roles (SOH does not apply).
    pub fn set_vertical_no_halo(&mut self) {
        self.in0_halo.set_vertical_no_halo();
        self.out0_halo.set_vertical_no_halo();
        self.out0_broadcast_count.set_vertical_no_halo();
        self.out0_inbound_halo.set_vertical_no_halo();
    }

    /// Given a per-tile row count `r`, total output height `h`, and
    /// remaining-to-process `remaining`, sets the inbound halo so the
    /// memory tensor equals the full layer output.
    pub fn broadcast_for_all(&mut self, r: i32, h: i32, remaining: i32) {
        self.out0_inbound_halo.top = h - remaining;
        self.out0_inbound_halo.bottom = remaining - r;
    }

    /// Dense input memory-tensor dimension after applying `in0_halo`,
    /// clamped to >= 0; negative halos *add* to the memory tensor.
    pub fn input_memory_dim(&self, compute: [u32; 4]) -> [u32; 4] {
        let h = &self.in0_halo;
        apply_dense(compute, h.top, h.bottom, h.left, h.right, true)
    }

    /// Dense output memory-tensor dimension after applying the inbound halo.
    pub fn output_memory_dim(&self, compute: [u32; 4]) -> [u32; 4] {
        let h = &self.out0_inbound_halo;
        apply_dense(compute, h.top, h.bottom, h.left, h.right, false)
    }
}

/// Applies `top/bottom` to H and `left/right` to W. `subtract` toggles
/// between the input-side (subtract, clamp >= 0) and output-side (add)
/// arithmetic of §4.2.
fn apply_dense(mut shape: [u32; 4], top: i32, bottom: i32, left: i32, right: i32, subtract: bool) -> [u32; 4] {
    use crate::types::{DIM_H, DIM_W};
    let adjust = |dim: u32, lo: i32, hi: i32| -> u32 {
        let delta = lo + hi;
        let signed = if subtract { dim as i64 - delta as i64 } else { dim as i64 + delta as i64 };
        signed.max(0) as u32
    };
    shape[DIM_H] = adjust(shape[DIM_H], top, bottom);
    shape[DIM_W] = adjust(shape[DIM_W], left, right);
    shape
}
