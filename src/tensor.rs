//! Cost-model tensor: shape, datatype, layout and the bit-packed size
//! contract (C1), grounded on `include/vpu/vpu_tensor.h`'s `VPUTensor`.

use thiserror::Error;

use crate::types::{DataType, Layout};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TensorError {
    #[error("tensor with non-zero volume cannot carry an invalid layout ({dtype:?})")]
    NotRepresentable { innermost: u32, dtype: DataType },
}

/// `[W, H, C, B]` shape, always semantic regardless of `layout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tensor {
    pub shape: [u32; 4],
    pub dtype: DataType,
    pub layout: Layout,
    pub sparse: bool,
}

impl Tensor {
    /// Construct a tensor, rejecting shape/dtype/layout triples that are
    /// not representable under the default packmode-0 contract: no sample
    /// crosses a byte boundary, no byte contains two dimensions.
    pub fn new(shape: [u32; 4], dtype: DataType, layout: Layout, sparse: bool) -> Result<Self, TensorError> {
        let t = Tensor { shape, dtype, layout, sparse };
        t.check_representable()?;
        Ok(t)
    }

    /// Sentinel tensor used for the weight role of ops that have none
    /// (`MAXPOOL`, `AVGPOOL`): `Layout::Invalid`, all-zero shape.
    pub fn sentinel() -> Self {
        Tensor { shape: [0, 0, 0, 0], dtype: DataType::U8, layout: Layout::Invalid, sparse: false }
    }

    /// Sub-8-bit dtypes never reject construction on an odd innermost
    /// dimension: `size_bytes` tail-pads the last partial byte instead (see
    /// its doc comment). The only currently-known non-representable case is
    /// a non-sentinel tensor carrying `Layout::Invalid`.
    fn check_representable(&self) -> Result<(), TensorError> {
        if self.layout == Layout::Invalid && self.volume() != 0 {
            return Err(TensorError::NotRepresentable { innermost: 0, dtype: self.dtype });
        }
        Ok(())
    }

    /// Product of all shape components, regardless of dtype.
    pub fn volume(&self) -> u64 {
        self.shape.iter().map(|&d| d as u64).product()
    }

    pub fn is_float(&self) -> bool {
        self.dtype.is_float()
    }

    pub fn is_int(&self) -> bool {
        self.dtype.is_int()
    }

    /// Memory footprint in bytes under the active (packmode-0) contract.
    /// For sub-8-bit dtypes the innermost dimension is packed `8/bits`
    /// elements per byte; a partial remainder still consumes one whole
    /// byte (tail padding) rather than being rejected at construction.
    pub fn size_bytes(&self) -> u64 {
        let bits = self.dtype.bits() as u64;
        if bits >= 8 {
            return self.volume() * self.dtype.bytes() as u64;
        }
        let order = self.layout.dim_order();
        let innermost = self.shape[order[0]] as u64;
        let outer = self.shape[order[1]] as u64 * self.shape[order[2]] as u64 * self.shape[order[3]] as u64;
        if innermost == 0 || outer == 0 {
            return 0;
        }
        let k = 8 / bits; // elements per complete byte sequence
        let complete = innermost / k;
        let tail = innermost % k;
        let tail_bytes = if tail == 0 { 0 } else { 1 };
        let innermost_bytes = complete + tail_bytes;
        innermost_bytes * outer
    }

    /// Succeeds iff `new` has the same bit-width as the current dtype.
    pub fn change_dtype_superficial(&self, new: DataType) -> Option<Tensor> {
        if new.bits() == self.dtype.bits() {
            Some(Tensor { dtype: new, ..*self })
        } else {
            None
        }
    }

    /// Succeeds iff `new` has the same innermost-to-outermost dimension
    /// order as the current layout (same memory, different alias).
    pub fn try_relabel_layout(&self, new: Layout) -> Option<Tensor> {
        if new.dim_order() == self.layout.dim_order() {
            Some(Tensor { layout: new, ..*self })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layout;

    #[test]
    fn int4_even_innermost_is_representable() {
        let t = Tensor::new([3, 4, 2, 1], DataType::I4, Layout::Zxy, false).unwrap();
        assert_eq!(t.size_bytes(), 12);
    }

    #[test]
    fn int4_tail_rounds_up_one_byte() {
        let t = Tensor::new([3, 4, 3, 1], DataType::I4, Layout::Zxy, false).unwrap();
        assert_eq!(t.size_bytes(), 24);
    }

    #[test]
    fn invalid_layout_with_nonzero_volume_is_constructor_error() {
        let err = Tensor::new([4, 4, 3, 1], DataType::I4, Layout::Invalid, false).unwrap_err();
        assert!(matches!(err, TensorError::NotRepresentable { .. }));
    }

    #[test]
    fn zero_dim_tensor_has_zero_size() {
        let t = Tensor::new([0, 4, 2, 1], DataType::U8, Layout::Zxy, false).unwrap();
        assert_eq!(t.size_bytes(), 0);
    }

    #[test]
    fn eight_bit_and_above_is_volume_times_bytes() {
        let t = Tensor::new([4, 4, 4, 1], DataType::U8, Layout::Zxy, false).unwrap();
        assert_eq!(t.size_bytes(), 64);
        let t32 = Tensor::new([2, 2, 2, 1], DataType::F32, Layout::Zxy, false).unwrap();
        assert_eq!(t32.size_bytes(), 8 * 4);
    }

    #[test]
    fn change_dtype_superficial_requires_same_bits() {
        let t = Tensor::new([4, 4, 4, 1], DataType::U8, Layout::Zxy, false).unwrap();
        assert!(t.change_dtype_superficial(DataType::I8).is_some());
        assert!(t.change_dtype_superficial(DataType::U16).is_none());
    }

    #[test]
    fn relabel_layout_requires_same_dim_order() {
        let t = Tensor::new([4, 4, 4, 1], DataType::U8, Layout::Zxy, false).unwrap();
        assert!(t.try_relabel_layout(Layout::ZMajor).is_some());
        assert!(t.try_relabel_layout(Layout::Xyz).is_none());
    }

    #[test]
    fn sentinel_has_zero_volume_and_invalid_layout() {
        let s = Tensor::sentinel();
        assert_eq!(s.volume(), 0);
        assert_eq!(s.layout, Layout::Invalid);
    }
}
