//! Device, datatype, operation, layout and execution enumerations (C1).
//!
//! Every enum round-trips through `EnumName.VALUE` text for CSV
//! serialization (`Display`/`FromStr`), mirroring the source model's
//! `mapToText`/`mapFromText` convention.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when an enum's textual form can't be parsed back.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {enum_name} value: {value:?}")]
pub struct EnumParseError {
    pub enum_name: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), ".{}"), match self {
                    $(Self::$variant => stringify!($variant)),+
                })
            }
        }

        impl FromStr for $name {
            type Err = EnumParseError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let tail = s.rsplit('.').next().unwrap_or(s);
                match tail {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    other => Err(EnumParseError { enum_name: stringify!($name), value: other.to_string() }),
                }
            }
        }
    };
}

/// NPU generations. `Gen2_0..Gen5_0` are concrete; the trailing two are
/// reserved for future silicon and carry only placeholder device limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Device {
    Gen2_0,
    Gen2_1,
    Gen2_7,
    Gen4_0,
    Gen5_0,
    ReservedA,
    ReservedB,
}
text_enum!(Device { Gen2_0, Gen2_1, Gen2_7, Gen4_0, Gen5_0, ReservedA, ReservedB });

impl Device {
    pub const ALL: [Device; 7] = [
        Device::Gen2_0,
        Device::Gen2_1,
        Device::Gen2_7,
        Device::Gen4_0,
        Device::Gen5_0,
        Device::ReservedA,
        Device::ReservedB,
    ];
}

/// Supported activator/weight/output datatypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    U1,
    I1,
    U2,
    I2,
    U4,
    I4,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F16,
    BF16,
    F32,
    HF8,
    BF8,
}
text_enum!(DataType { U1, I1, U2, I2, U4, I4, U8, I8, U16, I16, U32, I32, F16, BF16, F32, HF8, BF8 });

impl DataType {
    /// Bit-width as declared in the canonical table of §4.1.
    pub fn bits(self) -> u32 {
        match self {
            DataType::U1 | DataType::I1 => 1,
            DataType::U2 | DataType::I2 => 2,
            DataType::U4 | DataType::I4 => 4,
            DataType::U8 | DataType::I8 | DataType::HF8 | DataType::BF8 => 8,
            DataType::U16 | DataType::I16 | DataType::F16 | DataType::BF16 => 16,
            DataType::U32 | DataType::I32 | DataType::F32 => 32,
        }
    }

    /// Byte-width, meaningful only for `bits() >= 8` types.
    pub fn bytes(self) -> u32 {
        self.bits().div_ceil(8)
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            DataType::F16 | DataType::BF16 | DataType::F32 | DataType::HF8 | DataType::BF8
        )
    }

    pub fn is_int(self) -> bool {
        !self.is_float()
    }

    /// Folds signed/unsigned at the same bit-width and float aliases to a
    /// canonical representative, per §4.5 `restrict_datatype`.
    pub fn restricted(self) -> DataType {
        match self {
            DataType::I1 => DataType::U1,
            DataType::I2 => DataType::U2,
            DataType::I4 => DataType::U4,
            DataType::I8 => DataType::U8,
            DataType::I16 => DataType::U16,
            DataType::I32 => DataType::U32,
            DataType::BF16 => DataType::F16,
            DataType::BF8 => DataType::HF8,
            other => other,
        }
    }
}

/// The hardware operation families this engine knows how to cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Conv,
    DwConv,
    EltwiseAdd,
    EltwiseMul,
    Maxpool,
    Avgpool,
    CmConv,
    LayerNorm,
}
text_enum!(Operation { Conv, DwConv, EltwiseAdd, EltwiseMul, Maxpool, Avgpool, CmConv, LayerNorm });

impl Operation {
    pub fn is_eltwise(self) -> bool {
        matches!(self, Operation::EltwiseAdd | Operation::EltwiseMul)
    }

    pub fn is_pool(self) -> bool {
        matches!(self, Operation::Maxpool | Operation::Avgpool)
    }
}

/// Memory layout: dictates dimension order only, never the semantic shape.
/// `ZMajor`/`CMajor` are VPU2.0-era aliases of `Zxy`/`Xyz`; `Invalid` is the
/// sentinel layout used for the absent weight tensor of pooling ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layout {
    ZMajor,
    CMajor,
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
    Invalid,
}
text_enum!(Layout { ZMajor, CMajor, Xyz, Xzy, Yxz, Yzx, Zxy, Zyx, Invalid });

/// Index of W,H,C,B in the innermost-to-outermost dimension order.
/// Values are indices into a `[W,H,C,B]` shape array (W=0,H=1,C=2,B=3).
pub type DimOrder = [usize; 4];

pub const DIM_W: usize = 0;
pub const DIM_H: usize = 1;
pub const DIM_C: usize = 2;
pub const DIM_B: usize = 3;

impl Layout {
    /// Dimension order from innermost (contiguous) to outermost.
    /// `Invalid` falls back to the ZMajor/Zxy order, matching the source
    /// model's treatment of the sentinel layout.
    pub fn dim_order(self) -> DimOrder {
        match self {
            Layout::CMajor | Layout::Xyz => [DIM_W, DIM_H, DIM_C, DIM_B],
            Layout::Xzy => [DIM_W, DIM_C, DIM_H, DIM_B],
            Layout::Yxz => [DIM_H, DIM_W, DIM_C, DIM_B],
            Layout::Yzx => [DIM_H, DIM_C, DIM_W, DIM_B],
            Layout::ZMajor | Layout::Zxy | Layout::Invalid => [DIM_C, DIM_W, DIM_H, DIM_B],
            Layout::Zyx => [DIM_C, DIM_H, DIM_W, DIM_B],
        }
    }
}

/// MAC-grid tiling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExecutionMode {
    Vector,
    Matrix,
    VectorFp16,
    Cuboid16x16,
    Cuboid8x16,
    Cuboid4x16,
}
text_enum!(ExecutionMode { Vector, Matrix, VectorFp16, Cuboid16x16, Cuboid8x16, Cuboid4x16 });

/// Compression-codec swizzling key. Older devices accept only `Key0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Swizzling {
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
}
text_enum!(Swizzling { Key0, Key1, Key2, Key3, Key4, Key5 });

/// Inter-slice interconnect discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ISIStrategy {
    Clustering,
    SplitOverH,
    SplitOverK,
}
text_enum!(ISIStrategy { Clustering, SplitOverH, SplitOverK });

/// Post-op activation applied after the main compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivationFunction {
    None,
    Relu,
    Lrelu,
    Add,
    Sub,
    Mult,
}
text_enum!(ActivationFunction { None, Relu, Lrelu, Add, Sub, Mult });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datatype_bits_table() {
        assert_eq!(DataType::U4.bits(), 4);
        assert_eq!(DataType::I4.bits(), 4);
        assert_eq!(DataType::F16.bits(), 16);
        assert_eq!(DataType::HF8.bits(), 8);
        assert_eq!(DataType::F32.bytes(), 4);
    }

    #[test]
    fn float_classification() {
        assert!(DataType::HF8.is_float());
        assert!(DataType::BF8.is_float());
        assert!(DataType::U8.is_int());
    }

    #[test]
    fn enum_round_trip() {
        for d in Device::ALL {
            let text = d.to_string();
            assert_eq!(text.parse::<Device>().unwrap(), d);
        }
        assert_eq!("DataType.U4".parse::<DataType>().unwrap(), DataType::U4);
        assert!("DataType.NOPE".parse::<DataType>().is_err());
    }

    #[test]
    fn restrict_datatype_folds_signed_and_aliases() {
        assert_eq!(DataType::I8.restricted(), DataType::U8);
        assert_eq!(DataType::BF16.restricted(), DataType::F16);
        assert_eq!(DataType::BF8.restricted(), DataType::HF8);
        assert_eq!(DataType::F32.restricted(), DataType::F32);
    }

    #[test]
    fn layout_dim_order_aliases_match() {
        assert_eq!(Layout::ZMajor.dim_order(), Layout::Zxy.dim_order());
        assert_eq!(Layout::CMajor.dim_order(), Layout::Xyz.dim_order());
        assert_eq!(Layout::Invalid.dim_order(), Layout::Zxy.dim_order());
    }
}
