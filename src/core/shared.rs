use super::attribute::ComponentDataType;
use crate::core::bit_coder::ByteWriter;

use std::fmt;
use std::mem;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeValueIdx(usize);
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointIdx(usize);

macro_rules! idx_debug_impl {
    ($($t:ty),*) => {
        $(
            impl fmt::Debug for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }
        )*
    };
}

idx_debug_impl!{
    AttributeValueIdx,
    PointIdx
}

macro_rules! idx_impl {
    ($($t:ty),*) => {
        $(
            impl From<usize> for $t {
                fn from(idx: usize) -> Self {
                    Self(idx)
                }
            }

            impl From<$t> for usize {
                fn from(idx: $t) -> Self {
                    idx.0
                }
            }
        )*
    };
}

idx_impl! {
    AttributeValueIdx,
    PointIdx
}

pub trait ConfigType {
    fn default()-> Self;
}


/// A scalar that can be stored in an attribute or read from a PLY property.
/// Values are always stored little-endian.
pub trait DataValue:
    Clone + Copy + fmt::Debug + PartialEq + PartialOrd
{
    fn get_dyn() -> ComponentDataType;
    fn from_u64(data: u64) -> Self;
    fn from_i64(data: i64) -> Self;
    fn from_f64(data: f64) -> Self;

    /// Numeric conversion with the semantics of an `as` cast.
    fn cast<T: DataValue>(self) -> T;

    /// Reads the value from the first `size_of::<Self>()` bytes of `bytes`.
    /// Panics if `bytes` is shorter than that.
    fn read_le(bytes: &[u8]) -> Self;

    fn write_to<W>(self, writer: &mut W) where W: ByteWriter;
}

macro_rules! impl_data_value {
    ($kind:ident: $(($t:ty, $component_type: expr)),*) => {
        $(
            impl DataValue for $t {
                fn get_dyn() -> ComponentDataType {
                    $component_type
                }

                fn from_u64(data: u64) -> Self {
                    data as $t
                }

                fn from_i64(data: i64) -> Self {
                    data as $t
                }

                fn from_f64(data: f64) -> Self {
                    data as $t
                }

                fn cast<T: DataValue>(self) -> T {
                    impl_data_value!(@cast $kind, self)
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..mem::size_of::<$t>()]);
                    <$t>::from_le_bytes(buf)
                }

                fn write_to<W>(self, writer: &mut W) where W: ByteWriter {
                    writer.write_bytes(&self.to_le_bytes());
                }
            }
        )*
    };

    (@cast signed, $v:expr) => { T::from_i64($v as i64) };
    (@cast unsigned, $v:expr) => { T::from_u64($v as u64) };
    (@cast float, $v:expr) => { T::from_f64($v as f64) };
}

impl_data_value!(unsigned:
    (u8, ComponentDataType::U8),
    (u16, ComponentDataType::U16),
    (u32, ComponentDataType::U32),
    (u64, ComponentDataType::U64)
);

impl_data_value!(signed:
    (i8, ComponentDataType::I8),
    (i16, ComponentDataType::I16),
    (i32, ComponentDataType::I32),
    (i64, ComponentDataType::I64)
);

impl_data_value!(float:
    (f32, ComponentDataType::F32),
    (f64, ComponentDataType::F64)
);


fn read_as<S: DataValue, T: DataValue>(bytes: &[u8]) -> T {
    S::read_le(bytes).cast()
}

/// Returns a function that decodes one little-endian value of type `src` and
/// converts it to `T`.
pub(crate) fn converter<T: DataValue>(src: ComponentDataType) -> fn(&[u8]) -> T {
    match src {
        ComponentDataType::I8 => read_as::<i8, T>,
        ComponentDataType::U8 => read_as::<u8, T>,
        ComponentDataType::I16 => read_as::<i16, T>,
        ComponentDataType::U16 => read_as::<u16, T>,
        ComponentDataType::I32 => read_as::<i32, T>,
        ComponentDataType::U32 => read_as::<u32, T>,
        ComponentDataType::I64 => read_as::<i64, T>,
        ComponentDataType::U64 => read_as::<u64, T>,
        ComponentDataType::F32 => read_as::<f32, T>,
        ComponentDataType::F64 => read_as::<f64, T>,
    }
}
