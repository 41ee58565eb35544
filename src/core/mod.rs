pub mod attribute;
pub mod bit_coder;
pub(crate) mod buffer;
pub mod mesh;
pub mod point_cloud;
pub mod shared;
