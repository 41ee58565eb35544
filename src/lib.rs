// lib.rs

/// Contains the interface between the geometry model and PLY files.
pub mod io;

/// Contains the shared definitions, native objects, and the buffer.
pub mod core;

pub use crate::core::mesh::Mesh;
pub use crate::core::point_cloud::PointCloud;

/// Contains the most commonly used traits, types, and objects.
pub mod prelude {
    pub use crate::core::attribute::{Attribute, AttributeId, AttributeType, ComponentDataType};
    pub use crate::core::mesh::{Mesh, builder::MeshBuilder};
    pub use crate::core::point_cloud::PointCloud;
    pub use crate::core::shared::{ConfigType, DataValue, PointIdx};
    pub use crate::core::bit_coder::ByteWriter;
    pub use crate::io::ply::{self, decode_mesh_from_bytes, decode_point_cloud_from_bytes};
}
