//! Conversion between binary little-endian PLY files and [`Mesh`] / [`PointCloud`].
//!
//! Besides positions, normals and colors, the vertex element may carry the parameters of
//! 3D gaussian splats (`f_dc_*`, `f_rest_*`, `opacity`, `scale_*`, `rot_*`). Which of these
//! are present is decided by the property names alone; see [`group`] for the table.

pub mod decode;
pub mod encode;
pub(crate) mod group;
pub mod header;
pub mod property;
pub mod triangulate;

use std::path::Path;

use thiserror::Error;

use crate::core::attribute::ComponentDataType;
use crate::core::point_cloud;
use crate::{Mesh, PointCloud};

pub use decode::{decode_mesh, decode_point_cloud, Config};
pub use encode::{encode_mesh, encode_point_cloud, EncodedPly};
pub use header::{PlyReader, PlySchema};

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Deduplication failed: {0}")]
    DeduplicationFailure(point_cloud::Err),
    #[error("Failed to parse the PLY header: {0}")]
    Header(#[from] header::Err),
    #[error("Property '{0}' is expected to be a list.")]
    InvalidListProperty(String),
    #[error("Face index {0} is out of range for {1} points.")]
    InvalidTopology(i64, usize),
    #[error("Failed to access '{0}': {1}")]
    Io(String, std::io::ErrorKind),
    #[error("Element '{0}' is missing.")]
    MissingElement(String),
    #[error("Required property '{0}' is missing.")]
    MissingRequiredProperty(String),
    #[error("Invalid attribute: {0}")]
    PointCloud(#[from] point_cloud::Err),
    #[error("Property '{0}' is expected to be of type {1:?}, but it is {2:?}.")]
    TypeMismatch(String, ComponentDataType, ComponentDataType),
}

pub fn decode_mesh_from_bytes(data: &[u8], cfg: &Config) -> Result<Mesh, Err> {
    let schema = PlyReader::read(data)?;
    decode_mesh(&schema, cfg)
}

pub fn decode_point_cloud_from_bytes(data: &[u8]) -> Result<PointCloud, Err> {
    let schema = PlyReader::read(data)?;
    decode_point_cloud(&schema)
}

fn read_file(path: &Path) -> Result<Vec<u8>, Err> {
    std::fs::read(path).map_err(|e| Err::Io(path.display().to_string(), e.kind()))
}

fn write_file(path: &Path, ply: EncodedPly) -> Result<(), Err> {
    std::fs::write(path, ply.into_bytes()).map_err(|e| Err::Io(path.display().to_string(), e.kind()))
}

pub fn read_ply_mesh<P: AsRef<Path>>(path: P, cfg: &Config) -> Result<Mesh, Err> {
    let data = read_file(path.as_ref())?;
    decode_mesh_from_bytes(&data, cfg)
}

pub fn read_ply_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud, Err> {
    let data = read_file(path.as_ref())?;
    decode_point_cloud_from_bytes(&data)
}

pub fn write_ply_mesh<P: AsRef<Path>>(path: P, mesh: &Mesh) -> Result<(), Err> {
    // encode first so that nothing is written on failure
    let ply = encode_mesh(mesh)?;
    write_file(path.as_ref(), ply)
}

pub fn write_ply_point_cloud<P: AsRef<Path>>(path: P, point_cloud: &PointCloud) -> Result<(), Err> {
    let ply = encode_point_cloud(point_cloud)?;
    write_file(path.as_ref(), ply)
}
