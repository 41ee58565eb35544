use thiserror::Error;

use crate::core::attribute::{Attribute, AttributeId, AttributeType};
use crate::core::point_cloud::{self, PointCloud};
use crate::core::shared::{DataValue, PointIdx};
use super::Mesh;

/// Assembles a [Mesh] or a [PointCloud] from plain arrays.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    attributes: Vec<Attribute>,
    faces: Vec<[usize; 3]>,
    current_id: usize,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            attributes: Vec::new(),
            faces: Vec::new(),
            current_id: 0,
        }
    }

    pub fn add_attribute<Data, const N: usize>(&mut self, data: Vec<[Data; N]>, att_type: AttributeType) -> AttributeId
        where Data: DataValue
    {
        let unique_id = AttributeId::new(self.current_id);
        let components = data.into_iter().flatten().collect::<Vec<_>>();
        self.attributes.push(
            Attribute::from_components(unique_id, att_type, N, &components)
        );
        self.current_id += 1;
        unique_id
    }

    pub fn set_connectivity_attribute(&mut self, data: Vec<[usize; 3]>) {
        self.faces = data;
    }

    /// Builds the mesh. A position attribute is required, and every face index
    /// must refer to an existing point.
    pub fn build(self) -> Result<Mesh, Err> {
        if !self.attributes.iter().any(|att| att.get_attribute_type() == AttributeType::Position) {
            return Err(Err::MissingPosition);
        }
        let Self { attributes, faces, .. } = self;
        let point_cloud = Self::assemble_point_cloud(attributes)?;

        let num_points = point_cloud.num_points();
        if let Some(&idx) = faces.iter().flatten().find(|&&idx| idx >= num_points) {
            return Err(Err::FaceIndexOutOfRange(idx, num_points));
        }
        let faces = faces.into_iter()
            .map(|f| f.map(PointIdx::from))
            .collect();

        Ok(Mesh::new(point_cloud, faces))
    }

    /// Builds a point cloud, ignoring any faces.
    pub fn build_point_cloud(self) -> Result<PointCloud, Err> {
        Self::assemble_point_cloud(self.attributes)
    }

    fn assemble_point_cloud(attributes: Vec<Attribute>) -> Result<PointCloud, Err> {
        let num_points = attributes.first().map_or(0, Attribute::len);
        let mut point_cloud = PointCloud::new(num_points);
        for att in attributes {
            point_cloud.add_attribute(att)?;
        }
        Ok(point_cloud)
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Attribute length mismatch: {0}")]
    AttributeLengthMismatch(#[from] point_cloud::Err),
    #[error("Face index {0} is out of range for {1} points.")]
    FaceIndexOutOfRange(usize, usize),
    #[error("A mesh needs a position attribute.")]
    MissingPosition,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let mut builder = MeshBuilder::new();
        let pos = builder.add_attribute(vec![[0i32, 0, 0], [1, 0, 0], [0, 1, 0]], AttributeType::Position);
        let normal = builder.add_attribute(vec![[0.0f32, 0.0, 1.0]; 3], AttributeType::Normal);
        builder.set_connectivity_attribute(vec![[0, 1, 2]]);
        let mesh = builder.build().unwrap();

        assert_eq!(mesh.num_points(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.get_named_attribute(AttributeType::Position).unwrap().get_id(), pos);
        assert_eq!(mesh.get_named_attribute(AttributeType::Normal).unwrap().get_id(), normal);
        assert_eq!(
            mesh.get_named_attribute(AttributeType::Position).unwrap().get::<i32>(PointIdx::from(1)),
            vec![1, 0, 0]
        );
    }

    #[test]
    fn test_build_errors() {
        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0.0f32, 0.0, 0.0]; 3], AttributeType::Position);
        builder.set_connectivity_attribute(vec![[0, 1, 3]]);
        assert_eq!(builder.build().unwrap_err(), Err::FaceIndexOutOfRange(3, 3));

        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0.0f32, 0.0, 0.0]; 3], AttributeType::Position);
        builder.add_attribute(vec![[1.0f32]; 2], AttributeType::Opacity);
        assert!(matches!(builder.build(), Err(Err::AttributeLengthMismatch(_))));

        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[1.0f32]; 2], AttributeType::Opacity);
        assert_eq!(builder.build().unwrap_err(), Err::MissingPosition);
    }

    #[test]
    fn test_build_point_cloud() {
        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0.5f32]; 5], AttributeType::Opacity);
        let pc = builder.build_point_cloud().unwrap();
        assert_eq!(pc.num_points(), 5);
        assert!(pc.get_named_attribute(AttributeType::Position).is_none());
    }
}
