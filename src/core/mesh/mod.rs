pub mod builder;

use super::attribute::{Attribute, AttributeType};
use super::point_cloud::{self, PointCloud};
use crate::core::shared::PointIdx;

/// Represents a triangle mesh.
/// It consists of a [PointCloud] holding the per-point attributes and a list of faces,
/// where each face is defined by three point indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub(crate) point_cloud: PointCloud,
    pub(crate) faces: Vec<[PointIdx; 3]>,
}

impl Mesh {
    pub fn new(point_cloud: PointCloud, faces: Vec<[PointIdx; 3]>) -> Self {
        Self { point_cloud, faces }
    }

    pub fn get_faces(&self) -> &[[PointIdx; 3]] {
        &self.faces
    }

    pub fn get_point_cloud(&self) -> &PointCloud {
        &self.point_cloud
    }

    pub fn get_attributes(&self) -> &[Attribute] {
        self.point_cloud.get_attributes()
    }

    pub fn num_points(&self) -> usize {
        self.point_cloud.num_points()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn get_named_attribute(&self, att_type: AttributeType) -> Option<&Attribute> {
        self.point_cloud.get_named_attribute(att_type)
    }

    pub fn deduplicate_attribute_values(&mut self) -> Result<usize, point_cloud::Err> {
        self.point_cloud.deduplicate_attribute_values()
    }

    /// Merges points that use identical values and rewrites the faces accordingly.
    pub fn deduplicate_point_ids(&mut self) -> Result<(), point_cloud::Err> {
        let old_to_new = self.point_cloud.deduplicate_point_ids()?;
        for face in self.faces.iter_mut() {
            for p in face.iter_mut() {
                *p = old_to_new[usize::from(*p)];
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::builder::MeshBuilder;

    #[test]
    fn test_deduplicate_remaps_faces() {
        // two triangles forming a quad, with the shared corners stored twice
        let mut builder = MeshBuilder::new();
        builder.add_attribute(
            vec![
                [0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
            ],
            AttributeType::Position,
        );
        builder.set_connectivity_attribute(vec![[0, 1, 2], [3, 4, 5]]);
        let mut mesh = builder.build().unwrap();

        mesh.deduplicate_attribute_values().unwrap();
        mesh.deduplicate_point_ids().unwrap();

        assert_eq!(mesh.num_points(), 4);
        let faces = mesh.get_faces().iter()
            .map(|f| f.map(usize::from))
            .collect::<Vec<_>>();
        assert_eq!(faces, vec![[0, 1, 2], [0, 2, 3]]);
    }
}
