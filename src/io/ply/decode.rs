use crate::core::attribute::{Attribute, AttributeId, AttributeType, ComponentDataType};
use crate::core::mesh::Mesh;
use crate::core::point_cloud::PointCloud;
use crate::core::shared::{AttributeValueIdx, ConfigType, DataValue, PointIdx};
use super::group::ATTRIBUTE_GROUPS;
use super::header::{PlyProperty, PlySchema};
use super::property::PropertyReader;
use super::triangulate::{num_fan_triangles, triangulate_fan};
use super::Err;

/// Post-processing applied to decoded meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// merge bitwise identical values within each attribute
    pub deduplicate_attribute_values: bool,
    /// merge points that use the same value in every attribute, and remap the faces
    pub deduplicate_point_ids: bool,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            deduplicate_attribute_values: true,
            deduplicate_point_ids: true,
        }
    }
}

/// Decodes a triangle mesh. Polygons are fan-triangulated.
/// Deduplication runs only if the mesh has at least one face.
pub fn decode_mesh(schema: &PlySchema, cfg: &Config) -> Result<Mesh, Err> {
    let polygons = decode_faces(schema)?;
    let point_cloud = decode_point_cloud(schema)?;
    let faces = to_point_indices(polygons, point_cloud.num_points())?;

    let mut mesh = Mesh::new(point_cloud, faces);
    if mesh.num_faces() > 0 {
        if cfg.deduplicate_attribute_values {
            let n = mesh.deduplicate_attribute_values().map_err(Err::DeduplicationFailure)?;
            tracing::debug!("removed {} duplicate attribute values", n);
        }
        if cfg.deduplicate_point_ids {
            mesh.deduplicate_point_ids().map_err(Err::DeduplicationFailure)?;
        }
    }
    Ok(mesh)
}

/// Decodes the vertex element as a point cloud. Faces, if any, are ignored.
pub fn decode_point_cloud(schema: &PlySchema) -> Result<PointCloud, Err> {
    let vertex = schema.get_element("vertex")
        .ok_or_else(|| Err::MissingElement("vertex".to_owned()))?;
    let num_points = vertex.num_entries();

    let mut point_cloud = PointCloud::new(num_points);
    for group in ATTRIBUTE_GROUPS.iter() {
        let Some(selection) = group.select(vertex)? else {
            continue;
        };
        let att = read_attribute(group.att_type, selection.data_type, &selection.properties, num_points);
        tracing::debug!(
            "decoded {:?} with {} components of type {:?}",
            group.att_type, att.get_num_components(), att.get_component_type()
        );
        point_cloud.add_attribute(att)?;
    }
    Ok(point_cloud)
}

/// Reads the face index lists and triangulates them.
fn decode_faces(schema: &PlySchema) -> Result<Vec<[i64; 3]>, Err> {
    let face = schema.get_element("face")
        .ok_or_else(|| Err::MissingElement("face".to_owned()))?;
    let indices = face.get_property("vertex_indices")
        .or_else(|| face.get_property("vertex_index"))
        .ok_or_else(|| Err::MissingRequiredProperty("vertex_indices".to_owned()))?;
    if !indices.is_list() {
        return Err(Err::InvalidListProperty(indices.name().to_owned()));
    }

    let reader = PropertyReader::<i64>::new(indices);
    let num_triangles = (0..reader.num_lists())
        .map(|i| num_fan_triangles(reader.list_entry(i).1))
        .sum();
    let mut faces = Vec::with_capacity(num_triangles);
    for i in 0..reader.num_lists() {
        faces.extend(triangulate_fan(&reader.read_list(i)));
    }
    tracing::trace!("{} polygons triangulated into {} faces", reader.num_lists(), faces.len());
    Ok(faces)
}

fn to_point_indices(faces: Vec<[i64; 3]>, num_points: usize) -> Result<Vec<[PointIdx; 3]>, Err> {
    faces.into_iter()
        .map(|face| {
            if let Some(&idx) = face.iter().find(|&&idx| idx < 0 || idx as u64 >= num_points as u64) {
                return Err(Err::InvalidTopology(idx, num_points));
            }
            Ok(face.map(|idx| PointIdx::from(idx as usize)))
        })
        .collect()
}

fn read_attribute(att_type: AttributeType, data_type: ComponentDataType, properties: &[&PlyProperty], num_points: usize) -> Attribute {
    match data_type {
        ComponentDataType::I8 => read_properties_to_attribute::<i8>(att_type, properties, num_points),
        ComponentDataType::U8 => read_properties_to_attribute::<u8>(att_type, properties, num_points),
        ComponentDataType::I16 => read_properties_to_attribute::<i16>(att_type, properties, num_points),
        ComponentDataType::U16 => read_properties_to_attribute::<u16>(att_type, properties, num_points),
        ComponentDataType::I32 => read_properties_to_attribute::<i32>(att_type, properties, num_points),
        ComponentDataType::U32 => read_properties_to_attribute::<u32>(att_type, properties, num_points),
        ComponentDataType::I64 => read_properties_to_attribute::<i64>(att_type, properties, num_points),
        ComponentDataType::U64 => read_properties_to_attribute::<u64>(att_type, properties, num_points),
        ComponentDataType::F32 => read_properties_to_attribute::<f32>(att_type, properties, num_points),
        ComponentDataType::F64 => read_properties_to_attribute::<f64>(att_type, properties, num_points),
    }
}

/// Interleaves the given scalar properties into one attribute, one component per property.
fn read_properties_to_attribute<Data: DataValue>(att_type: AttributeType, properties: &[&PlyProperty], num_points: usize) -> Attribute {
    let readers = properties.iter()
        .map(|p| PropertyReader::<Data>::new(p))
        .collect::<Vec<_>>();
    let mut att = Attribute::new_with_len(AttributeId::new(0), att_type, Data::get_dyn(), readers.len(), num_points);
    let mut value = vec![Data::from_u64(0); readers.len()];
    for i in 0..num_points {
        for (v, reader) in value.iter_mut().zip(&readers) {
            *v = reader.read_value(i);
        }
        att.set_value(AttributeValueIdx::from(i), &value);
    }
    att
}
