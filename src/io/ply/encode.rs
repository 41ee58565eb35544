use crate::core::attribute::{Attribute, AttributeType, ComponentDataType};
use crate::core::bit_coder::ByteWriter;
use crate::core::mesh::Mesh;
use crate::core::point_cloud::PointCloud;
use crate::core::shared::{DataValue, PointIdx};
use super::group::ATTRIBUTE_GROUPS;
use super::header::data_type_name;
use super::Err;

/// A PLY file as produced by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPly {
    header: String,
    payload: Vec<u8>,
}

impl EncodedPly {
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn write_to<W: ByteWriter>(&self, writer: &mut W) {
        writer.write_bytes(self.header.as_bytes());
        writer.write_bytes(&self.payload);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = self.header.into_bytes();
        out.extend_from_slice(&self.payload);
        out
    }
}

/// An attribute written to the vertex element, and the properties it is written as.
struct Field<'a> {
    att: &'a Attribute,
    names: &'a [String],
}

pub fn encode_point_cloud(point_cloud: &PointCloud) -> Result<EncodedPly, Err> {
    let fields = collect_fields(point_cloud)?;
    let mut header = vertex_header(point_cloud.num_points(), &fields);
    header.push_str("end_header\n");

    let mut payload = Vec::new();
    write_points(&mut payload, point_cloud.num_points(), &fields);
    Ok(EncodedPly { header, payload })
}

/// Encodes the mesh with its faces. Texture coordinates, if present, are written per face corner.
pub fn encode_mesh(mesh: &Mesh) -> Result<EncodedPly, Err> {
    let point_cloud = mesh.get_point_cloud();
    let num_points = point_cloud.num_points();
    let fields = collect_fields(point_cloud)?;
    let tex_coord = point_cloud.get_named_attribute(AttributeType::TextureCoordinate)
        .filter(|att| {
            let usable = att.get_num_components() == 2 && data_type_name(att.get_component_type()).is_some();
            if !usable {
                tracing::debug!("not writing texture coordinates with {} components", att.get_num_components());
            }
            usable
        });
    let faces = mesh.get_faces().iter()
        .map(|face| face_indices(face, num_points))
        .collect::<Result<Vec<_>, Err>>()?;

    let mut header = vertex_header(num_points, &fields);
    header.push_str(&format!("element face {}\n", mesh.num_faces()));
    header.push_str("property list uchar int vertex_indices\n");
    if let Some(att) = tex_coord {
        header.push_str(&format!("property list uchar {} texcoord\n", type_name(att)));
    }
    header.push_str("end_header\n");

    let mut payload = Vec::new();
    write_points(&mut payload, num_points, &fields);
    for (face, indices) in mesh.get_faces().iter().zip(&faces) {
        payload.write_u8(3);
        for &idx in indices {
            idx.write_to(&mut payload);
        }
        if let Some(att) = tex_coord {
            payload.write_u8(6);
            for &p in face {
                payload.write_bytes(att.get_as_bytes(p));
            }
        }
    }
    Ok(EncodedPly { header, payload })
}

/// Picks the attribute of every group, in header order. Attributes the decoder
/// would not read back are left out.
fn collect_fields(point_cloud: &PointCloud) -> Result<Vec<Field<'_>>, Err> {
    let mut fields = Vec::new();
    for group in ATTRIBUTE_GROUPS.iter() {
        let att = point_cloud.get_named_attribute(group.att_type);
        let usable = att.filter(|att| {
            group.accepts_num_components(att.get_num_components())
                && group.accepts_type(att.get_component_type())
        });
        match (usable, att) {
            (Some(att), _) => fields.push(Field {
                att,
                names: group.header_names(att.get_num_components()),
            }),
            (None, Some(att)) if group.att_type == AttributeType::Position && att.get_num_components() == 3 => {
                return Err(Err::TypeMismatch("x".to_owned(), ComponentDataType::F32, att.get_component_type()));
            }
            (None, _) if group.att_type == AttributeType::Position => {
                return Err(Err::MissingRequiredProperty("position".to_owned()));
            }
            (None, Some(att)) => tracing::debug!(
                "not writing {:?} with {} components of type {:?}",
                group.att_type, att.get_num_components(), att.get_component_type()
            ),
            (None, None) => {}
        }
    }
    Ok(fields)
}

/// Converts a face to the `int` indices written to the file.
fn face_indices(face: &[PointIdx; 3], num_points: usize) -> Result<[i32; 3], Err> {
    let mut out = [0i32; 3];
    for (o, &p) in out.iter_mut().zip(face) {
        let idx = usize::from(p);
        if idx >= num_points {
            return Err(Err::InvalidTopology(idx as i64, num_points));
        }
        *o = i32::try_from(idx).map_err(|_| Err::InvalidTopology(idx as i64, num_points))?;
    }
    Ok(out)
}

fn type_name(att: &Attribute) -> &'static str {
    // fields are filtered on having a name
    data_type_name(att.get_component_type()).unwrap_or("float")
}

fn vertex_header(num_points: usize, fields: &[Field<'_>]) -> String {
    let mut header = String::from("ply\nformat binary_little_endian 1.0\n");
    header.push_str(&format!("element vertex {}\n", num_points));
    for field in fields {
        let ty = type_name(field.att);
        for name in field.names {
            header.push_str(&format!("property {} {}\n", ty, name));
        }
    }
    header
}

fn write_points(payload: &mut Vec<u8>, num_points: usize, fields: &[Field<'_>]) {
    let record_len = fields.iter().map(|f| f.att.byte_stride()).sum::<usize>();
    payload.reserve(record_len * num_points);
    for p in 0..num_points {
        let p = PointIdx::from(p);
        for field in fields {
            payload.write_bytes(field.att.get_as_bytes(p));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::builder::MeshBuilder;

    fn triangle() -> MeshBuilder {
        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], AttributeType::Position);
        builder.set_connectivity_attribute(vec![[0, 1, 2]]);
        builder
    }

    #[test]
    fn test_header_and_payload_order() {
        let mut builder = triangle();
        // added out of header order on purpose
        builder.add_attribute(vec![[0.5f32]; 3], AttributeType::Opacity);
        builder.add_attribute(vec![[1u8, 2, 3], [4, 5, 6], [7, 8, 9]], AttributeType::Color);
        builder.add_attribute(vec![[0.0f32, 0.0, 1.0]; 3], AttributeType::Normal);
        let mesh = builder.build().unwrap();

        let ply = encode_mesh(&mesh).unwrap();
        assert_eq!(ply.header(), "ply\n\
            format binary_little_endian 1.0\n\
            element vertex 3\n\
            property float x\n\
            property float y\n\
            property float z\n\
            property float nx\n\
            property float ny\n\
            property float nz\n\
            property uchar red\n\
            property uchar green\n\
            property uchar blue\n\
            property float opacity\n\
            element face 1\n\
            property list uchar int vertex_indices\n\
            end_header\n");

        // 12 + 12 + 3 + 4 bytes per point, then 1 + 12 bytes for the face
        assert_eq!(ply.payload().len(), 3 * 31 + 13);
        let second = &ply.payload()[31..62];
        assert_eq!(&second[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&second[24..27], &[4, 5, 6]);
        assert_eq!(&second[27..31], &0.5f32.to_le_bytes());
        assert_eq!(&ply.payload()[93..], &[3, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_mismatched_component_counts_are_dropped() {
        let mut builder = triangle();
        builder.add_attribute(vec![[0.0f32, 0.0]; 3], AttributeType::Normal);
        builder.add_attribute(vec![[1u8, 2, 3, 4, 5]; 3], AttributeType::Color);
        builder.add_attribute(vec![[1.0f32, 0.0, 0.0]; 3], AttributeType::Rotation);
        let ply = encode_mesh(&builder.build().unwrap()).unwrap();
        assert!(!ply.header().contains("nx"));
        assert!(!ply.header().contains("red"));
        assert!(!ply.header().contains("rot_0"));
        assert_eq!(ply.payload().len(), 3 * 12 + 13);
    }

    #[test]
    fn test_types_the_decoder_rejects() {
        let mut builder = triangle();
        builder.add_attribute(vec![[0.0f32, 0.5, 1.0]; 3], AttributeType::Color);
        builder.add_attribute(vec![[0.5f64]; 3], AttributeType::Opacity);
        let ply = encode_mesh(&builder.build().unwrap()).unwrap();
        assert!(!ply.header().contains("red"));
        assert!(!ply.header().contains("opacity"));

        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0.0f64, 0.0, 0.0]], AttributeType::Position);
        let pc = builder.build_point_cloud().unwrap();
        assert_eq!(
            encode_point_cloud(&pc),
            Err(Err::TypeMismatch("x".to_owned(), ComponentDataType::F32, ComponentDataType::F64))
        );
    }

    #[test]
    fn test_missing_position() {
        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0.5f32]; 2], AttributeType::Opacity);
        let pc = builder.build_point_cloud().unwrap();
        assert_eq!(encode_point_cloud(&pc), Err(Err::MissingRequiredProperty("position".to_owned())));

        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0.0f32, 0.0]; 2], AttributeType::Position);
        let pc = builder.build_point_cloud().unwrap();
        assert_eq!(encode_point_cloud(&pc), Err(Err::MissingRequiredProperty("position".to_owned())));
    }

    #[test]
    fn test_invalid_topology() {
        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0.0f32, 0.0, 0.0]; 3], AttributeType::Position);
        let mut mesh = builder.build().unwrap();
        mesh.faces.push([PointIdx::from(0), PointIdx::from(1), PointIdx::from(3)]);
        assert_eq!(encode_mesh(&mesh), Err(Err::InvalidTopology(3, 3)));
    }

    #[test]
    fn test_face_indices_fit_int() {
        let face = [PointIdx::from(0), PointIdx::from(1), PointIdx::from(i32::MAX as usize)];
        assert_eq!(face_indices(&face, usize::MAX), Ok([0, 1, i32::MAX]));

        let face = [PointIdx::from(0), PointIdx::from(i32::MAX as usize + 1), PointIdx::from(1)];
        assert_eq!(
            face_indices(&face, usize::MAX),
            Err(Err::InvalidTopology(i32::MAX as i64 + 1, usize::MAX))
        );
    }

    #[test]
    fn test_tex_coords() {
        let mut builder = triangle();
        builder.add_attribute(vec![[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]], AttributeType::TextureCoordinate);
        let ply = encode_mesh(&builder.build().unwrap()).unwrap();
        assert!(ply.header().ends_with(
            "property list uchar int vertex_indices\nproperty list uchar float texcoord\nend_header\n"
        ));
        let face = &ply.payload()[36..];
        assert_eq!(face.len(), 13 + 1 + 24);
        assert_eq!(face[13], 6);
        assert_eq!(&face[14 + 8..14 + 12], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_point_cloud() {
        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[1i32, 2, 3]], AttributeType::Position);
        let pc = builder.build_point_cloud().unwrap();
        let ply = encode_point_cloud(&pc).unwrap();
        assert_eq!(
            ply.header(),
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty int x\nproperty int y\nproperty int z\nend_header\n"
        );
        let bytes = ply.clone().into_bytes();
        assert_eq!(bytes.len(), ply.header().len() + 12);
        let mut written = Vec::new();
        ply.write_to(&mut written);
        assert_eq!(written, bytes);
    }
}
