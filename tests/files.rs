use draco_ply::prelude::*;
use draco_ply::io::ply::{self, Config, Err};

fn triangle(faces: Vec<[usize; 3]>) -> Mesh {
    let mut builder = MeshBuilder::new();
    builder.add_attribute(vec![[0i32, 0, 0], [10, 0, 0], [0, 10, 0]], AttributeType::Position);
    builder.add_attribute(vec![[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]], AttributeType::TextureCoordinate);
    builder.set_connectivity_attribute(faces);
    builder.build().unwrap()
}

#[test]
fn write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triangle.ply");

    let mesh = triangle(vec![[0, 1, 2]]);
    ply::write_ply_mesh(&path, &mesh).unwrap();

    let data = std::fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&data);
    assert!(text.contains("property int x\n"));
    assert!(text.contains("property list uchar float texcoord\n"));

    let decoded = ply::read_ply_mesh(&path, &Config::default()).unwrap();
    assert_eq!(decoded.num_faces(), 1);
    let pos = decoded.get_named_attribute(AttributeType::Position).unwrap();
    assert_eq!(pos.get::<i32>(PointIdx::from(1)), vec![10, 0, 0]);
    // texture coordinates are written per corner but not read back
    assert!(decoded.get_named_attribute(AttributeType::TextureCoordinate).is_none());

    let pc = ply::read_ply_point_cloud(&path).unwrap();
    assert_eq!(pc.num_points(), 3);
}

#[test]
fn failed_encode_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ply");

    // MeshBuilder refuses out-of-range faces, so assemble the mesh directly
    let faces = triangle(vec![[0, 1, 2]]).get_faces().to_vec();
    let pc = {
        let mut builder = MeshBuilder::new();
        builder.add_attribute(vec![[0i32, 0, 0], [1, 0, 0]], AttributeType::Position);
        builder.build_point_cloud().unwrap()
    };
    let mesh = Mesh::new(pc, faces);

    assert_eq!(ply::write_ply_mesh(&path, &mesh), Err(Err::InvalidTopology(2, 2)));
    assert!(!path.exists());
}

#[test]
fn point_cloud_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("splats.ply");

    let mut builder = MeshBuilder::new();
    builder.add_attribute(vec![[0.0f32, 1.0, 2.0], [3.0, 4.0, 5.0]], AttributeType::Position);
    builder.add_attribute(vec![[0.25f32], [0.75]], AttributeType::Opacity);
    ply::write_ply_point_cloud(&path, &builder.build_point_cloud().unwrap()).unwrap();

    let pc = ply::read_ply_point_cloud(&path).unwrap();
    let opacity = pc.get_named_attribute(AttributeType::Opacity).unwrap();
    assert_eq!(opacity.get::<f32>(PointIdx::from(1)), vec![0.75]);

    // no face element
    assert_eq!(
        ply::read_ply_mesh(&path, &Config::default()).unwrap_err(),
        Err::MissingElement("face".to_owned())
    );
}
