use clap::{Parser, Subcommand};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use draco_ply::prelude::*;
use draco_ply::io::ply::{self, PlyReader};

#[derive(Parser)]
#[command(name = "draco-ply-cli")]
#[command(about = "A CLI tool for reading and writing binary PLY meshes and splats")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the points, faces and attributes of a PLY file
    Inspect {
        /// Input file path
        #[arg(short, long)]
        input: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a PLY file and encode it again
    Convert {
        /// Input file path
        #[arg(short, long)]
        input: String,

        /// Output file path
        #[arg(short, long)]
        output: String,

        /// Drop the faces and write the vertices only
        #[arg(long)]
        point_cloud: bool,

        /// Keep duplicate points of meshes
        #[arg(long)]
        no_dedup: bool,
    },
}

#[derive(Serialize)]
struct Summary {
    num_points: usize,
    num_faces: Option<usize>,
    attributes: Vec<AttributeSummary>,
}

#[derive(Serialize)]
struct AttributeSummary {
    att_type: AttributeType,
    component_type: ComponentDataType,
    num_components: usize,
    num_unique_values: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Inspect { input, json } => inspect(&input, json),
        Command::Convert { input, output, point_cloud, no_dedup } => convert(&input, &output, point_cloud, no_dedup),
    }
}

fn check_extension(path: &str, what: &str) -> Result<()> {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    if !ext.eq_ignore_ascii_case("ply") {
        anyhow::bail!("{} file must be a .ply file", what);
    }
    Ok(())
}

fn inspect(input_path: &str, json: bool) -> Result<()> {
    check_extension(input_path, "Input")?;

    let data = std::fs::read(input_path)
        .map_err(|e| anyhow::anyhow!("Failed to read input file: {}", e))?;
    let schema = PlyReader::read(&data)
        .map_err(|e| anyhow::anyhow!("Failed to parse PLY file: {}", e))?;

    let summary = if schema.get_element("face").is_some() {
        let mesh = ply::decode_mesh(&schema, &ply::Config::default())
            .map_err(|e| anyhow::anyhow!("Failed to decode mesh: {}", e))?;
        summarize(mesh.get_point_cloud(), Some(mesh.num_faces()))
    } else {
        let pc = ply::decode_point_cloud(&schema)
            .map_err(|e| anyhow::anyhow!("Failed to decode point cloud: {}", e))?;
        summarize(&pc, None)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("points: {}", summary.num_points);
    if let Some(num_faces) = summary.num_faces {
        println!("faces: {}", num_faces);
    }
    for att in &summary.attributes {
        println!(
            "  {:?}: {} x {:?} ({} unique values)",
            att.att_type, att.num_components, att.component_type, att.num_unique_values
        );
    }
    Ok(())
}

fn summarize(pc: &PointCloud, num_faces: Option<usize>) -> Summary {
    Summary {
        num_points: pc.num_points(),
        num_faces,
        attributes: pc.get_attributes().iter()
            .map(|att| AttributeSummary {
                att_type: att.get_attribute_type(),
                component_type: att.get_component_type(),
                num_components: att.get_num_components(),
                num_unique_values: att.num_unique_values(),
            })
            .collect(),
    }
}

fn convert(input_path: &str, output_path: &str, point_cloud: bool, no_dedup: bool) -> Result<()> {
    check_extension(input_path, "Input")?;
    check_extension(output_path, "Output")?;

    if point_cloud {
        let pc = ply::read_ply_point_cloud(input_path)
            .map_err(|e| anyhow::anyhow!("Failed to load PLY file: {}", e))?;
        tracing::info!("decoded {} points", pc.num_points());
        ply::write_ply_point_cloud(output_path, &pc)
            .map_err(|e| anyhow::anyhow!("Failed to write output file: {}", e))?;
        return Ok(());
    }

    let cfg = if no_dedup {
        ply::Config { deduplicate_attribute_values: false, deduplicate_point_ids: false }
    } else {
        ply::Config::default()
    };
    let mesh = ply::read_ply_mesh(input_path, &cfg)
        .map_err(|e| anyhow::anyhow!("Failed to load PLY file: {}", e))?;
    tracing::info!("decoded {} points and {} faces", mesh.num_points(), mesh.num_faces());
    ply::write_ply_mesh(output_path, &mesh)
        .map_err(|e| anyhow::anyhow!("Failed to write output file: {}", e))?;

    Ok(())
}
