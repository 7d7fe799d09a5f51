//! nether-dae - Nethercore COLLADA import tool
//!
//! Converts COLLADA documents (.dae) to GPU-ready binary formats
//! (.nczxmesh, .nczxskel)

use anyhow::Result;
use clap::{Parser, Subcommand};
use nethercore_shared::ZX_ROM_FORMAT;
use std::path::{Path, PathBuf};

use nether_dae::dom::{Document, Node};
use nether_dae::{convert_dae, convert_dae_skeleton, list_skins, ImportOptions};

#[derive(Parser)]
#[command(name = "nether-dae")]
#[command(about = "Nethercore COLLADA import tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a mesh from a COLLADA document
    Mesh {
        /// Input .dae file
        input: PathBuf,

        /// Output .nczxmesh file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mesh name to select (default: first mesh)
        #[arg(short, long)]
        mesh: Option<String>,

        /// Vertex format (e.g., POS_UV_NORMAL)
        #[arg(short, long)]
        format: Option<String>,

        /// Scene time for animated morph weights
        #[arg(short, long, default_value_t = 0.0)]
        time: f32,

        /// Fixed billboard detail size, appended to mesh names
        #[arg(long)]
        fixed_size: Option<u32>,

        /// Import as a mirrored instance (negated Z, flipped winding)
        #[arg(long)]
        mirrored: bool,

        /// Skip node scale compensation in bone transforms
        #[arg(long)]
        ignore_node_scale: bool,
    },

    /// Export skeleton (bind-pose matrices) from a COLLADA document
    Skeleton {
        /// Input .dae file
        input: PathBuf,

        /// Output .nczxskel file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mesh name to select (default: first skinned mesh)
        #[arg(short, long)]
        mesh: Option<String>,

        /// List available skins instead of exporting
        #[arg(long)]
        list: bool,
    },

    /// List document contents (geometries, controllers, scene instances)
    List {
        /// Input .dae file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mesh {
            input,
            output,
            mesh,
            format,
            time,
            fixed_size,
            mirrored,
            ignore_node_scale,
        } => {
            let ext = input
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_lowercase())
                .unwrap_or_default();
            if ext != "dae" {
                anyhow::bail!("Unsupported mesh format: {:?} (use .dae)", input);
            }

            let output = output.unwrap_or_else(|| input.with_extension(ZX_ROM_FORMAT.mesh_ext));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let options = ImportOptions {
                time,
                mirrored,
                fixed_size,
                ignore_node_scale,
                ..Default::default()
            };
            convert_dae(&input, &output, &options, format.as_deref(), mesh.as_deref())?;
            tracing::info!("Done!");
        }

        Commands::Skeleton {
            input,
            output,
            mesh,
            list,
        } => {
            if list {
                list_skins(&input)?;
            } else {
                let output =
                    output.unwrap_or_else(|| input.with_extension(ZX_ROM_FORMAT.skeleton_ext));
                tracing::info!("Exporting skeleton {:?} -> {:?}", input, output);
                convert_dae_skeleton(&input, &output, &ImportOptions::default(), mesh.as_deref())?;
                tracing::info!("Done!");
            }
        }

        Commands::List { input } => {
            list_document(&input)?;
        }
    }

    Ok(())
}

/// Print an overview of a COLLADA document
fn list_document(input: &Path) -> Result<()> {
    let doc = Document::from_file(input)?;

    tracing::info!("Geometries in {:?}:", input);
    for (i, geometry) in doc.geometries().enumerate() {
        tracing::info!("  [{}] '{}'", i, geometry.display_name());
    }

    let controllers: Vec<_> = doc.controllers().collect();
    if !controllers.is_empty() {
        tracing::info!("Controllers:");
        for (i, controller) in controllers.iter().enumerate() {
            let name = controller.name.as_deref().unwrap_or(&controller.id);
            let kind = if controller.skin.is_some() {
                "skin"
            } else if controller.morph.is_some() {
                "morph"
            } else {
                "empty"
            };
            tracing::info!("  [{}] '{}' ({})", i, name, kind);
        }
    }

    let mut instances = Vec::new();
    if let Some(nodes) = doc.scene_nodes() {
        collect_scene_instances(nodes, &mut instances);
    }
    if !instances.is_empty() {
        tracing::info!("Scene instances:");
        for (i, (node, url)) in instances.iter().enumerate() {
            tracing::info!("  [{}] '{}' <- {}", i, node, url);
        }
    }

    let mut targets = Vec::new();
    for animation in doc.all_animations() {
        for channel in &animation.channel {
            targets.push(channel.target.clone());
        }
    }
    if !targets.is_empty() {
        tracing::info!("Animated targets:");
        for (i, target) in targets.iter().enumerate() {
            tracing::info!("  [{}] '{}'", i, target);
        }
    }

    Ok(())
}

fn collect_scene_instances(nodes: &[Node], out: &mut Vec<(String, String)>) {
    for node in nodes {
        for ig in &node.instance_geometry {
            out.push((node.display_name().to_owned(), ig.url.clone()));
        }
        for ic in &node.instance_controller {
            out.push((node.display_name().to_owned(), ic.url.clone()));
        }
        collect_scene_instances(&node.node, out);
    }
}
