//! Babylon Exporter CLI
//!
//! Export scene snapshots to Babylon scene documents.

use babylon_exporter::{
    ExportOptions, ExportOutcome, LogSink, SceneExporter, SceneHost, SnapshotHost,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "babylon-exporter")]
#[command(author, version, about = "Export scene snapshots to Babylon scene documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene snapshot
    Export {
        /// Scene snapshot (JSON)
        #[arg(short, long)]
        scene: PathBuf,

        /// Output document path (e.g., "out/scene.babylon")
        #[arg(short, long)]
        output: PathBuf,

        /// Also write <output>.manifest for offline caching
        #[arg(long)]
        manifest: bool,

        /// Only export selected nodes
        #[arg(long)]
        selected_only: bool,

        /// Copy textures next to the output document
        #[arg(long)]
        copy_textures: bool,

        /// Export hidden meshes
        #[arg(long)]
        hidden: bool,

        /// Save the host document before exporting
        #[arg(long)]
        auto_save: bool,
    },

    /// Show what a scene snapshot contains
    Info {
        /// Scene snapshot (JSON)
        #[arg(short, long)]
        scene: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            scene,
            output,
            manifest,
            selected_only,
            copy_textures,
            hidden,
            auto_save,
        } => {
            let options = ExportOptions::default()
                .with_manifest(manifest)
                .with_selection_only(selected_only)
                .with_copy_textures(copy_textures)
                .with_hidden_objects(hidden)
                .with_auto_save(auto_save);
            export_scene(&scene, &output, options)?;
        }
        Commands::Info { scene } => {
            show_scene_info(&scene)?;
        }
    }

    Ok(())
}

fn export_scene(
    scene_path: &PathBuf,
    output_path: &PathBuf,
    options: ExportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", scene_path);
    let mut host = SnapshotHost::from_path(scene_path)?;

    let exporter = SceneExporter::new(options);
    let outcome = exporter.export(&mut host, output_path, &mut LogSink, &mut LogSink)?;

    match outcome {
        ExportOutcome::Completed(summary) => {
            println!(
                "Exported {} bytes to {:?} in {:.2}s",
                summary.bytes_written,
                summary.document_path,
                summary.elapsed.as_secs_f64()
            );
            println!("  Cameras: {}", summary.cameras);
            if let Some(active) = &summary.active_camera_id {
                println!("  Active camera: {}", active);
            }
            println!("  Meshes: {}", summary.meshes);
            println!(
                "  Materials: {} ({} multi)",
                summary.materials, summary.multi_materials
            );
            println!(
                "  Lights: {}{}",
                summary.lights,
                if summary.default_light_added { " (default)" } else { "" }
            );
            println!("  Skeletons: {}", summary.skeletons);
            if summary.textures_copied > 0 {
                println!("  Textures copied: {}", summary.textures_copied);
            }
            if let Some(manifest) = &summary.manifest_path {
                println!("  Manifest: {:?}", manifest);
            }
            if summary.warnings > 0 {
                println!("  Warnings: {}", summary.warnings);
            }
        }
        ExportOutcome::Cancelled => {
            println!("Export cancelled");
        }
    }

    Ok(())
}

fn show_scene_info(scene_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", scene_path);
    let host = SnapshotHost::from_path(scene_path)?;

    println!("\nScene Info:");
    if let Some(name) = host.document_name() {
        println!("  Document: {}", name);
    }
    println!("  Cameras: {}", host.cameras.len());
    println!("  Meshes: {}", host.meshes.len());
    println!("  Materials: {}", host.materials.len());
    println!("  Lights: {}", host.lights.len());
    println!("  Atmospherics: {}", host.atmospherics.len());

    Ok(())
}
