//! vcad-section: cut the meshes of a scene with a plane.
//!
//! # Logging
//!
//! `-v` shows progress, `-vv` per-stage detail, `-vvv` everything.
//! `RUST_LOG` takes precedence, e.g. `RUST_LOG=vcad_kernel_section=debug`.
//!
//! # Example
//!
//! ```bash
//! vcad-section cut scene.json -o report.json --obj section.obj
//! vcad-section info scene.json
//! ```

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vcad_kernel_section::CrossSection;

mod config;
mod export;
mod scene;

#[derive(Parser)]
#[command(name = "vcad-section")]
#[command(author, version, about = "Planar cross-sections of scene meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress all log output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut every mesh in a scene with the scene's plane
    Cut {
        /// Scene JSON file
        scene: PathBuf,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the sections, placed in world space, as OBJ
        #[arg(long)]
        obj: Option<PathBuf>,

        /// Section options (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only produce section edges, no faces
        #[arg(long)]
        no_fill: bool,

        /// Triangulate filled faces
        #[arg(long)]
        triangulate: bool,
    },
    /// Show object and geometry counts for a scene
    Info {
        /// Scene JSON file
        scene: PathBuf,
    },
}

/// Filter directives for a `-v` count.
fn log_directives(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,vcad_kernel_section=info,vcad_section=info",
        2 => "warn,vcad_kernel_section=debug,vcad_section=debug",
        _ => "trace",
    }
}

/// Log to stderr. `RUST_LOG`, when set and valid, wins over `-v`.
fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Cut {
            scene,
            output,
            obj,
            config,
            no_fill,
            triangulate,
        } => cut(
            &scene,
            output.as_deref(),
            obj.as_deref(),
            config.as_deref(),
            config::Overrides {
                no_fill,
                triangulate,
            },
        ),
        Commands::Info { scene } => show_info(&scene),
    }
}

fn cut(
    scene_path: &Path,
    output: Option<&Path>,
    obj: Option<&Path>,
    config_path: Option<&Path>,
    overrides: config::Overrides,
) -> Result<()> {
    let options = config::load(config_path, overrides)?;
    let scene = scene::load(scene_path)?;

    let report = CrossSection::new(scene.plane, options)
        .run(&scene.objects)
        .with_context(|| format!("cannot cut {}", scene_path.display()))?;

    let dto = export::ReportDto::new(&report);
    let json = serde_json::to_string_pretty(&dto)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote report to {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = obj {
        let file = fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        export::write_obj(&mut out, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Wrote sections to {}", path.display());
    }

    let s = dto.summary;
    eprintln!(
        "{} sectioned, {} without intersection, {} failed, {} skipped",
        s.sectioned, s.no_intersection, s.failed, s.skipped
    );
    Ok(())
}

fn show_info(scene_path: &Path) -> Result<()> {
    let scene = scene::load(scene_path)?;
    let counts = scene::SceneCounts::of(&scene.objects);

    println!("Scene: {}", scene_path.display());
    println!("Objects: {}", counts.objects);
    println!(
        "  Instancers: {} ({} instances)",
        counts.instancers, counts.instances
    );
    println!("  Meshes: {}", counts.meshes);
    println!("  Without geometry: {}", counts.without_geometry);
    println!("  Rejected meshes: {}", counts.rejected);
    for object in scene::rejected_objects(&scene.objects) {
        if let Some(err) = &object.rejected {
            println!("    {}: {err}", object.name);
        }
    }
    println!("Vertices: {}", counts.vertices);
    println!("Polygons: {}", counts.polygons);
    println!("Plane: {:?}", scene.plane.to_rows());

    Ok(())
}
