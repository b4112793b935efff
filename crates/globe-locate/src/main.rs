//! Locate geographic points on the triangular globe mesh.
//!
//! Configuration is loaded from `globe.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p globe-locate -- --point 12,10 --point -33.9,151.2`.

mod point;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use globe_config::{CliArgs, GlobeConfig};
use globe_mesh::{GlobeModelBuilder, ImmutableGlobeModelView};
use globe_projection::GeographicPosition;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "globe-locate", version, about = "Find the mesh triangle under a lat/lon")]
struct Cli {
    #[command(flatten)]
    overrides: CliArgs,

    /// Point to locate as LAT,LON in degrees. Repeatable.
    #[arg(long = "point", value_name = "LAT,LON", value_parser = point::parse_point, allow_hyphen_values = true)]
    points: Vec<GeographicPosition>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_dir = match cli.overrides.config.clone() {
        Some(dir) => dir,
        None => match GlobeConfig::default_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Failed to resolve config directory: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let mut config = match GlobeConfig::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_dir.display());
            return ExitCode::FAILURE;
        }
    };
    config.apply_cli_overrides(&cli.overrides);

    let log_dir: PathBuf = config_dir.join("logs");
    globe_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let view = match GlobeModelBuilder::from_config(&config).and_then(GlobeModelBuilder::build) {
        Ok(model) => model.freeze(),
        Err(e) => {
            error!("Failed to build globe model: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Model ready: {} leaves, {} stored triangles",
        view.leaf_count(),
        view.materialized_triangle_count()
    );

    if cli.points.is_empty() {
        info!("No --point given; nothing to locate");
        return ExitCode::SUCCESS;
    }

    let mut failed = false;
    for position in &cli.points {
        if !report(&view, position) {
            failed = true;
        }
    }
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Print one located triangle. Returns false if the point could not be located.
fn report(view: &ImmutableGlobeModelView, position: &GeographicPosition) -> bool {
    match view.locate_traced(position) {
        Ok((triangle, stats)) => {
            println!("{:.6},{:.6} -> {}", position.lat_deg, position.lon_deg, triangle.address());
            for (i, vertex) in triangle.geographic_vertices().iter().enumerate() {
                println!("  v{i}: {:.9}, {:.9}", vertex.lat_deg, vertex.lon_deg);
            }
            println!(
                "  {} comparisons over {} levels{}",
                stats.total_comparisons(),
                stats.levels_visited(),
                if stats.widened_retry { " (widened)" } else { "" }
            );
            true
        }
        Err(e) => {
            eprintln!("{:.6},{:.6}: {e}", position.lat_deg, position.lon_deg);
            false
        }
    }
}
