//! Command-line overrides for the globe configuration.

use std::path::PathBuf;

use clap::Args;

use crate::GlobeConfig;

/// Configuration overrides shared by the globe command-line tools.
///
/// CLI values override settings loaded from `globe.ron`.
#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    /// Triangles fanning out from each pole.
    #[arg(long)]
    pub pole_resolution: Option<u16>,

    /// Recursive subdivision depth.
    #[arg(long)]
    pub depth: Option<u8>,

    /// Maximum number of triangles stored eagerly.
    #[arg(long)]
    pub budget: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GlobeConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(n) = args.pole_resolution {
            self.mesh.pole_resolution = n;
        }
        if let Some(d) = args.depth {
            self.mesh.subdivision_depth = d;
        }
        if let Some(b) = args.budget {
            self.mesh.max_materialized_triangles = b;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
