//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "globe.ron";

/// Top-level globe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobeConfig {
    /// Mesh density and query tolerances.
    pub mesh: MeshConfig,
    /// Shape of the reference ellipsoid.
    pub ellipsoid: EllipsoidConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Triangle mesh construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Number of root triangles fanning out from each pole.
    pub pole_resolution: u16,
    /// Number of recursive midpoint splits applied to each root triangle.
    pub subdivision_depth: u8,
    /// Upper bound on triangles stored in the arena. Deeper levels are
    /// derived on descent.
    pub max_materialized_triangles: usize,
    /// Relative tolerance for the widened containment retry.
    pub containment_epsilon: f64,
}

/// Reference ellipsoid axes in meters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EllipsoidConfig {
    /// Equatorial radius.
    pub semi_major_m: f64,
    /// Polar radius.
    pub semi_minor_m: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            pole_resolution: 13,
            subdivision_depth: 25,
            max_materialized_triangles: 262_144,
            containment_epsilon: 1e-12,
        }
    }
}

impl Default for EllipsoidConfig {
    // WGS84
    fn default() -> Self {
        Self {
            semi_major_m: 6_378_137.0,
            semi_minor_m: 6_356_752.314_245_179,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save ---

impl GlobeConfig {
    /// Platform config directory for the globe tools, e.g. `~/.config/globe`.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("globe"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: GlobeConfig = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = GlobeConfig::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `globe.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
