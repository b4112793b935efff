//! Configuration for the globe model.
//!
//! Build parameters persist to disk as a RON file, can be overridden from the
//! command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE_NAME, DebugConfig, EllipsoidConfig, GlobeConfig, MeshConfig};
pub use error::ConfigError;
