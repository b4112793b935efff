//! Structured logging for the globe tools.
//!
//! Console output through `tracing-subscriber`, filtered by `RUST_LOG` or the
//! configured log level, plus a JSON log file in debug builds.

use std::path::{Path, PathBuf};

use globe_config::GlobeConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the JSON log file written under the log directory.
pub const LOG_FILE_NAME: &str = "globe.log";

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` if set, otherwise from
/// `config.debug.log_level`, otherwise `info`. When `debug_build` is true and
/// `log_dir` can be created, events are also written as JSON to
/// [`LOG_FILE_NAME`].
///
/// ```no_run
/// use globe_config::GlobeConfig;
/// use globe_log::init_logging;
///
/// let config = GlobeConfig::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&GlobeConfig>) {
    let filter_str = filter_directive(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_file_path(log_dir))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// `EnvFilter` used when neither `RUST_LOG` nor a config is available.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Where [`init_logging`] writes the JSON log inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

fn filter_directive(config: Option<&GlobeConfig>) -> &str {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => config.debug.log_level.trim(),
        _ => DEFAULT_FILTER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        assert!(filter.to_string().contains("info"));
    }

    #[test]
    fn test_filter_from_config() {
        let mut config = GlobeConfig::default();
        config.debug.log_level = "debug,globe_mesh=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,globe_mesh=trace");
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = GlobeConfig::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_subsystem_filter_parses() {
        for directive in ["info", "warn,globe_mesh=debug", "error,globe_projection=trace"] {
            assert!(EnvFilter::try_new(directive).is_ok(), "{directive}");
        }
    }

    #[test]
    fn test_log_file_path_uses_log_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let path = log_file_path(&log_dir);
        assert_eq!(path.parent(), Some(log_dir.as_path()));
        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
        assert_eq!(LOG_FILE_NAME, "globe.log");
    }

    #[test]
    fn test_config_level_wins_over_default_filter() {
        let mut config = GlobeConfig::default();
        config.debug.log_level = " warn ".to_string();
        let directive = filter_directive(Some(&config));
        assert_eq!(directive, "warn");
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
