// Logging setup.
// Installs a compact stderr subscriber so stdout stays free for preview output.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: &str = "info";

/// Quieter default for the preview subcommand, whose output lands in fzf's pane.
pub const PREVIEW_LEVEL: &str = "warn";

/// Resolve the filter: explicit `level`, else `RUST_LOG`, else `default`.
pub fn env_filter(level: Option<&str>, default: &str) -> EnvFilter {
    if let Some(level) = level {
        match EnvFilter::try_new(level) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("ignoring invalid log level {level:?}: {e}"),
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init(level: Option<&str>, default: &str) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level, default))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
    if let Err(e) = result {
        tracing::debug!("tracing already initialised: {e}");
    }
}
