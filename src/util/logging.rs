// TesterMatch - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr, so rendered query results on stdout stay clean.

use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(debug_flag)
        .with_line_number(debug_flag)
        .compact()
        .init();

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}
