// TesterMatch - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config file loading and logging initialisation
// 3. Relation loading and index build
// 4. A single query (--country / --device) or the interactive query loop

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use testermatch::app::prompt::{normalise_input, run_prompt, validate_field};
use testermatch::app::state::AppState;
use testermatch::core::export::{write_rows, OutputFormat};
use testermatch::core::query::Query;
use testermatch::platform::config::{load_config, PlatformPaths, SourcePaths};
use testermatch::util;
use testermatch::util::error::{ConfigError, Result, TesterMatchError};

/// TesterMatch - find the testers with the most bugs by country and device.
///
/// Loads the tester, device, tester-device and bug relations, then answers
/// queries interactively or once from the command line.
#[derive(Parser, Debug)]
#[command(name = "testermatch", version, about)]
struct Cli {
    /// Testers relation (testerId, firstName, lastName, country, ...).
    #[arg(short = 't', long = "testers")]
    testers: Option<PathBuf>,

    /// Devices relation (deviceId, description).
    #[arg(short = 'd', long = "devices")]
    devices: Option<PathBuf>,

    /// Tester-device relation (testerId, deviceId).
    #[arg(short = 'm', long = "tester-device")]
    tester_device: Option<PathBuf>,

    /// Bugs relation (bugId, deviceId, testerId).
    #[arg(short = 'b', long = "bugs")]
    bugs: Option<PathBuf>,

    /// Config file (defaults to config.toml in the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Run one query for these countries (comma-separated, or "all") and exit.
    #[arg(long = "country")]
    country: Option<String>,

    /// Run one query for these devices (comma-separated, or "all") and exit.
    #[arg(long = "device")]
    device: Option<String>,

    /// Output format: table, csv or json.
    #[arg(short = 'f', long = "format")]
    format: Option<String>,

    /// Print repository statistics after loading.
    #[arg(long = "stats")]
    stats: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(long = "debug")]
    debug: bool,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        tracing::error!(error = %e, "TesterMatch failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (config, config_warnings) = load_config(&config_path, cli.config.is_some());

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        config = %config_path.display(),
        "TesterMatch starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let format = match cli.format.as_deref() {
        Some(raw) => raw
            .parse::<OutputFormat>()
            .map_err(|value| ConfigError::UnknownFormat { value })?,
        None => config.format,
    };

    let cli_sources = SourcePaths {
        testers: cli.testers,
        devices: cli.devices,
        tester_device: cli.tester_device,
        bugs: cli.bugs,
    };
    let sources = cli_sources.or(config.sources).validate()?;

    let mut state = AppState::load(sources, format)?;

    let stdout = std::io::stdout();
    if cli.stats {
        let stats = state.repository().stats();
        writeln!(
            stdout.lock(),
            "{} testers in {} countries, {} devices, {} tester-device links, {} bugs",
            stats.testers,
            stats.countries,
            stats.devices,
            stats.associations,
            stats.bugs
        )
        .map_err(|source| TesterMatchError::Io {
            operation: "writing statistics",
            source,
        })?;
    }

    if cli.country.is_some() || cli.device.is_some() {
        let countries = normalise_input(cli.country.as_deref().unwrap_or_default());
        let devices = normalise_input(cli.device.as_deref().unwrap_or_default());
        validate_field("country", &countries)?;
        validate_field("device", &devices)?;

        let rows = state.run_query(&Query::from_fields(&countries, &devices));
        write_rows(&rows, state.format, stdout.lock())?;
        return Ok(());
    }

    let stdin = std::io::stdin();
    run_prompt(&mut state, stdin.lock(), stdout.lock())
}
