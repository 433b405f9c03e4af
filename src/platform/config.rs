// TesterMatch - platform/config.rs
//
// Platform-specific config directory resolution and config.toml loading
// with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::export::OutputFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for TesterMatch configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/testermatch/ or %APPDATA%\TesterMatch\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[data]` section.
    pub data: DataSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[data]` config section: one path per relation.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub testers: Option<PathBuf>,
    pub devices: Option<PathBuf>,
    pub tester_device: Option<PathBuf>,
    pub bugs: Option<PathBuf>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "table", "csv" or "json".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Relation file paths, any of which may still be unset.
///
/// Built from the CLI and from config.toml, merged with CLI precedence, then
/// validated into [`DataSources`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePaths {
    pub testers: Option<PathBuf>,
    pub devices: Option<PathBuf>,
    pub tester_device: Option<PathBuf>,
    pub bugs: Option<PathBuf>,
}

impl SourcePaths {
    /// Fill every unset path from `fallback`.
    pub fn or(self, fallback: SourcePaths) -> Self {
        Self {
            testers: self.testers.or(fallback.testers),
            devices: self.devices.or(fallback.devices),
            tester_device: self.tester_device.or(fallback.tester_device),
            bugs: self.bugs.or(fallback.bugs),
        }
    }

    /// Require every relation to have a path.
    pub fn validate(self) -> Result<DataSources, ConfigError> {
        fn require(
            path: Option<PathBuf>,
            relation: &'static str,
            flag: &'static str,
        ) -> Result<PathBuf, ConfigError> {
            path.ok_or(ConfigError::MissingSource { relation, flag })
        }

        Ok(DataSources {
            testers: require(self.testers, constants::RELATION_TESTERS, "-t")?,
            devices: require(self.devices, constants::RELATION_DEVICES, "-d")?,
            tester_device: require(self.tester_device, constants::RELATION_TESTER_DEVICE, "-m")?,
            bugs: require(self.bugs, constants::RELATION_BUGS, "-b")?,
        })
    }
}

/// The four relation files the repository is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub testers: PathBuf,
    pub devices: PathBuf,
    pub tester_device: PathBuf,
    pub bugs: PathBuf,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Relation paths from `[data]`, resolved against the config file's
    /// directory.
    pub sources: SourcePaths,

    /// Output format for query results.
    pub format: OutputFormat,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

/// Load and validate a config file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults; when `required` is set (the user named the
/// file explicitly) the absence is reported as a warning. An unreadable or
/// unparseable file also yields defaults plus a warning, so the program can
/// still run from CLI arguments alone.
pub fn load_config(config_path: &Path, required: bool) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        if required {
            warnings.push(format!(
                "Config file '{}' does not exist. Using defaults.",
                config_path.display()
            ));
        }
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let base_dir = config_path.parent().unwrap_or(Path::new("."));
    let mut config = AppConfig {
        sources: SourcePaths {
            testers: raw.data.testers.map(|p| base_dir.join(p)),
            devices: raw.data.devices.map(|p| base_dir.join(p)),
            tester_device: raw.data.tester_device.map(|p| base_dir.join(p)),
            bugs: raw.data.bugs.map(|p| base_dir.join(p)),
        },
        ..AppConfig::default()
    };

    // -- Output: format --
    if let Some(ref format) = raw.output.format {
        match format.parse::<OutputFormat>() {
            Ok(f) => config.format = f,
            Err(value) => {
                let err = ConfigError::UnknownFormat { value };
                warnings.push(format!("[output] {err}. Using default (table)."));
            }
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL
            ));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(constants::CONFIG_FILE_NAME);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_missing_optional_config_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"), false);
        assert!(warnings.is_empty());
        assert_eq!(config.format, OutputFormat::Table);
    }

    #[test]
    fn test_missing_required_config_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (_, warnings) = load_config(&dir.path().join("nope.toml"), true);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_data_paths_are_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[data]\ntesters = \"testers.csv\"\nbugs = \"/abs/bugs.csv\"\n\n[output]\nformat = \"csv\"\n",
        );
        let (config, warnings) = load_config(&path, true);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.sources.testers, Some(dir.path().join("testers.csv")));
        assert_eq!(config.sources.bugs, Some(PathBuf::from("/abs/bugs.csv")));
        assert_eq!(config.sources.devices, None);
        assert_eq!(config.format, OutputFormat::Csv);
    }

    #[test]
    fn test_invalid_values_fall_back_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[output]\nformat = \"xml\"\n[logging]\nlevel = \"loud\"\n",
        );
        let (config, warnings) = load_config(&path, true);
        assert_eq!(warnings.len(), 2);
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[data\n");
        let (config, warnings) = load_config(&path, false);
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.sources, SourcePaths::default());
    }

    #[test]
    fn test_cli_paths_take_precedence() {
        let cli = SourcePaths {
            testers: Some(PathBuf::from("cli_testers.csv")),
            ..SourcePaths::default()
        };
        let file = SourcePaths {
            testers: Some(PathBuf::from("cfg_testers.csv")),
            devices: Some(PathBuf::from("cfg_devices.csv")),
            ..SourcePaths::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.testers, Some(PathBuf::from("cli_testers.csv")));
        assert_eq!(merged.devices, Some(PathBuf::from("cfg_devices.csv")));
    }

    #[test]
    fn test_validate_reports_first_missing_relation() {
        let paths = SourcePaths {
            testers: Some(PathBuf::from("t.csv")),
            devices: Some(PathBuf::from("d.csv")),
            tester_device: None,
            bugs: Some(PathBuf::from("b.csv")),
        };
        assert!(matches!(
            paths.validate(),
            Err(ConfigError::MissingSource {
                relation: constants::RELATION_TESTER_DEVICE,
                flag: "-m"
            })
        ));
    }
}
