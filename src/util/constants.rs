// TesterMatch - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "TesterMatch";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "TesterMatch";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Relations
// =============================================================================

/// Relation name for tester records (`id, first, last, country, ...`).
pub const RELATION_TESTERS: &str = "testers";

/// Relation name for device records (`id, name`).
pub const RELATION_DEVICES: &str = "devices";

/// Relation name for tester-device associations (`testerId, deviceId`).
pub const RELATION_TESTER_DEVICE: &str = "tester_device";

/// Relation name for bug records (`id, deviceId, testerId`).
pub const RELATION_BUGS: &str = "bugs";

// =============================================================================
// Queries
// =============================================================================

/// Query term meaning "unconstrained on this dimension".
pub const ALL_KEYWORD: &str = "all";

/// Separator between terms in a single query field.
pub const TERM_SEPARATOR: char = ',';

/// Validation pattern for a normalised query field.
///
/// Empty input is accepted separately (it means "skip this dimension").
pub const QUERY_INPUT_PATTERN: &str = r"^[\w\s\d]+(?:,[\w\s]+)*$";

/// Prompt command that exits the query loop.
pub const QUIT_COMMAND: &str = "\\q";

/// Prompt command that rebuilds the repository from its sources.
pub const RELOAD_COMMAND: &str = "\\r";

/// Prompt command that lists the known countries and devices.
pub const LIST_COMMAND: &str = "\\l";

/// Message printed when a query field fails validation.
pub const INPUT_ERROR_MSG: &str = "Error, invalid input, please try again";

/// Banner printed before each result set.
pub const RESULTS_BANNER: &str = "Here are the results of your query";

// =============================================================================
// Presentation
// =============================================================================

/// Minimum width of each column in the rendered results table.
pub const TABLE_COLUMN_WIDTH: usize = 10;

/// Column headers of the results table.
pub const TABLE_HEADERS: [&str; 3] = ["First Name", "Last Name", "Experience"];

/// Separator row printed under the table headers.
pub const TABLE_SEPARATORS: [&str; 3] = ["----------", "---------", "----------"];

/// Header row of CSV exports.
pub const CSV_EXPORT_HEADERS: [&str; 3] = ["first_name", "last_name", "bug_count"];

// =============================================================================
// Logging
// =============================================================================

/// Default log level. Kept quiet so interactive output is not interleaved
/// with diagnostics.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Log levels accepted in the config file.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
