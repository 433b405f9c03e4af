// TesterMatch - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all TesterMatch operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum TesterMatchError {
    /// A relation file could not be opened or read.
    Source(SourceError),

    /// A relation row could not be parsed.
    Record(RecordError),

    /// The relations reference keys that do not exist.
    Integrity(IntegrityError),

    /// A query string failed validation.
    Query(QueryError),

    /// Writing query results failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with operation context.
    Io {
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for TesterMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Source error: {e}"),
            Self::Record(e) => write!(f, "Record error: {e}"),
            Self::Integrity(e) => write!(f, "Integrity error: {e}"),
            Self::Query(e) => write!(f, "Query error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io { operation, source } => write!(f, "I/O error during {operation}: {source}"),
        }
    }
}

impl std::error::Error for TesterMatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Record(e) => Some(e),
            Self::Integrity(e) => Some(e),
            Self::Query(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors opening or reading a relation file.
#[derive(Debug)]
pub enum SourceError {
    /// The relation file does not exist.
    NotFound {
        relation: &'static str,
        path: PathBuf,
    },

    /// The relation file exists but could not be read.
    Unreadable {
        relation: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { relation, path } => write!(
                f,
                "{relation} relation file '{}' does not exist",
                path.display()
            ),
            Self::Unreadable {
                relation,
                path,
                source,
            } => write!(
                f,
                "cannot read {relation} relation file '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SourceError> for TesterMatchError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Record errors
// ---------------------------------------------------------------------------

/// Errors parsing a single relation row.
#[derive(Debug)]
pub enum RecordError {
    /// The row has fewer fields than the relation requires.
    MissingField {
        relation: &'static str,
        line: u64,
        field: &'static str,
    },

    /// A numeric id field is not an integer.
    InvalidId {
        relation: &'static str,
        line: u64,
        field: &'static str,
        value: String,
    },

    /// The CSV reader itself failed (I/O, bad UTF-8, ...).
    Csv {
        relation: &'static str,
        source: csv::Error,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField {
                relation,
                line,
                field,
            } => write!(f, "{relation} line {line}: missing field '{field}'"),
            Self::InvalidId {
                relation,
                line,
                field,
                value,
            } => write!(
                f,
                "{relation} line {line}: field '{field}' = '{value}' is not an integer id"
            ),
            Self::Csv { relation, source } => write!(f, "{relation}: {source}"),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RecordError> for TesterMatchError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

// ---------------------------------------------------------------------------
// Integrity errors
// ---------------------------------------------------------------------------

/// Referential-integrity failures found while building the indexes.
///
/// Any of these means the input relations are malformed; continuing would
/// produce wrong bug counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// A row references a tester id absent from the testers relation.
    UnknownTester {
        relation: &'static str,
        line: u64,
        tester_id: i32,
    },

    /// A row references a device id absent from the devices relation.
    UnknownDevice {
        relation: &'static str,
        line: u64,
        device_id: i32,
    },

    /// The same tester id appears twice in the testers relation.
    DuplicateTester { line: u64, tester_id: i32 },

    /// The same device id appears twice in the devices relation.
    DuplicateDevice { line: u64, device_id: i32 },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTester {
                relation,
                line,
                tester_id,
            } => write!(f, "{relation} line {line}: unknown tester id {tester_id}"),
            Self::UnknownDevice {
                relation,
                line,
                device_id,
            } => write!(f, "{relation} line {line}: unknown device id {device_id}"),
            Self::DuplicateTester { line, tester_id } => {
                write!(f, "testers line {line}: duplicate tester id {tester_id}")
            }
            Self::DuplicateDevice { line, device_id } => {
                write!(f, "devices line {line}: duplicate device id {device_id}")
            }
        }
    }
}

impl std::error::Error for IntegrityError {}

impl From<IntegrityError> for TesterMatchError {
    fn from(e: IntegrityError) -> Self {
        Self::Integrity(e)
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// Errors in user-supplied query text. Never produced by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The field does not match the accepted comma-separated form.
    InvalidInput { field: &'static str, input: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { field, input } => {
                write!(f, "invalid {field} input '{input}'")
            }
        }
    }
}

impl std::error::Error for QueryError {}

impl From<QueryError> for TesterMatchError {
    fn from(e: QueryError) -> Self {
        Self::Query(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors writing query results.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output.
    Io(io::Error),

    /// CSV serialisation error.
    Csv(csv::Error),

    /// JSON serialisation error.
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(source) => write!(f, "output I/O error: {source}"),
            Self::Csv(source) => write!(f, "CSV output error: {source}"),
            Self::Json(source) => write!(f, "JSON output error: {source}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(source) => Some(source),
            Self::Csv(source) => Some(source),
            Self::Json(source) => Some(source),
        }
    }
}

impl From<ExportError> for TesterMatchError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// A required relation source was given neither on the CLI nor in config.
    MissingSource {
        relation: &'static str,
        flag: &'static str,
    },

    /// The output format name is not recognised.
    UnknownFormat { value: String },

    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSource { relation, flag } => write!(
                f,
                "no {relation} relation given. Pass {flag} <file> or set [data] {relation} in {}",
                super::constants::CONFIG_FILE_NAME
            ),
            Self::UnknownFormat { value } => write!(
                f,
                "output format '{value}' is not recognised. Expected table, csv or json"
            ),
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for TesterMatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for TesterMatch results.
pub type Result<T> = std::result::Result<T, TesterMatchError>;
