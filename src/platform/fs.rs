// TesterMatch - platform/fs.rs
//
// Opening relation files with relation-aware errors.

use crate::util::error::SourceError;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Open a relation file for buffered reading.
///
/// A missing file and an unreadable file are reported separately so the
/// user can tell a typo from a permissions problem.
pub fn open_relation(relation: &'static str, path: &Path) -> Result<BufReader<File>, SourceError> {
    match File::open(path) {
        Ok(file) => {
            tracing::debug!(relation, path = %path.display(), "Opened relation file");
            Ok(BufReader::new(file))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SourceError::NotFound {
            relation,
            path: path.to_path_buf(),
        }),
        Err(e) => Err(SourceError::Unreadable {
            relation,
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
