// TesterMatch - app/loader.rs
//
// Reads the four relation files and builds a repository snapshot.

use crate::core::relations::Relations;
use crate::core::repository::TesterRepository;
use crate::platform::config::DataSources;
use crate::platform::fs::open_relation;
use crate::util::constants::{
    RELATION_BUGS, RELATION_DEVICES, RELATION_TESTERS, RELATION_TESTER_DEVICE,
};
use crate::util::error::Result;
use std::time::Instant;

/// Open, parse, and index every relation.
///
/// All files are opened before any parsing starts, so a missing file is
/// reported without doing partial work.
pub fn load_repository(sources: &DataSources) -> Result<TesterRepository> {
    let started = Instant::now();

    let testers = open_relation(RELATION_TESTERS, &sources.testers)?;
    let devices = open_relation(RELATION_DEVICES, &sources.devices)?;
    let tester_devices = open_relation(RELATION_TESTER_DEVICE, &sources.tester_device)?;
    let bugs = open_relation(RELATION_BUGS, &sources.bugs)?;

    let relations = Relations::parse(testers, devices, tester_devices, bugs)?;
    let repository = TesterRepository::build(&relations)?;

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Relations loaded"
    );
    Ok(repository)
}
