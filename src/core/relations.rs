// TesterMatch - core/relations.rs
//
// Positional CSV parsing of the four input relations.
// Core layer: accepts Read trait objects, never touches the filesystem.

use crate::core::model::{BugId, DeviceId, TesterId};
use crate::util::constants::{
    RELATION_BUGS, RELATION_DEVICES, RELATION_TESTERS, RELATION_TESTER_DEVICE,
};
use crate::util::error::RecordError;
use std::io::Read;

/// A row of the testers relation. Trailing columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesterRecord {
    pub line: u64,
    pub id: TesterId,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
}

/// A row of the devices relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub line: u64,
    pub id: DeviceId,
    pub name: String,
}

/// A row of the tester-device association relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TesterDeviceRecord {
    pub line: u64,
    pub tester_id: TesterId,
    pub device_id: DeviceId,
}

/// A row of the bugs relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BugRecord {
    pub line: u64,
    pub id: BugId,
    pub device_id: DeviceId,
    pub tester_id: TesterId,
}

/// All four relations, parsed and ready for the index builder.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    pub testers: Vec<TesterRecord>,
    pub devices: Vec<DeviceRecord>,
    pub tester_devices: Vec<TesterDeviceRecord>,
    pub bugs: Vec<BugRecord>,
}

impl Relations {
    /// Parse all four relations from their readers.
    pub fn parse<T: Read, D: Read, M: Read, B: Read>(
        testers: T,
        devices: D,
        tester_devices: M,
        bugs: B,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            testers: parse_testers(testers)?,
            devices: parse_devices(devices)?,
            tester_devices: parse_tester_devices(tester_devices)?,
            bugs: parse_bugs(bugs)?,
        })
    }
}

/// Walks the data rows of one relation, handing each to `map` together with
/// its 1-based line number in the source.
struct RowReader<R: Read> {
    relation: &'static str,
    reader: csv::Reader<R>,
}

impl<R: Read> RowReader<R> {
    fn new(relation: &'static str, input: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);
        Self { relation, reader }
    }

    fn collect<T>(
        mut self,
        mut map: impl FnMut(&Row<'_>) -> Result<T, RecordError>,
    ) -> Result<Vec<T>, RecordError> {
        let mut out = Vec::new();
        let mut record = csv::StringRecord::new();
        loop {
            let more = self
                .reader
                .read_record(&mut record)
                .map_err(|source| RecordError::Csv {
                    relation: self.relation,
                    source,
                })?;
            if !more {
                break;
            }
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());
            out.push(map(&Row {
                relation: self.relation,
                line,
                record: &record,
            })?);
        }
        tracing::debug!(relation = self.relation, rows = out.len(), "Relation parsed");
        Ok(out)
    }
}

struct Row<'a> {
    relation: &'static str,
    line: u64,
    record: &'a csv::StringRecord,
}

impl Row<'_> {
    fn text(&self, index: usize, field: &'static str) -> Result<String, RecordError> {
        self.record
            .get(index)
            .map(|s| s.replace('"', ""))
            .ok_or(RecordError::MissingField {
                relation: self.relation,
                line: self.line,
                field,
            })
    }

    fn id(&self, index: usize, field: &'static str) -> Result<i32, RecordError> {
        let raw = self.text(index, field)?;
        raw.parse().map_err(|_| RecordError::InvalidId {
            relation: self.relation,
            line: self.line,
            field,
            value: raw,
        })
    }
}

/// Parse the testers relation: `id, first, last, country[, ...]`.
pub fn parse_testers<R: Read>(input: R) -> Result<Vec<TesterRecord>, RecordError> {
    RowReader::new(RELATION_TESTERS, input).collect(|row| {
        Ok(TesterRecord {
            line: row.line,
            id: row.id(0, "testerId")?,
            first_name: row.text(1, "firstName")?,
            last_name: row.text(2, "lastName")?,
            country: row.text(3, "country")?,
        })
    })
}

/// Parse the devices relation: `id, name`.
pub fn parse_devices<R: Read>(input: R) -> Result<Vec<DeviceRecord>, RecordError> {
    RowReader::new(RELATION_DEVICES, input).collect(|row| {
        Ok(DeviceRecord {
            line: row.line,
            id: row.id(0, "deviceId")?,
            name: row.text(1, "description")?,
        })
    })
}

/// Parse the tester-device relation: `testerId, deviceId`.
pub fn parse_tester_devices<R: Read>(input: R) -> Result<Vec<TesterDeviceRecord>, RecordError> {
    RowReader::new(RELATION_TESTER_DEVICE, input).collect(|row| {
        Ok(TesterDeviceRecord {
            line: row.line,
            tester_id: row.id(0, "testerId")?,
            device_id: row.id(1, "deviceId")?,
        })
    })
}

/// Parse the bugs relation: `id, deviceId, testerId`.
pub fn parse_bugs<R: Read>(input: R) -> Result<Vec<BugRecord>, RecordError> {
    RowReader::new(RELATION_BUGS, input).collect(|row| {
        Ok(BugRecord {
            line: row.line,
            id: row.id(0, "bugId")?,
            device_id: row.id(1, "deviceId")?,
            tester_id: row.id(2, "testerId")?,
        })
    })
}
