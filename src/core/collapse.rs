// TesterMatch - core/collapse.rs
//
// Collapse query results into one display row per person.
//
// A result can hold several context copies of the same tester (one per
// matched device bucket). Rows are grouped by full name and bug counts are
// summed. Two different people who share a full name end up in one row;
// the relations carry no other identity that survives the device copies.

use crate::core::model::{DisplayRow, Tester};
use std::collections::HashMap;

/// Something that contributes a named bug tally to a display row.
pub trait BugTally {
    fn first_name(&self) -> &str;
    fn last_name(&self) -> &str;
    fn tally(&self) -> usize;
}

impl BugTally for Tester {
    fn first_name(&self) -> &str {
        &self.first_name
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }

    fn tally(&self) -> usize {
        self.bug_count()
    }
}

impl BugTally for DisplayRow {
    fn first_name(&self) -> &str {
        &self.first_name
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }

    fn tally(&self) -> usize {
        self.bug_count
    }
}

/// Group by `(first name, last name)`, sum the tallies, and sort by bug
/// count, most first. Rows with equal counts keep first-seen order.
pub fn collapse<'a, T, I>(items: I) -> Vec<DisplayRow>
where
    T: BugTally + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut rows: Vec<DisplayRow> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for item in items {
        let key = (item.first_name().to_string(), item.last_name().to_string());
        match index.get(&key) {
            Some(&pos) => rows[pos].bug_count += item.tally(),
            None => {
                index.insert(key, rows.len());
                rows.push(DisplayRow {
                    first_name: item.first_name().to_string(),
                    last_name: item.last_name().to_string(),
                    bug_count: item.tally(),
                });
            }
        }
    }

    rows.sort_by(|a, b| b.bug_count.cmp(&a.bug_count));
    rows
}
