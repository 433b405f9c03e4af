// TesterMatch - core/repository.rs
//
// In-memory indexes over the tester relations.
//
// Canonical testers live in an arena keyed by id. The country index stores
// arena positions, so it sees every bug attached to the canonical record.
// The device index stores independent context copies, each carrying only the
// bugs found on that device.
//
// Core layer: pure logic, no I/O.

use crate::core::model::{Bug, DeviceId, RepositoryStats, Tester, TesterId};
use crate::core::relations::Relations;
use crate::util::constants::{RELATION_BUGS, RELATION_TESTER_DEVICE};
use crate::util::error::IntegrityError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Read-only snapshot of all testers and their indexes.
#[derive(Debug, Default)]
pub struct TesterRepository {
    /// Canonical testers in relation order.
    testers: Vec<Tester>,

    /// Tester id -> position in `testers`.
    by_id: HashMap<TesterId, usize>,

    /// Lowercase country -> positions in `testers`.
    by_country: HashMap<String, Vec<usize>>,

    /// Lowercase device name -> context copies, one per association row.
    by_device: HashMap<String, Vec<Tester>>,

    /// Device id -> lowercase device name.
    device_names: HashMap<DeviceId, String>,

    associations: usize,
    bugs: usize,
}

impl TesterRepository {
    /// Build every index from the parsed relations.
    ///
    /// Order matters: testers, then devices, then associations (which copy
    /// testers into device buckets), then bugs (which attach to the canonical
    /// tester and to the matching copies in the bug's device bucket).
    ///
    /// Any reference to an unknown tester or device id aborts the build.
    pub fn build(relations: &Relations) -> Result<Self, IntegrityError> {
        let mut repo = Self::default();
        repo.load_testers(relations)?;
        repo.load_devices(relations)?;
        repo.load_associations(relations)?;
        repo.attach_bugs(relations)?;

        let stats = repo.stats();
        tracing::info!(
            testers = stats.testers,
            countries = stats.countries,
            devices = stats.devices,
            associations = stats.associations,
            bugs = stats.bugs,
            "Repository built"
        );
        Ok(repo)
    }

    fn load_testers(&mut self, relations: &Relations) -> Result<(), IntegrityError> {
        for record in &relations.testers {
            if self.by_id.contains_key(&record.id) {
                return Err(IntegrityError::DuplicateTester {
                    line: record.line,
                    tester_id: record.id,
                });
            }
            let pos = self.testers.len();
            self.testers.push(Tester::new(
                record.id,
                record.first_name.clone(),
                record.last_name.clone(),
            ));
            self.by_id.insert(record.id, pos);
            self.by_country
                .entry(normalise_key(&record.country))
                .or_default()
                .push(pos);
        }
        Ok(())
    }

    fn load_devices(&mut self, relations: &Relations) -> Result<(), IntegrityError> {
        for record in &relations.devices {
            let name = normalise_key(&record.name);
            if self.device_names.insert(record.id, name.clone()).is_some() {
                return Err(IntegrityError::DuplicateDevice {
                    line: record.line,
                    device_id: record.id,
                });
            }
            self.by_device.entry(name).or_default();
        }
        Ok(())
    }

    fn load_associations(&mut self, relations: &Relations) -> Result<(), IntegrityError> {
        for record in &relations.tester_devices {
            let pos = self.resolve_tester(RELATION_TESTER_DEVICE, record.line, record.tester_id)?;
            let device =
                self.resolve_device(RELATION_TESTER_DEVICE, record.line, record.device_id)?;
            let copy = self.testers[pos].context_copy();
            self.by_device.entry(device).or_default().push(copy);
            self.associations += 1;
        }
        Ok(())
    }

    fn attach_bugs(&mut self, relations: &Relations) -> Result<(), IntegrityError> {
        for record in &relations.bugs {
            let pos = self.resolve_tester(RELATION_BUGS, record.line, record.tester_id)?;
            let device = self.resolve_device(RELATION_BUGS, record.line, record.device_id)?;
            let bug = Arc::new(Bug::new(record.id, record.tester_id, device));

            self.testers[pos].add_bug(Arc::clone(&bug));
            if let Some(copies) = self.by_device.get_mut(&bug.device) {
                for copy in copies.iter_mut().filter(|t| t.id == bug.tester_id) {
                    copy.add_bug(Arc::clone(&bug));
                }
            }
            self.bugs += 1;
        }
        Ok(())
    }

    fn resolve_tester(
        &self,
        relation: &'static str,
        line: u64,
        tester_id: TesterId,
    ) -> Result<usize, IntegrityError> {
        self.by_id
            .get(&tester_id)
            .copied()
            .ok_or(IntegrityError::UnknownTester {
                relation,
                line,
                tester_id,
            })
    }

    fn resolve_device(
        &self,
        relation: &'static str,
        line: u64,
        device_id: DeviceId,
    ) -> Result<String, IntegrityError> {
        self.device_names
            .get(&device_id)
            .cloned()
            .ok_or(IntegrityError::UnknownDevice {
                relation,
                line,
                device_id,
            })
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// The canonical record for a tester id.
    pub fn get(&self, id: TesterId) -> Option<&Tester> {
        self.by_id.get(&id).map(|&pos| &self.testers[pos])
    }

    /// Every canonical tester, zero-bug testers included, most bugs first.
    pub fn find_all(&self) -> Vec<&Tester> {
        let mut result: Vec<&Tester> = self.testers.iter().collect();
        sort_by_bug_count(&mut result);
        result
    }

    /// Canonical testers from every requested country, most bugs first.
    ///
    /// Buckets are concatenated without deduplication. Unknown countries
    /// contribute nothing.
    pub fn find_by_countries<S: AsRef<str>>(&self, countries: &[S]) -> Vec<&Tester> {
        let mut result: Vec<&Tester> = countries
            .iter()
            .filter_map(|c| self.by_country.get(&normalise_key(c.as_ref())))
            .flatten()
            .map(|&pos| &self.testers[pos])
            .collect();
        sort_by_bug_count(&mut result);
        result
    }

    /// Device-context copies from every requested device, most bugs first.
    ///
    /// Each copy carries only the bugs found on its device. Buckets are
    /// concatenated without deduplication. Unknown devices contribute nothing.
    pub fn find_by_devices<S: AsRef<str>>(&self, devices: &[S]) -> Vec<&Tester> {
        let mut result: Vec<&Tester> = devices
            .iter()
            .filter_map(|d| self.by_device.get(&normalise_key(d.as_ref())))
            .flatten()
            .collect();
        sort_by_bug_count(&mut result);
        result
    }

    /// Testers matching both a requested country and a requested device.
    ///
    /// The two sides are joined on tester id alone, because a canonical
    /// record and a device copy of the same person are never equal. The
    /// device-side copies are kept, so bug counts cover only the requested
    /// devices. Copies that compare equal (same id and bugs) are kept once.
    pub fn find_by_country_and_device<C: AsRef<str>, D: AsRef<str>>(
        &self,
        countries: &[C],
        devices: &[D],
    ) -> Vec<&Tester> {
        let in_country = self.find_by_countries(countries);
        let in_device = self.find_by_devices(devices);
        let mut result = intersect_by_id(in_device, &in_country);
        sort_by_bug_count(&mut result);
        result
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Every country key, sorted.
    pub fn countries(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_country.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Every device key, sorted.
    pub fn devices(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_device.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn stats(&self) -> RepositoryStats {
        RepositoryStats {
            testers: self.testers.len(),
            countries: self.by_country.len(),
            devices: self.by_device.len(),
            associations: self.associations,
            bugs: self.bugs,
        }
    }
}

/// Keep each element of `retaining` whose id also appears in `others`.
///
/// Only ids are compared. Elements of `retaining` that are equal under
/// `Tester` equality appear once in the result, in first-seen order.
pub fn intersect_by_id<'a>(retaining: Vec<&'a Tester>, others: &[&Tester]) -> Vec<&'a Tester> {
    let ids: HashSet<TesterId> = others.iter().map(|t| t.id).collect();
    let mut seen: HashSet<&Tester> = HashSet::new();
    retaining
        .into_iter()
        .filter(|t| ids.contains(&t.id))
        .filter(|t| seen.insert(*t))
        .collect()
}

/// Lowercase, trimmed form used for every index key.
pub fn normalise_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Stable sort, most bugs first.
fn sort_by_bug_count(testers: &mut [&Tester]) {
    testers.sort_by(|a, b| b.bug_count().cmp(&a.bug_count()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::BugId;
    use crate::core::relations::{BugRecord, DeviceRecord, TesterDeviceRecord, TesterRecord};

    fn tester(id: TesterId, first: &str, last: &str, country: &str) -> TesterRecord {
        TesterRecord {
            line: u64::from(id.unsigned_abs()) + 1,
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            country: country.to_string(),
        }
    }

    fn device(id: DeviceId, name: &str) -> DeviceRecord {
        DeviceRecord {
            line: u64::from(id.unsigned_abs()) + 1,
            id,
            name: name.to_string(),
        }
    }

    fn assoc(tester_id: TesterId, device_id: DeviceId) -> TesterDeviceRecord {
        TesterDeviceRecord {
            line: 2,
            tester_id,
            device_id,
        }
    }

    fn bug(id: BugId, device_id: DeviceId, tester_id: TesterId) -> BugRecord {
        BugRecord {
            line: u64::from(id.unsigned_abs()) + 1,
            id,
            device_id,
            tester_id,
        }
    }

    /// Ann (US) uses a Pixel and an iPhone; Bob (US) and Cem (DE) use a Pixel.
    fn sample() -> Relations {
        Relations {
            testers: vec![
                tester(1, "Ann", "Lee", "US"),
                tester(2, "Bob", "Ray", "us"),
                tester(3, "Cem", "Oz", "DE"),
            ],
            devices: vec![device(1, "Pixel"), device(2, "iPhone 4"), device(3, "Nokia")],
            tester_devices: vec![assoc(1, 1), assoc(1, 2), assoc(2, 1), assoc(3, 1)],
            bugs: vec![
                bug(1, 1, 1),
                bug(2, 2, 1),
                bug(3, 2, 1),
                bug(4, 1, 2),
                bug(5, 1, 3),
            ],
        }
    }

    fn ids_and_counts(testers: &[&Tester]) -> Vec<(TesterId, usize)> {
        testers.iter().map(|t| (t.id, t.bug_count())).collect()
    }

    #[test]
    fn test_canonical_testers_hold_every_bug() {
        let repo = TesterRepository::build(&sample()).unwrap();
        assert_eq!(repo.get(1).unwrap().bug_count(), 3);
        assert_eq!(repo.get(2).unwrap().bug_count(), 1);
        assert_eq!(repo.get(3).unwrap().bug_count(), 1);
    }

    #[test]
    fn test_device_copies_hold_only_device_bugs() {
        let repo = TesterRepository::build(&sample()).unwrap();
        let pixel = repo.find_by_devices(&["pixel"]);
        assert_eq!(ids_and_counts(&pixel), vec![(1, 1), (2, 1), (3, 1)]);
        for t in &pixel {
            assert!(t.bugs().iter().all(|b| b.device == "pixel"));
        }

        let iphone = repo.find_by_devices(&["iphone 4"]);
        assert_eq!(ids_and_counts(&iphone), vec![(1, 2)]);
    }

    #[test]
    fn test_find_all_includes_zero_bug_testers_sorted() {
        let mut relations = sample();
        relations.testers.push(tester(4, "Dee", "Fox", "FR"));
        let repo = TesterRepository::build(&relations).unwrap();
        let all = repo.find_all();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[3].id, 4);
        assert!(all.windows(2).all(|w| w[0].bug_count() >= w[1].bug_count()));
    }

    #[test]
    fn test_country_lookup_is_case_insensitive_and_shared() {
        let repo = TesterRepository::build(&sample()).unwrap();
        let us = repo.find_by_countries(&["US"]);
        assert_eq!(ids_and_counts(&us), vec![(1, 3), (2, 1)]);
        assert!(std::ptr::eq(us[0], repo.get(1).unwrap()));
    }

    #[test]
    fn test_unknown_keys_contribute_nothing() {
        let repo = TesterRepository::build(&sample()).unwrap();
        assert!(repo.find_by_countries(&["jp"]).is_empty());
        assert!(repo.find_by_devices(&["nokia"]).is_empty());
        assert_eq!(repo.find_by_devices(&["motorola", "iphone 4"]).len(), 1);
    }

    #[test]
    fn test_union_keeps_duplicates() {
        let repo = TesterRepository::build(&sample()).unwrap();
        let both = repo.find_by_devices(&["pixel", "iphone 4"]);
        assert_eq!(both.iter().filter(|t| t.id == 1).count(), 2);
        assert_eq!(both.len(), 4);
    }

    #[test]
    fn test_intersection_keeps_device_scoped_copies() {
        let repo = TesterRepository::build(&sample()).unwrap();
        let result = repo.find_by_country_and_device(&["us"], &["iphone 4"]);
        assert_eq!(ids_and_counts(&result), vec![(1, 2)]);

        let result = repo.find_by_country_and_device(&["us"], &["pixel"]);
        assert_eq!(ids_and_counts(&result), vec![(1, 1), (2, 1)]);

        let result = repo.find_by_country_and_device(&["de"], &["iphone 4"]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_intersection_collapses_equal_copies_only() {
        let repo = TesterRepository::build(&sample()).unwrap();
        // Same device twice: identical copies are kept once.
        let result = repo.find_by_country_and_device(&["us"], &["pixel", "pixel"]);
        assert_eq!(result.len(), 2);
        // Different devices: Ann's copies differ by bugs and both survive.
        let result = repo.find_by_country_and_device(&["us"], &["pixel", "iphone 4"]);
        assert_eq!(result.iter().filter(|t| t.id == 1).count(), 2);
    }

    #[test]
    fn test_bug_without_association_stays_canonical_only() {
        let mut relations = sample();
        relations.bugs.push(bug(6, 3, 2));
        let repo = TesterRepository::build(&relations).unwrap();
        assert_eq!(repo.get(2).unwrap().bug_count(), 2);
        assert!(repo.find_by_devices(&["nokia"]).is_empty());
    }

    #[test]
    fn test_unknown_tester_in_bugs_fails() {
        let mut relations = sample();
        relations.bugs.push(bug(9, 1, 99));
        let err = TesterRepository::build(&relations).unwrap_err();
        assert_eq!(
            err,
            IntegrityError::UnknownTester {
                relation: RELATION_BUGS,
                line: 10,
                tester_id: 99
            }
        );
    }

    #[test]
    fn test_unknown_device_in_associations_fails() {
        let mut relations = sample();
        relations.tester_devices.push(assoc(1, 42));
        let err = TesterRepository::build(&relations).unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::UnknownDevice {
                relation: RELATION_TESTER_DEVICE,
                device_id: 42,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_tester_id_fails() {
        let mut relations = sample();
        relations.testers.push(tester(2, "Bo", "Ray", "GB"));
        assert!(matches!(
            TesterRepository::build(&relations),
            Err(IntegrityError::DuplicateTester { tester_id: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_device_id_fails() {
        let mut relations = sample();
        relations.devices.push(device(1, "Moto G"));
        assert_eq!(
            TesterRepository::build(&relations).unwrap_err(),
            IntegrityError::DuplicateDevice {
                line: 2,
                device_id: 1
            }
        );
    }

    #[test]
    fn test_unknown_tester_in_associations_fails() {
        let mut relations = sample();
        relations.tester_devices.push(assoc(77, 1));
        assert_eq!(
            TesterRepository::build(&relations).unwrap_err(),
            IntegrityError::UnknownTester {
                relation: RELATION_TESTER_DEVICE,
                line: 2,
                tester_id: 77
            }
        );
    }

    #[test]
    fn test_negative_ids_are_ordinary_keys() {
        let mut relations = sample();
        relations.testers.push(tester(-4, "Dee", "Fox", "FR"));
        relations.tester_devices.push(assoc(-4, 3));
        relations.bugs.push(bug(-6, 3, -4));
        let repo = TesterRepository::build(&relations).unwrap();
        assert_eq!(repo.get(-4).unwrap().bug_count(), 1);
        assert_eq!(ids_and_counts(&repo.find_by_devices(&["nokia"])), vec![(-4, 1)]);
    }

    #[test]
    fn test_stats_and_keys() {
        let repo = TesterRepository::build(&sample()).unwrap();
        let stats = repo.stats();
        assert_eq!(stats.testers, 3);
        assert_eq!(stats.countries, 2);
        assert_eq!(stats.devices, 3);
        assert_eq!(stats.associations, 4);
        assert_eq!(stats.bugs, 5);
        assert_eq!(repo.countries(), vec!["de", "us"]);
        assert_eq!(repo.devices(), vec!["iphone 4", "nokia", "pixel"]);
    }
}
