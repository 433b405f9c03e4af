// TesterMatch - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Tester identifier as it appears in the relations.
pub type TesterId = i32;

/// Device identifier as it appears in the relations.
pub type DeviceId = i32;

/// Bug identifier as it appears in the relations.
pub type BugId = i32;

// =============================================================================
// Bug
// =============================================================================

/// A single bug report.
///
/// Built once per bugs row and shared (via `Arc`) by the canonical tester and
/// every device-context copy it is attached to. Two bugs are equal when their
/// ids are equal; the other fields do not take part.
#[derive(Debug, Clone)]
pub struct Bug {
    pub id: BugId,

    /// Id of the canonical tester that reported this bug. Resolves through
    /// the repository's registry, never to a context copy.
    pub tester_id: TesterId,

    /// Normalised (lowercase) name of the device the bug was found on.
    pub device: String,
}

impl Bug {
    pub fn new(id: BugId, tester_id: TesterId, device: impl Into<String>) -> Self {
        Self {
            id,
            tester_id,
            device: device.into(),
        }
    }
}

impl PartialEq for Bug {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Bug {}

// =============================================================================
// Tester
// =============================================================================

/// A tester as seen from one index context.
///
/// The same person exists as several `Tester` values: the canonical record
/// with every bug, and one copy per device bucket holding only that device's
/// bugs. Equality is therefore context-scoped: id *and* bug list must match.
/// Joins that should ignore the context compare ids explicitly.
#[derive(Debug, Clone)]
pub struct Tester {
    pub id: TesterId,
    pub first_name: String,
    pub last_name: String,
    bugs: Vec<Arc<Bug>>,
}

impl Tester {
    pub fn new(id: TesterId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            bugs: Vec::new(),
        }
    }

    /// A new value with the same identity and names but no bugs.
    ///
    /// Used to seed device buckets, so later bug attachment on the copy never
    /// reaches the canonical record or other buckets.
    pub fn context_copy(&self) -> Self {
        Self::new(self.id, self.first_name.clone(), self.last_name.clone())
    }

    pub fn add_bug(&mut self, bug: Arc<Bug>) {
        self.bugs.push(bug);
    }

    /// Bugs visible in this context, in attachment order.
    pub fn bugs(&self) -> &[Arc<Bug>] {
        &self.bugs
    }

    pub fn bug_count(&self) -> usize {
        self.bugs.len()
    }
}

impl PartialEq for Tester {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.bugs.len() == other.bugs.len()
            && self.bugs.iter().zip(&other.bugs).all(|(a, b)| a == b)
    }
}

impl Eq for Tester {}

// Equal testers always share an id, so hashing the id alone is consistent.
impl Hash for Tester {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// =============================================================================
// Display row
// =============================================================================

/// One line of query output: a person and the bugs they found within the
/// scope of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub first_name: String,
    pub last_name: String,
    pub bug_count: usize,
}

// =============================================================================
// Repository statistics
// =============================================================================

/// Size of a built repository, logged after every (re)build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryStats {
    pub testers: usize,
    pub countries: usize,
    pub devices: usize,
    pub associations: usize,
    pub bugs: usize,
}
