// TesterMatch - core/query.rs
//
// Query classification and routing to the repository.
// Core layer: pure logic, no I/O.

use crate::core::model::Tester;
use crate::core::repository::TesterRepository;
use crate::util::constants::{ALL_KEYWORD, TERM_SEPARATOR};

/// A search over the two dimensions. Only the first term of each list
/// decides whether the dimension is constrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub countries: Vec<String>,
    pub devices: Vec<String>,
}

/// Which indexes a query touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    All,
    ByCountry,
    ByDevice,
    ByCountryAndDevice,
}

impl Query {
    pub fn new(countries: Vec<String>, devices: Vec<String>) -> Self {
        Self { countries, devices }
    }

    /// Build a query from two comma-separated fields.
    ///
    /// No validation happens here; the prompt layer rejects malformed input
    /// before it gets this far.
    pub fn from_fields(countries: &str, devices: &str) -> Self {
        Self::new(split_terms(countries), split_terms(devices))
    }

    pub fn scope(&self) -> QueryScope {
        match (
            is_unconstrained(&self.countries),
            is_unconstrained(&self.devices),
        ) {
            (true, true) => QueryScope::All,
            (true, false) => QueryScope::ByDevice,
            (false, true) => QueryScope::ByCountry,
            (false, false) => QueryScope::ByCountryAndDevice,
        }
    }
}

/// Split a field on commas, trimming each term.
pub fn split_terms(field: &str) -> Vec<String> {
    field
        .split(TERM_SEPARATOR)
        .map(|t| t.trim().to_string())
        .collect()
}

/// A dimension is unconstrained when its first term is empty or "all".
fn is_unconstrained(terms: &[String]) -> bool {
    terms.first().map_or(true, |first| {
        let first = first.trim();
        first.is_empty() || first.eq_ignore_ascii_case(ALL_KEYWORD)
    })
}

/// Routes queries to the matching repository lookup.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor<'r> {
    repository: &'r TesterRepository,
}

impl<'r> QueryExecutor<'r> {
    pub fn new(repository: &'r TesterRepository) -> Self {
        Self { repository }
    }

    /// Run a query. The result is sorted by bug count, most first, and may
    /// hold several context copies of the same person.
    pub fn execute(&self, query: &Query) -> Vec<&'r Tester> {
        let scope = query.scope();
        let result = match scope {
            QueryScope::All => self.repository.find_all(),
            QueryScope::ByDevice => self.repository.find_by_devices(query.devices.as_slice()),
            QueryScope::ByCountry => self.repository.find_by_countries(query.countries.as_slice()),
            QueryScope::ByCountryAndDevice => self
                .repository
                .find_by_country_and_device(query.countries.as_slice(), query.devices.as_slice()),
        };
        tracing::debug!(
            ?scope,
            countries = ?query.countries,
            devices = ?query.devices,
            matches = result.len(),
            "Query executed"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relations::Relations;

    fn strings(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scope_classification() {
        let q = |c: &[&str], d: &[&str]| Query::new(strings(c), strings(d)).scope();
        assert_eq!(q(&[""], &[""]), QueryScope::All);
        assert_eq!(q(&["all"], &["ALL"]), QueryScope::All);
        assert_eq!(q(&[], &[]), QueryScope::All);
        assert_eq!(q(&["all"], &["pixel"]), QueryScope::ByDevice);
        assert_eq!(q(&["us"], &[""]), QueryScope::ByCountry);
        assert_eq!(q(&["us"], &["pixel"]), QueryScope::ByCountryAndDevice);
    }

    #[test]
    fn test_only_first_term_decides_scope() {
        let query = Query::new(strings(&["us", "all"]), strings(&["", "pixel"]));
        assert_eq!(query.scope(), QueryScope::ByCountry);
    }

    #[test]
    fn test_from_fields_splits_and_trims() {
        let query = Query::from_fields("us, gb", "");
        assert_eq!(query.countries, strings(&["us", "gb"]));
        assert_eq!(query.devices, strings(&[""]));
    }

    #[test]
    fn test_execute_routes_to_repository() {
        let relations = Relations::parse(
            "id,first,last,country\n1,Ann,Lee,US\n2,Bob,Ray,JP\n".as_bytes(),
            "id,name\n1,Pixel\n".as_bytes(),
            "testerId,deviceId\n1,1\n".as_bytes(),
            "id,deviceId,testerId\n1,1,1\n".as_bytes(),
        )
        .unwrap();
        let repo = TesterRepository::build(&relations).unwrap();
        let executor = QueryExecutor::new(&repo);

        assert_eq!(executor.execute(&Query::from_fields("all", "")).len(), 2);
        assert_eq!(executor.execute(&Query::from_fields("jp", "")).len(), 1);
        assert_eq!(executor.execute(&Query::from_fields("", "pixel")).len(), 1);
        assert!(executor.execute(&Query::from_fields("jp", "pixel")).is_empty());
    }

    #[test]
    fn test_single_tester_single_device_scenario() {
        let relations = Relations::parse(
            "id,first,last,country\n1,Ann,Lee,US\n".as_bytes(),
            "id,name\n1,pixel\n".as_bytes(),
            "testerId,deviceId\n1,1\n".as_bytes(),
            "id,deviceId,testerId\n1,1,1\n2,1,1\n".as_bytes(),
        )
        .unwrap();
        let repo = TesterRepository::build(&relations).unwrap();
        let executor = QueryExecutor::new(&repo);

        for (countries, devices) in [("us", ""), ("", "pixel"), ("us", "pixel")] {
            let result = executor.execute(&Query::from_fields(countries, devices));
            assert_eq!(result.len(), 1, "query ({countries:?}, {devices:?})");
            assert_eq!(result[0].first_name, "Ann");
            assert_eq!(result[0].bug_count(), 2);
        }
        assert!(executor.execute(&Query::from_fields("de", "")).is_empty());
    }
}
