// TesterMatch - app/state.rs
//
// Application state: the configured sources and the current repository
// snapshot. Queries always run against one complete snapshot.

use crate::app::loader::load_repository;
use crate::core::collapse::collapse;
use crate::core::export::OutputFormat;
use crate::core::model::DisplayRow;
use crate::core::query::{Query, QueryExecutor};
use crate::core::repository::TesterRepository;
use crate::platform::config::DataSources;
use crate::util::error::Result;

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Where the relations are read from.
    pub sources: DataSources,

    /// How query results are written.
    pub format: OutputFormat,

    repository: TesterRepository,
}

impl AppState {
    /// Load the sources and build the first snapshot.
    pub fn load(sources: DataSources, format: OutputFormat) -> Result<Self> {
        let repository = load_repository(&sources)?;
        Ok(Self::with_repository(sources, format, repository))
    }

    pub fn with_repository(
        sources: DataSources,
        format: OutputFormat,
        repository: TesterRepository,
    ) -> Self {
        Self {
            sources,
            format,
            repository,
        }
    }

    pub fn repository(&self) -> &TesterRepository {
        &self.repository
    }

    /// Run a query and collapse the result into display rows.
    pub fn run_query(&self, query: &Query) -> Vec<DisplayRow> {
        let testers = QueryExecutor::new(&self.repository).execute(query);
        collapse(testers)
    }

    /// Rebuild the repository from the sources.
    ///
    /// The current snapshot is replaced only when the rebuild succeeds; on
    /// error it stays in place and the error is returned.
    pub fn reload(&mut self) -> Result<()> {
        let repository = load_repository(&self.sources)?;
        self.repository = repository;
        tracing::info!("Repository snapshot replaced");
        Ok(())
    }
}
