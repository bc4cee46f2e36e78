//! Where run descriptions and prediction files come from.
//!
//! [`RunSource`] is the seam between the analysis and the network. The HTTP
//! implementation lives in [`super::http`] behind the `http` feature;
//! [`StaticRunSource`] serves fixtures.

use std::collections::HashMap;

use super::cache::EntityKind;
use super::run::RunDescription;
use crate::error::{Error, Result};

/// Provider of run metadata, file contents and entity names.
pub trait RunSource {
    /// Fetch and decode the description of a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be fetched or decoded.
    fn run(&self, run_id: u64) -> Result<RunDescription>;

    /// Fetch the text content of a file URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be fetched.
    fn text(&self, url: &str) -> Result<String>;

    /// Fetch the display name of a flow or dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity cannot be fetched.
    fn entity_name(&self, kind: EntityKind, id: u64) -> Result<Option<String>>;
}

/// In-memory [`RunSource`] for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct StaticRunSource {
    runs: HashMap<u64, RunDescription>,
    files: HashMap<String, String>,
    names: HashMap<(EntityKind, u64), String>,
}

impl StaticRunSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a run description.
    #[must_use]
    pub fn with_run(mut self, run: RunDescription) -> Self {
        self.runs.insert(run.run_id, run);
        self
    }

    /// Add a file served at `url`.
    #[must_use]
    pub fn with_file(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(url.into(), text.into());
        self
    }

    /// Add an entity name.
    #[must_use]
    pub fn with_name(mut self, kind: EntityKind, id: u64, name: impl Into<String>) -> Self {
        self.names.insert((kind, id), name.into());
        self
    }
}

impl RunSource for StaticRunSource {
    fn run(&self, run_id: u64) -> Result<RunDescription> {
        self.runs
            .get(&run_id)
            .cloned()
            .ok_or_else(|| Error::fetch(format!("run/{run_id}"), "HTTP 404"))
    }

    fn text(&self, url: &str) -> Result<String> {
        self.files.get(url).cloned().ok_or_else(|| Error::fetch(url, "HTTP 404"))
    }

    fn entity_name(&self, kind: EntityKind, id: u64) -> Result<Option<String>> {
        Ok(self.names.get(&(kind, id)).cloned())
    }
}
