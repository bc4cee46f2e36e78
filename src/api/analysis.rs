//! Fetch orchestration for the run-analysis view.
//!
//! [`RunAnalyzer`] loads a run, picks the matrix construction path and
//! computes the class distribution. [`RequestGenerations`] discards results
//! of requests that were superseded by a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cache::{EntityKind, NameCache};
use super::run::RunDescription;
use super::source::RunSource;
use crate::error::Result;
use crate::eval::{
    class_distribution, parse_predictions, ClassDistributionEntry, ConfusionMatrix, PredictionRecord,
};

/// Which data the confusion matrix was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSource {
    /// Parsed from the run's predictions file (dense).
    Predictions,
    /// Read from the `confusion_matrix` evaluation (sparse).
    EvaluationArray,
    /// Neither was available.
    None,
}

/// Everything the run-analysis view shows for one run.
#[derive(Debug, Clone)]
pub struct RunAnalysis {
    /// The run description the analysis was derived from.
    pub run: RunDescription,
    /// Parsed prediction records; empty when no file was usable.
    pub records: Vec<PredictionRecord>,
    /// Confusion matrix, empty when `source` is [`MatrixSource::None`].
    pub matrix: ConfusionMatrix,
    /// Per-class correct/incorrect counts over `records`.
    pub distribution: Vec<ClassDistributionEntry>,
    /// Path the matrix came from.
    pub source: MatrixSource,
}

impl RunAnalysis {
    /// Whether there is no prediction data at all to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source == MatrixSource::None && self.distribution.is_empty()
    }
}

/// Loads runs through a [`RunSource`] and derives their analysis.
///
/// Every analyzer carries a [`RequestGenerations`] counter. Callers that
/// switch between runs start each request with [`RunAnalyzer::begin`] and
/// load it with [`RunAnalyzer::analyze_latest`], which gives up as soon as
/// a newer request has been started.
#[derive(Debug)]
pub struct RunAnalyzer<S> {
    source: S,
    names: NameCache,
    generations: Arc<RequestGenerations>,
}

impl<S: RunSource> RunAnalyzer<S> {
    /// Create an analyzer that owns its name cache.
    #[must_use]
    pub fn new(source: S, names: NameCache) -> Self {
        Self { source, names, generations: Arc::new(RequestGenerations::new()) }
    }

    /// Share a request counter with other parts of the caller.
    #[must_use]
    pub fn with_generations(mut self, generations: Arc<RequestGenerations>) -> Self {
        self.generations = generations;
        self
    }

    /// The analyzer's request counter.
    #[must_use]
    pub fn generations(&self) -> &Arc<RequestGenerations> {
        &self.generations
    }

    /// Start a request for `run_id`, superseding every earlier one.
    pub fn begin(&self, run_id: u64) -> RequestTicket {
        self.generations.begin(run_id)
    }

    /// Load a run and build its confusion matrix and class distribution.
    ///
    /// The predictions file is preferred. When the run has none, or it
    /// parses to zero records, the `confusion_matrix` evaluation is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the run description or its predictions file
    /// cannot be fetched. Missing data is not an error.
    pub fn analyze(&self, run_id: u64) -> Result<RunAnalysis> {
        let run = self.source.run(run_id)?;
        let records = self.fetch_records(&run)?;
        Ok(assemble(run, records))
    }

    /// Like [`Self::analyze`], for the run of `ticket`.
    ///
    /// The ticket is checked after each fetch. Returns `Ok(None)` once a
    /// newer request has superseded it, without fetching anything further.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch made while the ticket was current fails.
    pub fn analyze_latest(&self, ticket: &RequestTicket) -> Result<Option<RunAnalysis>> {
        if !self.generations.is_current(ticket) {
            return Ok(None);
        }
        let run = self.source.run(ticket.run_id())?;
        if !self.generations.is_current(ticket) {
            warn!(run_id = ticket.run_id(), "run superseded after metadata fetch");
            return Ok(None);
        }
        let records = self.fetch_records(&run)?;
        Ok(self.generations.accept(ticket, assemble(run, records)))
    }

    fn fetch_records(&self, run: &RunDescription) -> Result<Vec<PredictionRecord>> {
        let Some(url) = run.predictions_url() else {
            return Ok(Vec::new());
        };
        let text = self.source.text(url)?;
        let records = parse_predictions(&text);
        debug!(run_id = run.run_id, records = records.len(), "parsed predictions file");
        Ok(records)
    }

    /// Display name of a flow, cached after the first lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not cached and cannot be fetched.
    pub fn flow_name(&mut self, flow_id: u64) -> Result<Option<String>> {
        self.entity_name(EntityKind::Flow, flow_id)
    }

    /// Display name of a dataset, cached after the first lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not cached and cannot be fetched.
    pub fn dataset_name(&mut self, dataset_id: u64) -> Result<Option<String>> {
        self.entity_name(EntityKind::Dataset, dataset_id)
    }

    fn entity_name(&mut self, kind: EntityKind, id: u64) -> Result<Option<String>> {
        if let Some(name) = self.names.get(kind, id) {
            return Ok(Some(name.to_string()));
        }
        let name = self.source.entity_name(kind, id)?;
        if let Some(name) = &name {
            self.names.insert(kind, id, name.clone());
        }
        Ok(name)
    }

    /// The analyzer's name cache, for explicit invalidation.
    pub fn names_mut(&mut self) -> &mut NameCache {
        &mut self.names
    }

    /// The underlying source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}

/// Pick the matrix path for a run and reduce its records.
fn assemble(run: RunDescription, records: Vec<PredictionRecord>) -> RunAnalysis {
    let run_id = run.run_id;
    let (matrix, source) = if !records.is_empty() {
        (ConfusionMatrix::from_predictions(&records), MatrixSource::Predictions)
    } else if let Some(array) = run.confusion_array() {
        warn!(run_id, "no usable predictions, falling back to confusion_matrix evaluation");
        (ConfusionMatrix::from_array_data(array), MatrixSource::EvaluationArray)
    } else {
        info!(run_id, "no prediction data available");
        (ConfusionMatrix::default(), MatrixSource::None)
    };

    let distribution = class_distribution(&records);
    RunAnalysis { run, records, matrix, distribution, source }
}

/// Ticket identifying one request among a sequence of superseding requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    run_id: u64,
}

impl RequestTicket {
    /// Run the request was issued for.
    #[must_use]
    pub const fn run_id(&self) -> u64 {
        self.run_id
    }
}

/// Monotonic request counter; only the newest ticket's result is accepted.
#[derive(Debug, Default)]
pub struct RequestGenerations {
    current: AtomicU64,
}

impl RequestGenerations {
    /// Create a counter with no request issued yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `run_id`, superseding every earlier ticket.
    pub fn begin(&self, run_id: u64) -> RequestTicket {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        RequestTicket { generation, run_id }
    }

    /// Whether `ticket` is still the newest request.
    #[must_use]
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.current.load(Ordering::Acquire) == ticket.generation
    }

    /// Return `value` if `ticket` is current, drop it otherwise.
    pub fn accept<T>(&self, ticket: &RequestTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            warn!(run_id = ticket.run_id, generation = ticket.generation, "discarding stale response");
            None
        }
    }

    /// Supersede every outstanding ticket without starting a new request.
    pub fn cancel(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }
}
