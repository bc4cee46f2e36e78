//! Catalog API access and fetch orchestration.
//!
//! - [`run`]: serde model of run descriptions
//! - [`source`]: the [`RunSource`] seam and an in-memory implementation
//! - `http`: the REST implementation (feature `http`)
//! - [`cache`]: bounded entity-name cache
//! - [`analysis`]: the analyzer and stale-response protection
//! - [`search`]: result-window paging for browse views

pub mod analysis;
pub mod cache;
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub mod http;
pub mod run;
pub mod search;
pub mod source;

pub use analysis::{MatrixSource, RequestGenerations, RequestTicket, RunAnalysis, RunAnalyzer};
pub use cache::{EntityKind, NameCache};
#[cfg(feature = "http")]
pub use http::HttpRunSource;
pub use run::{RunDescription, RunEnvelope};
pub use search::{PageRequest, ResultWindow};
pub use source::{RunSource, StaticRunSource};
