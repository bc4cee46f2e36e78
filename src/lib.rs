//! # Evalview
//!
//! Run-analysis toolkit for an open machine-learning catalog.
//!
//! Evalview turns a run's raw prediction file (ARFF text) or its
//! pre-aggregated confusion evaluation into display-ready structures:
//! confusion matrices, per-class correct/incorrect distributions, and
//! accuracy/precision/recall metrics. Results render as PNG heatmaps or
//! colored terminal tables.
//!
//! ## Features
//!
//! - **Lenient parsing**: malformed rows degrade to fewer records, never errors
//! - **Two matrix paths**: dense from predictions, sparse from evaluation arrays
//! - **Catalog access**: run descriptions, prediction files, cached entity names
//! - **Multiple outputs**: PNG and terminal (plain or ANSI 24-bit) rendering
//!
//! ## Feature Flags
//!
//! - `http`: fetch runs and files from the catalog REST API
//! - `cli`: the `evalview` binary (implies `http`, enabled by default)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evalview::prelude::*;
//!
//! let records = parse_predictions(&arff_text);
//! let matrix = ConfusionMatrix::from_predictions(&records);
//!
//! print!("{}", TerminalTable::new().render_matrix(&matrix));
//! let fb = ConfusionHeatmap::new(&matrix).build()?.to_framebuffer()?;
//! PngEncoder::write_to_file(&fb, "matrix.png")?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in rendering code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Analysis Modules
// ============================================================================

/// Prediction parsing, confusion matrices and class distributions.
pub mod eval;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Colors and confusion-cell tints.
pub mod color;

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Confusion heatmaps and distribution charts.
pub mod plots;

/// Output encoders (PNG, terminal).
pub mod output;

// ============================================================================
// Catalog Modules
// ============================================================================

/// Catalog API model, sources, caching and paging.
pub mod api;

// ============================================================================
// Ambient Modules
// ============================================================================

/// Layered configuration (CLI > ENV > file > defaults).
pub mod config;

/// Tracing subscriber setup.
#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod logging;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for evalview operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and functions for convenient imports.
///
/// ```rust,ignore
/// use evalview::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "http")]
    pub use crate::api::HttpRunSource;
    pub use crate::api::{MatrixSource, NameCache, RunAnalysis, RunAnalyzer, RunSource};
    pub use crate::color::{CellTint, Rgba};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::eval::{
        class_distribution, parse_predictions, ClassDistributionEntry, ConfusionCell, ConfusionMatrix,
        MatrixLayout, MatrixMetrics, PredictionFile, PredictionRecord,
    };
    pub use crate::framebuffer::Framebuffer;
    pub use crate::output::{PngEncoder, TerminalTable};
    pub use crate::plots::{ConfusionHeatmap, DistributionChart};
}
