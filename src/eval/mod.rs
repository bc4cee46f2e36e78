//! Prediction analysis: parsing, confusion matrices, class distributions.
//!
//! Everything here is a pure, single-pass transformation over text or JSON
//! that has already been fetched. Nothing in this module returns an error;
//! malformed input degrades to fewer records or zero counts.
//!
//! ```rust,ignore
//! use evalview::eval::{class_distribution, parse_predictions, ConfusionMatrix};
//!
//! let records = parse_predictions(&text);
//! let matrix = ConfusionMatrix::from_predictions(&records);
//! let bars = class_distribution(&records);
//! ```

pub mod distribution;
pub mod matrix;
pub mod predictions;

pub use distribution::{class_distribution, ClassDistributionEntry};
pub use matrix::{ConfusionCell, ConfusionMatrix, MatrixLayout, MatrixMetrics};
pub use predictions::{parse_predictions, PredictionFile, PredictionRecord};
