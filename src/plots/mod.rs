//! Chart types for run analysis.
//!
//! Provides ready-to-use visualization types with builder APIs.

mod confusion_matrix;
mod distribution;

pub use confusion_matrix::ConfusionHeatmap;
pub use distribution::DistributionChart;
