//! Confusion matrices built from raw predictions or pre-aggregated arrays.
//!
//! Two construction paths produce the same [`ConfusionMatrix`] type:
//!
//! - [`ConfusionMatrix::from_predictions`] counts parsed prediction records
//!   and materializes every `(actual, predicted)` pair of the class set,
//!   zeros included ([`MatrixLayout::Dense`]).
//! - [`ConfusionMatrix::from_array_data`] reads an evaluation's `array_data`
//!   object keyed by `"actual,predicted"` and keeps only the pairs present
//!   ([`MatrixLayout::Sparse`]).
//!
//! The layouts are kept distinct on purpose; [`ConfusionMatrix::densify`]
//! converts a sparse matrix when a caller needs the full grid.
//!
//! Rows are actual classes, columns are predicted classes.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

use super::predictions::PredictionRecord;
use crate::color::CellTint;

/// One `(actual, predicted)` pair and its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfusionCell {
    /// Ground-truth class label.
    pub actual: String,
    /// Predicted class label.
    pub predicted: String,
    /// Number of occurrences.
    pub count: u64,
}

impl ConfusionCell {
    /// Whether this cell lies on the diagonal.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.actual == self.predicted
    }
}

/// Shape of the cell list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixLayout {
    /// Every pair of `classes x classes` is present, row-major.
    #[default]
    Dense,
    /// Only pairs that were present in the source payload.
    Sparse,
}

/// Confusion matrix cells plus the sorted set of observed class labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfusionMatrix {
    cells: Vec<ConfusionCell>,
    classes: Vec<String>,
    layout: MatrixLayout,
}

impl ConfusionMatrix {
    /// Build a dense matrix from parsed prediction records.
    ///
    /// Records without a ground-truth label are ignored. An empty input
    /// produces an empty matrix with no classes.
    #[must_use]
    pub fn from_predictions(records: &[PredictionRecord]) -> Self {
        let mut classes = BTreeSet::new();
        let mut counts: HashMap<(&str, &str), u64> = HashMap::new();

        for (actual, predicted) in records.iter().filter_map(PredictionRecord::labels) {
            classes.insert(actual);
            classes.insert(predicted);
            *counts.entry((actual, predicted)).or_insert(0) += 1;
        }

        let mut cells = Vec::with_capacity(classes.len() * classes.len());
        for &actual in &classes {
            for &predicted in &classes {
                cells.push(ConfusionCell {
                    actual: actual.to_string(),
                    predicted: predicted.to_string(),
                    count: counts.get(&(actual, predicted)).copied().unwrap_or(0),
                });
            }
        }

        Self {
            cells,
            classes: classes.into_iter().map(str::to_string).collect(),
            layout: MatrixLayout::Dense,
        }
    }

    /// Build a sparse matrix from an evaluation's `array_data` object.
    ///
    /// Keys must split on `,` into exactly two labels; other keys are
    /// skipped. Values may be numbers or numeric strings and fall back to 0.
    /// Keys that trim to the same pair are summed into one cell.
    #[must_use]
    pub fn from_array_data(array_data: &Map<String, Value>) -> Self {
        let mut classes = BTreeSet::new();
        let mut cells: Vec<ConfusionCell> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for (key, value) in array_data {
            let parts: Vec<&str> = key.split(',').collect();
            let [actual, predicted] = parts.as_slice() else {
                continue;
            };
            let (actual, predicted) = (actual.trim().to_string(), predicted.trim().to_string());
            let count = coerce_count(value);

            classes.insert(actual.clone());
            classes.insert(predicted.clone());

            match index.get(&(actual.clone(), predicted.clone())) {
                Some(&slot) => cells[slot].count += count,
                None => {
                    index.insert((actual.clone(), predicted.clone()), cells.len());
                    cells.push(ConfusionCell { actual, predicted, count });
                }
            }
        }

        Self { cells, classes: classes.into_iter().collect(), layout: MatrixLayout::Sparse }
    }

    /// Return a dense copy with every pair of the class set materialized.
    #[must_use]
    pub fn densify(&self) -> Self {
        if self.layout == MatrixLayout::Dense {
            return self.clone();
        }

        let counts: HashMap<(&str, &str), u64> = self
            .cells
            .iter()
            .map(|cell| ((cell.actual.as_str(), cell.predicted.as_str()), cell.count))
            .collect();

        let cells = self
            .classes
            .iter()
            .flat_map(|actual| {
                let counts = &counts;
                self.classes.iter().map(move |predicted| ConfusionCell {
                    actual: actual.clone(),
                    predicted: predicted.clone(),
                    count: counts.get(&(actual.as_str(), predicted.as_str())).copied().unwrap_or(0),
                })
            })
            .collect();

        Self { cells, classes: self.classes.clone(), layout: MatrixLayout::Dense }
    }

    /// Matrix cells. Row-major over `classes x classes` when dense.
    #[must_use]
    pub fn cells(&self) -> &[ConfusionCell] {
        &self.cells
    }

    /// Sorted, distinct class labels.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Layout of the cell list.
    #[must_use]
    pub const fn layout(&self) -> MatrixLayout {
        self.layout
    }

    /// Whether the matrix has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Count for a single pair, 0 when absent.
    #[must_use]
    pub fn count(&self, actual: &str, predicted: &str) -> u64 {
        self.cells
            .iter()
            .find(|cell| cell.actual == actual && cell.predicted == predicted)
            .map_or(0, |cell| cell.count)
    }

    /// Sum of all cell counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|cell| cell.count).sum()
    }

    /// Largest cell count.
    ///
    /// Folded directly over the cells, no intermediate collection.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.cells.iter().fold(0, |max, cell| max.max(cell.count))
    }

    /// Display intensity of a cell in `[0, 1]`, relative to [`Self::max_count`].
    #[must_use]
    pub fn intensity(&self, cell: &ConfusionCell) -> f32 {
        intensity(cell.count, self.max_count())
    }

    /// Cells paired with their display tint.
    pub fn tinted_cells(&self) -> impl Iterator<Item = (&ConfusionCell, CellTint)> {
        let max = self.max_count();
        self.cells.iter().map(move |cell| (cell, CellTint::for_cell(cell, intensity(cell.count, max))))
    }

    /// Classification metrics derived from the cells.
    #[must_use]
    pub fn metrics(&self) -> MatrixMetrics {
        let n = self.classes.len();
        let position = |label: &str| self.classes.binary_search_by(|c| c.as_str().cmp(label)).ok();

        let mut true_positives = vec![0u64; n];
        let mut row_sums = vec![0u64; n];
        let mut col_sums = vec![0u64; n];

        for cell in &self.cells {
            let (Some(row), Some(col)) = (position(&cell.actual), position(&cell.predicted)) else {
                continue;
            };
            row_sums[row] += cell.count;
            col_sums[col] += cell.count;
            if row == col {
                true_positives[row] += cell.count;
            }
        }

        let total: u64 = row_sums.iter().sum();
        let correct: u64 = true_positives.iter().sum();

        MatrixMetrics {
            classes: self.classes.clone(),
            accuracy: ratio(correct, total),
            precision: (0..n).map(|i| ratio(true_positives[i], col_sums[i])).collect(),
            recall: (0..n).map(|i| ratio(true_positives[i], row_sums[i])).collect(),
            support: row_sums,
        }
    }
}

/// Metrics derived from a confusion matrix, indexed like its class set.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixMetrics {
    /// Class labels, sorted.
    pub classes: Vec<String>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Per-class precision.
    pub precision: Vec<f64>,
    /// Per-class recall.
    pub recall: Vec<f64>,
    /// Number of records per actual class.
    pub support: Vec<u64>,
}

impl MatrixMetrics {
    /// F1 score for each class.
    #[must_use]
    pub fn f1_scores(&self) -> Vec<f64> {
        self.precision
            .iter()
            .zip(&self.recall)
            .map(|(&p, &r)| if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 })
            .collect()
    }

    /// Unweighted mean of the per-class F1 scores.
    #[must_use]
    pub fn macro_f1(&self) -> f64 {
        let scores = self.f1_scores();
        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }
}

fn intensity(count: u64, max: u64) -> f32 {
    if max == 0 {
        0.0
    } else {
        (count as f64 / max as f64) as f32
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Coerce an `array_data` value to a non-negative count.
fn coerce_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f.trunc() as u64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite() && *f > 0.0).map(|f| f.trunc() as u64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::predictions::parse_predictions;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn record(actual: &str, predicted: &str) -> PredictionRecord {
        PredictionRecord {
            row_id: 0,
            fold: 0,
            repeat: 0,
            predicted: predicted.to_string(),
            actual: Some(actual.to_string()),
            confidence: None,
        }
    }

    fn array(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_dense_matrix_from_scenario() {
        // row 1 predicts "cat" for an actual "dog"
        let records =
            parse_predictions("% comment\n@DATA\n0,0,0,'cat','cat'\n1,0,0,'cat','dog'\n2,0,0,'cat','cat'\n");
        let matrix = ConfusionMatrix::from_predictions(&records);

        assert_eq!(matrix.classes(), ["cat", "dog"]);
        assert_eq!(matrix.layout(), MatrixLayout::Dense);
        let cells: Vec<(&str, &str, u64)> = matrix
            .cells()
            .iter()
            .map(|c| (c.actual.as_str(), c.predicted.as_str(), c.count))
            .collect();
        assert_eq!(
            cells,
            vec![("cat", "cat", 2), ("cat", "dog", 0), ("dog", "cat", 1), ("dog", "dog", 0)]
        );
    }

    #[test]
    fn test_empty_predictions_give_empty_matrix() {
        let matrix = ConfusionMatrix::from_predictions(&[]);
        assert!(matrix.is_empty());
        assert!(matrix.classes().is_empty());
        assert_eq!(matrix.max_count(), 0);
    }

    #[test]
    fn test_records_without_actual_contribute_nothing() {
        let records = parse_predictions("@data\n0,0,0,'x'\n1,0,0,'a','a'\n");
        let matrix = ConfusionMatrix::from_predictions(&records);
        assert_eq!(matrix.classes(), ["a"]);
        assert_eq!(matrix.total(), 1);
    }

    #[test]
    fn test_classes_are_sorted_lexicographically() {
        let records = vec![record("b", "10"), record("2", "a")];
        let matrix = ConfusionMatrix::from_predictions(&records);
        assert_eq!(matrix.classes(), ["10", "2", "a", "b"]);
        assert_eq!(matrix.cells().len(), 16);
    }

    #[test]
    fn test_sparse_matrix_from_array_data() {
        let data = array(json!({"cat,cat": 2, "dog,cat": 1}));
        let matrix = ConfusionMatrix::from_array_data(&data);

        assert_eq!(matrix.classes(), ["cat", "dog"]);
        assert_eq!(matrix.layout(), MatrixLayout::Sparse);
        assert_eq!(matrix.cells().len(), 2);
        assert_eq!(matrix.count("cat", "cat"), 2);
        assert_eq!(matrix.count("dog", "cat"), 1);
        assert_eq!(matrix.count("cat", "dog"), 0);
    }

    #[test]
    fn test_array_data_skips_malformed_keys() {
        let data = array(json!({"a,b,c": 5, "lonely": 3, " a , b ": "4", "b,a": "x"}));
        let matrix = ConfusionMatrix::from_array_data(&data);
        assert_eq!(matrix.cells().len(), 2);
        assert_eq!(matrix.count("a", "b"), 4);
        assert_eq!(matrix.count("b", "a"), 0);
    }

    #[test]
    fn test_array_data_merges_pairs_that_trim_equal() {
        let data = array(json!({"a,b": 1, "a , b": 2}));
        let matrix = ConfusionMatrix::from_array_data(&data);
        assert_eq!(matrix.cells().len(), 1);
        assert_eq!(matrix.count("a", "b"), 3);
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(&json!(3)), 3);
        assert_eq!(coerce_count(&json!(3.9)), 3);
        assert_eq!(coerce_count(&json!("12")), 12);
        assert_eq!(coerce_count(&json!(" 7.2 ")), 7);
        assert_eq!(coerce_count(&json!(-4)), 0);
        assert_eq!(coerce_count(&json!("nope")), 0);
        assert_eq!(coerce_count(&json!(null)), 0);
        assert_eq!(coerce_count(&json!([1])), 0);
    }

    #[test]
    fn test_densify_materializes_missing_pairs() {
        let data = array(json!({"cat,cat": 2, "dog,cat": 1}));
        let dense = ConfusionMatrix::from_array_data(&data).densify();

        assert_eq!(dense.layout(), MatrixLayout::Dense);
        assert_eq!(dense.cells().len(), 4);
        let records = vec![record("cat", "cat"), record("cat", "cat"), record("dog", "cat")];
        assert_eq!(dense, ConfusionMatrix::from_predictions(&records));
    }

    #[test]
    fn test_intensity_and_tint() {
        let records = vec![record("a", "a"), record("a", "a"), record("a", "b"), record("b", "b")];
        let matrix = ConfusionMatrix::from_predictions(&records);
        assert_eq!(matrix.max_count(), 2);

        let tints: Vec<CellTint> = matrix.tinted_cells().map(|(_, tint)| tint).collect();
        assert_eq!(tints[0], CellTint::Correct(1.0));
        assert_eq!(tints[1], CellTint::Incorrect(0.5));
        assert_eq!(tints[2], CellTint::None);
        assert_eq!(tints[3], CellTint::Correct(0.5));
    }

    #[test]
    fn test_metrics() {
        // a: 50 correct, 10 predicted as b; b: 5 predicted as a, 35 correct
        let mut records = Vec::new();
        records.extend(std::iter::repeat(record("a", "a")).take(50));
        records.extend(std::iter::repeat(record("a", "b")).take(10));
        records.extend(std::iter::repeat(record("b", "a")).take(5));
        records.extend(std::iter::repeat(record("b", "b")).take(35));

        let metrics = ConfusionMatrix::from_predictions(&records).metrics();
        assert_relative_eq!(metrics.accuracy, 0.85, epsilon = 1e-9);
        assert_relative_eq!(metrics.precision[0], 50.0 / 55.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.recall[0], 50.0 / 60.0, epsilon = 1e-9);
        assert_eq!(metrics.support, vec![60, 40]);

        let expected_f1 = 2.0 * (50.0 / 55.0) * (50.0 / 60.0) / ((50.0 / 55.0) + (50.0 / 60.0));
        assert_relative_eq!(metrics.f1_scores()[0], expected_f1, epsilon = 1e-9);
    }

    #[test]
    fn test_metrics_on_empty_matrix() {
        let metrics = ConfusionMatrix::default().metrics();
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.macro_f1(), 0.0);
    }

    #[test]
    fn test_sparse_and_dense_metrics_agree() {
        let data = array(json!({"a,a": 50, "a,b": 10, "b,a": 5, "b,b": 35}));
        let sparse = ConfusionMatrix::from_array_data(&data);
        assert_eq!(sparse.metrics(), sparse.densify().metrics());
    }
}
