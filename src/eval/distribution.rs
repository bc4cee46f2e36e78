//! Per-class correct/incorrect counts for bar-chart views.

use indexmap::IndexMap;

use super::predictions::PredictionRecord;

/// Correct and incorrect prediction counts for one actual class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDistributionEntry {
    /// Actual class label.
    pub name: String,
    /// Records predicted as this class.
    pub correct: u64,
    /// Records predicted as any other class.
    pub incorrect: u64,
}

impl ClassDistributionEntry {
    /// Total records of this actual class.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.correct + self.incorrect
    }
}

/// Group records by actual label, in order of first appearance.
///
/// Records without a ground-truth label are skipped. An empty result means
/// there is nothing to chart.
#[must_use]
pub fn class_distribution(records: &[PredictionRecord]) -> Vec<ClassDistributionEntry> {
    let mut groups: IndexMap<&str, (u64, u64)> = IndexMap::new();

    for (actual, predicted) in records.iter().filter_map(PredictionRecord::labels) {
        let (correct, incorrect) = groups.entry(actual).or_insert((0, 0));
        if predicted == actual {
            *correct += 1;
        } else {
            *incorrect += 1;
        }
    }

    groups
        .into_iter()
        .map(|(name, (correct, incorrect))| ClassDistributionEntry {
            name: name.to_string(),
            correct,
            incorrect,
        })
        .collect()
}
