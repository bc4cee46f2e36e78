//! Terminal output for matrices, distributions and metrics.
//!
//! Tables are plain text, optionally with ANSI 24-bit background colors
//! taken from each cell's [`CellTint`]. Empty inputs render an explicit
//! no-data line instead of an empty table.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use crate::color::{CellTint, Rgba};
use crate::eval::{ClassDistributionEntry, ConfusionMatrix, MatrixMetrics};

/// Message shown when a run has nothing to display.
pub const NO_DATA: &str = "no prediction data available";

/// Placeholder for pairs a sparse matrix does not contain.
const ABSENT: &str = "-";

/// Text renderer for analysis results.
#[derive(Debug, Clone)]
pub struct TerminalTable {
    ansi: bool,
    cell_width: usize,
    bar_width: usize,
}

impl Default for TerminalTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalTable {
    /// Create a renderer with ANSI colors enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { ansi: true, cell_width: 6, bar_width: 40 }
    }

    /// Enable or disable ANSI color codes.
    #[must_use]
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Set the minimum width of a matrix cell in characters.
    #[must_use]
    pub fn cell_width(mut self, width: usize) -> Self {
        self.cell_width = width.max(1);
        self
    }

    /// Set the width of the longest distribution bar in characters.
    #[must_use]
    pub fn bar_width(mut self, width: usize) -> Self {
        self.bar_width = width.max(1);
        self
    }

    /// Render a confusion matrix, actual classes down, predicted across.
    #[must_use]
    pub fn render_matrix(&self, matrix: &ConfusionMatrix) -> String {
        let classes = matrix.classes();
        if classes.is_empty() {
            return format!("{NO_DATA}\n");
        }

        let cells: HashMap<(&str, &str), (u64, CellTint)> = matrix
            .tinted_cells()
            .map(|(cell, tint)| ((cell.actual.as_str(), cell.predicted.as_str()), (cell.count, tint)))
            .collect();

        let label_width = classes.iter().map(|c| c.chars().count()).max().unwrap_or(0).max("actual".len());
        let width = classes
            .iter()
            .map(|c| c.chars().count())
            .chain(cells.values().map(|(count, _)| count.to_string().len()))
            .fold(self.cell_width, usize::max);

        let mut output = String::new();
        let _ = write!(output, "{:<label_width$}", "actual");
        for predicted in classes {
            let _ = write!(output, " {predicted:>width$}");
        }
        output.push('\n');

        for actual in classes {
            let _ = write!(output, "{actual:<label_width$}");
            for predicted in classes {
                output.push(' ');
                match cells.get(&(actual.as_str(), predicted.as_str())) {
                    Some((count, tint)) => self.push_cell(&mut output, &format!("{count:>width$}"), *tint),
                    None => {
                        let _ = write!(output, "{ABSENT:>width$}");
                    }
                }
            }
            output.push('\n');
        }
        output
    }

    /// Render per-class correct/incorrect bars in distribution order.
    #[must_use]
    pub fn render_distribution(&self, entries: &[ClassDistributionEntry]) -> String {
        if entries.is_empty() {
            return format!("{NO_DATA}\n");
        }

        let label_width = entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(0);
        let max_total = entries.iter().fold(0, |max, e| max.max(e.total())).max(1);

        let scale = |n: u64| ((n as f64 / max_total as f64) * self.bar_width as f64).round() as usize;

        let mut output = String::new();
        for entry in entries {
            let correct = scale(entry.correct);
            let incorrect = scale(entry.total()).saturating_sub(correct);

            let _ = write!(output, "{:<label_width$} ", entry.name);
            self.push_bar(&mut output, correct, '#', Rgba::CORRECT);
            self.push_bar(&mut output, incorrect, 'x', Rgba::INCORRECT);
            let pad = self.bar_width.saturating_sub(correct + incorrect);
            let _ = writeln!(output, "{:pad$} {} correct, {} incorrect", "", entry.correct, entry.incorrect);
        }
        output
    }

    /// Render accuracy and per-class precision/recall/F1.
    #[must_use]
    pub fn render_metrics(&self, metrics: &MatrixMetrics) -> String {
        if metrics.classes.is_empty() {
            return format!("{NO_DATA}\n");
        }

        let label_width = metrics.classes.iter().map(|c| c.chars().count()).max().unwrap_or(0).max(5);
        let f1 = metrics.f1_scores();

        let mut output = String::new();
        let _ = writeln!(output, "accuracy {:.4}  macro-F1 {:.4}", metrics.accuracy, metrics.macro_f1());
        let _ = writeln!(
            output,
            "{:<label_width$} {:>9} {:>9} {:>9} {:>9}",
            "class", "precision", "recall", "f1", "support"
        );
        for (i, class) in metrics.classes.iter().enumerate() {
            let _ = writeln!(
                output,
                "{class:<label_width$} {:>9.4} {:>9.4} {:>9.4} {:>9}",
                metrics.precision[i], metrics.recall[i], f1[i], metrics.support[i]
            );
        }
        output
    }

    fn push_cell(&self, output: &mut String, text: &str, tint: CellTint) {
        if self.ansi && tint != CellTint::None {
            let bg = tint.color();
            let fg = tint.text_color();
            let _ = write!(
                output,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{text}\x1b[0m",
                fg.r, fg.g, fg.b, bg.r, bg.g, bg.b
            );
        } else {
            output.push_str(text);
        }
    }

    fn push_bar(&self, output: &mut String, len: usize, plain: char, color: Rgba) {
        if len == 0 {
            return;
        }
        if self.ansi {
            let _ = write!(output, "\x1b[38;2;{};{};{}m{}\x1b[0m", color.r, color.g, color.b, "█".repeat(len));
        } else {
            output.extend(std::iter::repeat(plain).take(len));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{class_distribution, parse_predictions};
    use serde_json::{json, Value};

    fn scenario() -> ConfusionMatrix {
        let records = parse_predictions("@data\n0,0,0,'cat','cat'\n1,0,0,'cat','dog'\n2,0,0,'cat','cat'\n");
        ConfusionMatrix::from_predictions(&records)
    }

    #[test]
    fn test_plain_matrix_layout() {
        let output = TerminalTable::new().ansi(false).cell_width(3).render_matrix(&scenario());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "actual cat dog");
        assert_eq!(lines[1], "cat      2   0");
        assert_eq!(lines[2], "dog      1   0");
    }

    #[test]
    fn test_ansi_matrix_tints_nonzero_cells_only() {
        let output = TerminalTable::new().render_matrix(&scenario());
        assert_eq!(output.matches("\x1b[48;2;").count(), 2);
        assert!(output.contains("\x1b[0m"));
    }

    #[test]
    fn test_sparse_matrix_marks_absent_pairs() {
        let Value::Object(data) = json!({"cat,cat": 2, "dog,cat": 1}) else { unreachable!() };
        let matrix = ConfusionMatrix::from_array_data(&data);
        let output = TerminalTable::new().ansi(false).cell_width(3).render_matrix(&matrix);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "cat      2   -");
        assert_eq!(lines[2], "dog      1   -");
    }

    #[test]
    fn test_empty_inputs_render_no_data() {
        let table = TerminalTable::new();
        assert_eq!(table.render_matrix(&ConfusionMatrix::default()).trim(), NO_DATA);
        assert_eq!(table.render_distribution(&[]).trim(), NO_DATA);
        assert_eq!(table.render_metrics(&ConfusionMatrix::default().metrics()).trim(), NO_DATA);
    }

    #[test]
    fn test_plain_distribution_bars() {
        let records = parse_predictions("@data\n0,0,0,'a','a'\n1,0,0,'b','a'\n2,0,0,'b','b'\n");
        let output = TerminalTable::new().ansi(false).bar_width(4).render_distribution(&class_distribution(&records));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "a ##xx 1 correct, 1 incorrect");
        assert_eq!(lines[1], "b ##   1 correct, 0 incorrect");
    }

    #[test]
    fn test_metrics_table() {
        let output = TerminalTable::new().render_metrics(&scenario().metrics());
        assert!(output.starts_with("accuracy 0.6667"), "{output}");
        assert!(output.contains("precision"));
        assert_eq!(output.lines().count(), 4);
    }
}
