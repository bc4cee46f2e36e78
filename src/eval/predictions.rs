//! Lenient parsing of ARFF-style prediction exports.
//!
//! A prediction export has an optional preamble (`@relation`, `@attribute`,
//! `%` comments), a case-insensitive `@data` marker, and comma-separated rows
//! of at least `row_id, fold, repeat, predicted[, actual, ...]`.
//!
//! Parsing never fails. Rows with fewer than four fields are dropped, numeric
//! fields that do not parse become `0`, and a file without a `@data` marker
//! simply yields no records.

use std::collections::BTreeMap;

/// Minimum number of comma-separated fields for a row to become a record.
const MIN_FIELDS: usize = 4;

/// Attribute-name prefix for per-class probability columns.
const CONFIDENCE_PREFIX: &str = "confidence.";

/// One row of a model's held-out evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    /// Original dataset row index.
    pub row_id: i64,
    /// Cross-validation fold number.
    pub fold: i64,
    /// Repetition index for repeated cross-validation.
    pub repeat: i64,
    /// Label the model output.
    pub predicted: String,
    /// Ground-truth label. `None` when the row stops after the prediction.
    pub actual: Option<String>,
    /// Per-class probabilities, when the header declares `confidence.*` columns.
    pub confidence: Option<BTreeMap<String, f64>>,
}

impl PredictionRecord {
    /// Ground-truth label paired with the prediction, if the row has one.
    #[must_use]
    pub fn labels(&self) -> Option<(&str, &str)> {
        self.actual.as_deref().map(|actual| (actual, self.predicted.as_str()))
    }

    /// Whether the prediction matches the ground truth.
    ///
    /// Rows without a ground-truth label are never correct.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.actual.as_deref() == Some(self.predicted.as_str())
    }
}

/// Parse the text of a prediction export into records, in file order.
///
/// Confidence columns are not extracted; see [`PredictionFile::parse`].
#[must_use]
pub fn parse_predictions(text: &str) -> Vec<PredictionRecord> {
    data_rows(text).filter_map(|line| parse_row(line, &[])).collect()
}

/// A prediction export together with its declared header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionFile {
    /// Name from the `@relation` line, if present.
    pub relation: Option<String>,
    /// Attribute names from the `@attribute` lines, in column order.
    pub attributes: Vec<String>,
    /// Parsed records.
    pub records: Vec<PredictionRecord>,
}

impl PredictionFile {
    /// Parse a prediction export, reading the header for confidence columns.
    ///
    /// Every attribute named `confidence.<label>` maps its column to `<label>`.
    /// Records get a `confidence` map only when at least one such column exists.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut relation = None;
        let mut attributes = Vec::new();

        for line in text.lines().map(str::trim) {
            if is_data_marker(line) {
                break;
            }
            if let Some(rest) = strip_keyword(line, "@relation") {
                relation = Some(unquote(rest));
            } else if let Some(rest) = strip_keyword(line, "@attribute") {
                if let Some(name) = attribute_name(rest) {
                    attributes.push(name);
                }
            }
        }

        let confidence_columns: Vec<(usize, String)> = attributes
            .iter()
            .enumerate()
            .filter_map(|(column, name)| {
                name.strip_prefix(CONFIDENCE_PREFIX).map(|label| (column, label.to_string()))
            })
            .collect();

        let records =
            data_rows(text).filter_map(|line| parse_row(line, &confidence_columns)).collect();

        Self { relation, attributes, records }
    }

    /// Whether any data row was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lines after the `@data` marker that may carry a record.
fn data_rows(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .skip_while(|line| !is_data_marker(line))
        .skip(1)
        .filter(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('%')
        })
}

fn is_data_marker(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("@data")
}

fn parse_row(line: &str, confidence_columns: &[(usize, String)]) -> Option<PredictionRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let confidence = (!confidence_columns.is_empty()).then(|| {
        confidence_columns
            .iter()
            .filter_map(|(column, label)| {
                let value = fields.get(*column)?.trim().parse::<f64>().ok()?;
                Some((label.clone(), value))
            })
            .collect()
    });

    Some(PredictionRecord {
        row_id: parse_int(fields[0]),
        fold: parse_int(fields[1]),
        repeat: parse_int(fields[2]),
        predicted: clean_label(fields[3]),
        actual: fields.get(4).map(|field| clean_label(field)),
        confidence,
    })
}

/// Integer field with a leading-digits fallback, `0` when nothing parses.
fn parse_int(field: &str) -> i64 {
    let field = field.trim();
    if let Ok(value) = field.parse() {
        return value;
    }
    let sign_len = usize::from(field.starts_with(['-', '+']));
    let digits = field[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    field[..sign_len + digits].parse().unwrap_or(0)
}

fn clean_label(field: &str) -> String {
    field.replace('\'', "").trim().to_string()
}

fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

/// Attribute name, honoring single- or double-quoted names with spaces.
fn attribute_name(rest: &str) -> Option<String> {
    let rest = rest.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"');
    let name = match quote {
        Some(q) => rest[1..].split(q).next()?,
        None => rest.split_whitespace().next()?,
    };
    (!name.is_empty()).then(|| name.to_string())
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches(|c| c == '\'' || c == '"').to_string()
}
