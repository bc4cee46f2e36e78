//! Run descriptions as served by the catalog's REST API.
//!
//! Only the fields the analysis needs are modelled. The API encodes numeric
//! ids as strings and collapses single-element lists into plain objects, so
//! both shapes are accepted.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Name of the output file holding per-row predictions.
pub const PREDICTIONS_FILE: &str = "predictions";

/// Name of the evaluation entry holding an aggregated confusion matrix.
pub const CONFUSION_MATRIX_EVALUATION: &str = "confusion_matrix";

/// Envelope of `GET /run/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunEnvelope {
    /// The run itself.
    pub run: RunDescription,
}

/// One recorded execution of a flow against a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunDescription {
    /// Run identifier.
    #[serde(deserialize_with = "de_id")]
    pub run_id: u64,
    /// Task the run was evaluated on.
    #[serde(default, deserialize_with = "de_opt_id")]
    pub task_id: Option<u64>,
    /// Flow (pipeline) that produced the run.
    #[serde(default, deserialize_with = "de_opt_id")]
    pub flow_id: Option<u64>,
    /// Flow name as embedded in the run, when present.
    #[serde(default)]
    pub flow_name: Option<String>,
    /// Input dataset reference.
    #[serde(default)]
    pub input_data: InputData,
    /// Files and evaluations produced by the run.
    #[serde(default)]
    pub output_data: OutputData,
}

/// Input side of a run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputData {
    /// Datasets the run consumed.
    #[serde(default, deserialize_with = "one_or_many")]
    pub dataset: Vec<DatasetRef>,
}

/// Dataset reference inside a run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetRef {
    /// Dataset id.
    #[serde(default, deserialize_with = "de_opt_id")]
    pub did: Option<u64>,
    /// Dataset name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Output side of a run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputData {
    /// Uploaded files.
    #[serde(default, deserialize_with = "one_or_many")]
    pub file: Vec<OutputFile>,
    /// Server-side evaluation measures.
    #[serde(default, deserialize_with = "one_or_many")]
    pub evaluation: Vec<Evaluation>,
}

/// A file attached to a run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputFile {
    /// Logical file name (`description`, `predictions`, ...).
    pub name: String,
    /// Download URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Storage id.
    #[serde(default, deserialize_with = "de_opt_id")]
    pub file_id: Option<u64>,
}

/// One evaluation measure of a run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Evaluation {
    /// Measure name.
    pub name: String,
    /// Scalar value, when the measure has one.
    #[serde(default)]
    pub value: Option<Value>,
    /// Per-class or per-pair breakdown.
    #[serde(default)]
    pub array_data: Option<Value>,
}

impl RunDescription {
    /// Download URL of the predictions file, if the run has one.
    #[must_use]
    pub fn predictions_url(&self) -> Option<&str> {
        self.output_data
            .file
            .iter()
            .find(|file| file.name == PREDICTIONS_FILE)
            .and_then(|file| file.url.as_deref())
    }

    /// The `array_data` object of the `confusion_matrix` evaluation.
    ///
    /// Entries whose `array_data` is not a JSON object are ignored.
    #[must_use]
    pub fn confusion_array(&self) -> Option<&Map<String, Value>> {
        self.output_data
            .evaluation
            .iter()
            .filter(|evaluation| evaluation.name == CONFUSION_MATRIX_EVALUATION)
            .find_map(|evaluation| evaluation.array_data.as_ref()?.as_object())
    }

    /// First input dataset id.
    #[must_use]
    pub fn dataset_id(&self) -> Option<u64> {
        self.input_data.dataset.iter().find_map(|dataset| dataset.did)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(u64),
    Text(String),
}

fn parse_id<E: serde::de::Error>(repr: IdRepr) -> Result<u64, E> {
    match repr {
        IdRepr::Number(n) => Ok(n),
        IdRepr::Text(s) => s.trim().parse().map_err(E::custom),
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    parse_id(IdRepr::deserialize(deserializer)?)
}

/// Optional ids tolerate placeholders such as `"-1"` by mapping them to `None`.
fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(Option::<IdRepr>::deserialize(deserializer)?
        .and_then(|repr| parse_id::<serde::de::value::Error>(repr).ok()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}
