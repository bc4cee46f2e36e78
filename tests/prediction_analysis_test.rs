//! Prediction Analysis Tests
//!
//! End-to-end checks from prediction text or run JSON to matrices,
//! distributions and rendered output, through the public API only.
//!
//! Run: cargo test --test prediction_analysis_test

#![allow(clippy::unwrap_used)]

use evalview::api::{EntityKind, MatrixSource, NameCache, RunAnalyzer, RunEnvelope, StaticRunSource};
use evalview::eval::{class_distribution, parse_predictions, ConfusionMatrix, MatrixLayout, PredictionFile};
use evalview::output::{PngEncoder, TerminalTable, NO_DATA};
use evalview::plots::ConfusionHeatmap;
use serde_json::{json, Map, Value};

const PREDICTIONS_URL: &str = "https://files.example.org/predictions.arff";

// Field order is row_id, fold, repeat, predicted, actual.
// Row 1 is a "dog" that was predicted as "cat".
const SCENARIO: &str = "% comment\n@DATA\n0,0,0,'cat','cat'\n1,0,0,'cat','dog'\n2,0,0,'cat','cat'\n";

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn run_json(with_predictions: bool) -> Value {
    let files = if with_predictions {
        json!([
            {"name": "description", "url": "https://files.example.org/description.xml", "file_id": "11"},
            {"name": "predictions", "url": PREDICTIONS_URL, "file_id": "12"}
        ])
    } else {
        json!({"name": "description", "url": "https://files.example.org/description.xml"})
    };
    json!({
        "run": {
            "run_id": "42",
            "task_id": "7",
            "flow_id": "99",
            "input_data": {"dataset": {"did": "61", "name": "iris"}},
            "output_data": {
                "file": files,
                "evaluation": [
                    {"name": "area_under_roc_curve", "value": "0.97"},
                    {"name": "confusion_matrix", "array_data": {"cat,cat": 2, "dog,cat": 1}}
                ]
            }
        }
    })
}

fn analyzer(with_predictions: bool, text: &str) -> RunAnalyzer<StaticRunSource> {
    let envelope: RunEnvelope = serde_json::from_value(run_json(with_predictions)).unwrap();
    let source = StaticRunSource::new()
        .with_run(envelope.run)
        .with_file(PREDICTIONS_URL, text)
        .with_name(EntityKind::Flow, 99, "sklearn.pipeline.Pipeline");
    RunAnalyzer::new(source, NameCache::new(8))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_dense_matrix_from_predictions() {
    let records = parse_predictions(SCENARIO);
    assert_eq!(records.len(), 3);

    let matrix = ConfusionMatrix::from_predictions(&records);
    assert_eq!(matrix.classes(), ["cat", "dog"]);
    assert_eq!(matrix.cells().len(), 4);
    assert_eq!(matrix.count("cat", "cat"), 2);
    assert_eq!(matrix.count("cat", "dog"), 0);
    assert_eq!(matrix.count("dog", "cat"), 1);
    assert_eq!(matrix.count("dog", "dog"), 0);
}

#[test]
fn scenario_missing_marker_means_no_data() {
    let records = parse_predictions("0,0,0,'cat','cat'\n1,0,0,'dog','dog'\n");
    assert!(records.is_empty());

    let matrix = ConfusionMatrix::from_predictions(&records);
    assert_eq!(TerminalTable::new().render_matrix(&matrix).trim(), NO_DATA);
}

#[test]
fn scenario_row_without_actual_contributes_nothing() {
    let records = parse_predictions("@data\n0,0,0,'x'\n");
    assert!(ConfusionMatrix::from_predictions(&records).is_empty());
    assert!(class_distribution(&records).is_empty());
}

#[test]
fn scenario_sparse_matrix_from_array_data() {
    let matrix = ConfusionMatrix::from_array_data(&object(json!({"cat,cat": 2, "dog,cat": 1})));
    assert_eq!(matrix.classes(), ["cat", "dog"]);
    assert_eq!(matrix.layout(), MatrixLayout::Sparse);
    assert_eq!(matrix.cells().len(), 2);
}

#[test]
fn scenario_distribution_in_first_seen_order() {
    let entries = class_distribution(&parse_predictions(SCENARIO));
    let summary: Vec<(&str, u64, u64)> =
        entries.iter().map(|e| (e.name.as_str(), e.correct, e.incorrect)).collect();
    assert_eq!(summary, vec![("cat", 2, 0), ("dog", 0, 1)]);
}

#[test]
fn literal_dog_cat_row_reads_predicted_first() {
    // `1,0,0,'dog','cat'` is an actual "cat" that was predicted as "dog"
    let records = parse_predictions("@data\n0,0,0,'cat','cat'\n1,0,0,'dog','cat'\n2,0,0,'cat','cat'\n");
    let matrix = ConfusionMatrix::from_predictions(&records);

    assert_eq!(matrix.count("cat", "dog"), 1);
    assert_eq!(matrix.count("dog", "cat"), 0);
    let summary: Vec<(String, u64, u64)> =
        class_distribution(&records).into_iter().map(|e| (e.name, e.correct, e.incorrect)).collect();
    assert_eq!(summary, vec![("cat".to_string(), 2, 1)]);
}

// ============================================================================
// Invariants across paths
// ============================================================================

#[test]
fn parsing_is_idempotent() {
    assert_eq!(parse_predictions(SCENARIO), parse_predictions(SCENARIO));
}

#[test]
fn marker_case_is_ignored() {
    for marker in ["@data", "@DATA", "@Data", "   @data  "] {
        let text = format!("@relation r\n{marker}\n0,0,0,'a','a'\n");
        assert_eq!(parse_predictions(&text).len(), 1, "{marker:?}");
    }
}

#[test]
fn densified_array_matches_prediction_matrix() {
    let dense = ConfusionMatrix::from_predictions(&parse_predictions(SCENARIO));
    let sparse = ConfusionMatrix::from_array_data(&object(json!({"cat,cat": 2, "dog,cat": 1})));
    assert_eq!(sparse.densify(), dense);
}

#[test]
fn header_aware_parse_agrees_with_lenient_parse() {
    let text = "@relation predictions\n\
                @attribute row_id numeric\n\
                @attribute fold numeric\n\
                @attribute repeat numeric\n\
                @attribute prediction {cat,dog}\n\
                @attribute correct {cat,dog}\n\
                @attribute confidence.cat numeric\n\
                @attribute confidence.dog numeric\n\
                @data\n\
                0,0,0,'cat','cat',0.9,0.1\n\
                1,0,0,'cat','dog',0.6,0.4\n";
    let file = PredictionFile::parse(text);
    let lenient = parse_predictions(text);

    assert_eq!(file.records.len(), lenient.len());
    assert_eq!(
        ConfusionMatrix::from_predictions(&file.records),
        ConfusionMatrix::from_predictions(&lenient)
    );
    let confidence = file.records[1].confidence.as_ref().unwrap();
    assert_eq!(confidence.get("dog"), Some(&0.4));
}

// ============================================================================
// Analyzer
// ============================================================================

#[test]
fn analyzer_prefers_predictions_file() {
    let analysis = analyzer(true, SCENARIO).analyze(42).unwrap();
    assert_eq!(analysis.source, MatrixSource::Predictions);
    assert_eq!(analysis.matrix.layout(), MatrixLayout::Dense);
    assert_eq!(analysis.records.len(), 3);
    assert_eq!(analysis.distribution.len(), 2);
    assert_eq!(analysis.run.dataset_id(), Some(61));
}

#[test]
fn analyzer_falls_back_when_predictions_are_empty() {
    let analysis = analyzer(true, "@relation empty\n@data\n").analyze(42).unwrap();
    assert_eq!(analysis.source, MatrixSource::EvaluationArray);
    assert_eq!(analysis.matrix.cells().len(), 2);
    assert!(analysis.distribution.is_empty());
    assert!(!analysis.is_empty());
}

#[test]
fn analyzer_uses_array_without_predictions_file() {
    let analysis = analyzer(false, SCENARIO).analyze(42).unwrap();
    assert_eq!(analysis.source, MatrixSource::EvaluationArray);
    assert!(analysis.records.is_empty());
}

#[test]
fn analyzer_reports_unknown_run() {
    assert!(analyzer(true, SCENARIO).analyze(7).is_err());
}

#[test]
fn analyzer_caches_flow_names() {
    let mut analyzer = analyzer(true, SCENARIO);
    assert_eq!(analyzer.flow_name(99).unwrap().as_deref(), Some("sklearn.pipeline.Pipeline"));
    assert_eq!(analyzer.names_mut().len(), 1);
    assert_eq!(analyzer.flow_name(5).unwrap(), None);
    assert_eq!(analyzer.names_mut().len(), 1);
}

#[test]
fn superseded_request_is_discarded() {
    let analyzer = analyzer(true, SCENARIO);
    let first = analyzer.begin(42);
    let second = analyzer.begin(42);

    assert!(analyzer.analyze_latest(&first).unwrap().is_none());
    let fresh = analyzer.analyze_latest(&second).unwrap().unwrap();
    assert_eq!(fresh.source, MatrixSource::Predictions);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn heatmap_png_roundtrip_to_disk() {
    let matrix = ConfusionMatrix::from_predictions(&parse_predictions(SCENARIO));
    let fb = ConfusionHeatmap::new(&matrix).cell_size(8).build().unwrap().to_framebuffer().unwrap();
    assert_eq!((fb.width(), fb.height()), (48, 48));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.png");
    PngEncoder::write_to_file(&fb, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}
