use std::sync::Arc;

use categorizer::{
    classifier::{Classifier, Taxonomy},
    pipeline::{CategorizePipelineConfig, run_categorize},
    sanitizer::FieldSanitizer,
};
use serde_json::json;

use crate::support::{ScriptedPort, TempDir, read_json};

fn config(dir: &TempDir, document: &str) -> CategorizePipelineConfig {
    CategorizePipelineConfig {
        input: dir.write("Data/mc-s.json", document),
        output: dir.path().join("New Data2").join("mc-s.json"),
        indent: 4,
        taxonomy: "body-systems".to_string(),
    }
}

#[tokio::test]
async fn failed_service_call_still_yields_a_sanitized_categorized_record() {
    let dir = TempDir::new("categorize-e2e");
    let config = config(
        &dir,
        r#"{"data":[{"Data":{"Description":"Patient has chronic joint inflammation.","MaladyId":"x"}}]}"#,
    );
    let classifier = Classifier::new(Arc::new(ScriptedPort::failing()), Taxonomy::body_systems());

    let report = run_categorize(&config, &FieldSanitizer::default(), &classifier).await;

    assert_eq!(report.records_processed, 1);
    assert_eq!(report.sentinel_fallbacks, 1);
    let output = read_json(&config.output);
    assert_eq!(
        output,
        json!({"data": [{"Data": {
            "Description": "Patient has chronic joint inflammation.",
            "Slug": "",
            "Category": "Unknown"
        }}]})
    );
}

#[tokio::test]
async fn every_record_is_classified_in_order() {
    let dir = TempDir::new("categorize-order");
    let config = config(
        &dir,
        r#"{"data":[
            {"Data":{"Description":"Progressive loss of memory and cognition.","TitleCaseName":"Alzheimer Disease"}},
            {"Data":{"Description":"short"}},
            {"Data":{}},
            {"Data":{"Description":"Uncontrolled growth of abnormal cells in the lung."}},
            {"Data":{"Description":"Something the model cannot place at all."}},
            "not a record"
        ]}"#,
    );
    let port = ScriptedPort::replying(&[
        "Neurological Disorder",
        "\"Cancer\" (lung)",
        "No idea.",
    ]);
    let classifier = Classifier::new(Arc::new(port.clone()), Taxonomy::body_systems());

    let report = run_categorize(&config, &FieldSanitizer::default(), &classifier).await;

    let output = read_json(&config.output);
    let categories = output["data"]
        .as_array()
        .expect("data list")
        .iter()
        .map(|record| record["Data"]["Category"].clone())
        .collect::<Vec<_>>();
    assert_eq!(
        categories,
        vec![
            json!("Neurological Disorder"),
            json!("Unknown"),
            json!("Unknown"),
            json!("Cancer"),
            json!("Other"),
            serde_json::Value::Null,
        ]
    );
    assert_eq!(output["data"][5], json!("not a record"));
    assert_eq!(report.records_processed, 5);
    assert_eq!(report.categories.get("Unknown"), Some(&2));

    let prompts = port.prompts();
    assert_eq!(prompts.len(), 3, "short and empty descriptions skip the service");
    assert!(prompts[0].contains("Progressive loss of memory and cognition."));
}

#[tokio::test]
async fn document_without_data_list_writes_nothing() {
    let dir = TempDir::new("categorize-shape");
    let config = config(&dir, r#"{"data": "nope"}"#);
    let port = ScriptedPort::replying(&["Cancer"]);
    let classifier = Classifier::new(Arc::new(port.clone()), Taxonomy::body_systems());

    let report = run_categorize(&config, &FieldSanitizer::default(), &classifier).await;

    assert_eq!(report.files_skipped, 1);
    assert!(!config.output.exists());
    assert!(port.prompts().is_empty());
}
