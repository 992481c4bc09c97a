use categorizer::{
    pipeline::{SanitizePipelineConfig, run_sanitize},
    sanitizer::FieldSanitizer,
};
use serde_json::json;

use crate::support::{TempDir, read_json};

#[test]
fn sanitize_pipeline_strips_every_record_and_keeps_other_keys() {
    let dir = TempDir::new("sanitize");
    let input = dir.write(
        "Data/mc-x.json",
        r#"{
  "total": 2,
  "data": [
    {"Id": 1, "Data": {"MaladyId": "a", "Symbol": "s", "Description": "first", "Slug": "one"}},
    {"Id": 2, "Data": {"Score": 1.5, "Childs": [], "Description": "second"}},
    {"Id": 3}
  ]
}"#,
    );
    let output = dir.path().join("New Data").join("mc-x.json");
    let config = SanitizePipelineConfig {
        input,
        output: output.clone(),
        indent: 4,
    };

    let report = run_sanitize(&config, &FieldSanitizer::default());

    assert_eq!(report.records_processed, 3);
    assert_eq!(report.keys_removed, 4);
    assert_eq!(report.written, vec![output.clone()]);
    assert_eq!(
        read_json(&output),
        json!({
            "total": 2,
            "data": [
                {"Id": 1, "Data": {"Description": "first", "Slug": "one"}},
                {"Id": 2, "Data": {"Description": "second", "Slug": ""}},
                {"Id": 3}
            ]
        })
    );
    let text = std::fs::read_to_string(&output).expect("output should exist");
    assert!(text.starts_with("{\n    \"total\": 2,"), "unexpected layout: {text}");
}

#[test]
fn document_without_data_list_is_skipped_and_nothing_is_written() {
    let dir = TempDir::new("sanitize-shape");
    let input = dir.write("Data/mc-x.json", r#"{"items": []}"#);
    let output = dir.path().join("out.json");
    let config = SanitizePipelineConfig {
        input,
        output: output.clone(),
        indent: 4,
    };

    let report = run_sanitize(&config, &FieldSanitizer::default());

    assert_eq!(report.files_skipped, 1);
    assert!(report.written.is_empty());
    assert!(!output.exists());
}

#[test]
fn missing_input_file_is_skipped() {
    let dir = TempDir::new("sanitize-missing");
    let output = dir.path().join("out.json");
    let config = SanitizePipelineConfig {
        input: dir.path().join("absent.json"),
        output: output.clone(),
        indent: 4,
    };

    let report = run_sanitize(&config, &FieldSanitizer::default());

    assert_eq!(report.files_skipped, 1);
    assert!(!output.exists());
}

#[test]
fn unwritable_output_is_counted_not_fatal() {
    let dir = TempDir::new("sanitize-unwritable");
    let input = dir.write(
        "Data/mc-x.json",
        r#"{"data":[{"Data":{"MaladyId":1,"Description":"kept"}}]}"#,
    );
    let output = dir.path().join("occupied");
    std::fs::create_dir_all(&output).expect("output dir should be created");
    let config = SanitizePipelineConfig {
        input,
        output: output.clone(),
        indent: 4,
    };

    let report = run_sanitize(&config, &FieldSanitizer::default());

    assert_eq!(report.records_processed, 1);
    assert_eq!(report.write_failures, 1);
    assert!(report.written.is_empty());
    assert!(output.is_dir(), "existing directory must be left in place");
}
