use std::sync::Arc;

use categorizer::{
    classifier::{Classifier, Taxonomy},
    error::PipelineError,
    pipeline::{RoutePipelineConfig, run_route},
    sanitizer::FieldSanitizer,
};

use crate::support::{ScriptedPort, TempDir, read_json};

fn route_config(dir: &TempDir) -> RoutePipelineConfig {
    RoutePipelineConfig {
        input_dir: dir.path().join("New Data"),
        output_dir: dir.path().join("Categorized-Diseases"),
        indent: 2,
        taxonomy: "clinical-groups".to_string(),
        sanitize: false,
        create_input_dir: true,
    }
}

#[tokio::test]
async fn documents_land_in_their_category_folder() {
    let dir = TempDir::new("route");
    let config = route_config(&dir);
    dir.write(
        "New Data/asthma.json",
        r#"{"data":[{"Data":{"TitleCaseName":"Asthma","Description":"Chronic inflammation of the airways.","Score":3}}]}"#,
    );
    dir.write(
        "New Data/gerd.json",
        r#"{"data":[{"Data":{"TitleCaseName":"Gerd","Description":"Stomach acid repeatedly flows back into the esophagus."}}]}"#,
    );
    dir.write("New Data/broken.json", "{\"data\": [");
    dir.write("New Data/notes.txt", "ignored");

    let port = ScriptedPort::replying(&["respiratory diseases", "Digestive Diseases."]);
    let classifier = Classifier::new(Arc::new(port.clone()), Taxonomy::clinical_groups());

    let report = run_route(&config, &FieldSanitizer::default(), &classifier)
        .await
        .expect("route should run");

    assert_eq!(report.files_seen, 3);
    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.written.len(), 2);

    let asthma = config
        .output_dir
        .join("Respiratory Diseases")
        .join("asthma.json");
    let routed = read_json(&asthma);
    assert_eq!(routed["data"][0]["Data"]["Score"], 3, "route leaves records unsanitized");
    assert!(
        config
            .output_dir
            .join("Digestive Diseases")
            .join("gerd.json")
            .is_file()
    );

    let text = std::fs::read_to_string(&asthma).expect("routed file should exist");
    assert!(text.starts_with("{\n  \"data\": ["), "unexpected layout: {text}");

    let prompts = port.prompts();
    assert!(prompts[0].contains("Chronic inflammation of the airways."));
}

#[tokio::test]
async fn open_set_route_uses_cleaned_free_form_labels_and_sanitizes() {
    let dir = TempDir::new("route-open");
    let mut config = route_config(&dir);
    config.sanitize = true;
    config.taxonomy = "open-set".to_string();
    dir.write(
        "New Data/lupus.json",
        r#"{"data":[{"Data":{"TitleCaseName":"Lupus","Description":"Immune system attacks its own tissues.","MaladyId":9}}]}"#,
    );
    dir.write("New Data/empty.json", r#"{"data":[]}"#);

    let port = ScriptedPort::replying(&["\"Autoimmune Diseases!\""]);
    let classifier = Classifier::new(Arc::new(port.clone()), Taxonomy::open_set());

    let report = run_route(&config, &FieldSanitizer::default(), &classifier)
        .await
        .expect("route should run");

    let lupus = config
        .output_dir
        .join("Autoimmune_Diseases")
        .join("lupus.json");
    let routed = read_json(&lupus);
    assert!(routed["data"][0]["Data"].get("MaladyId").is_none());
    assert_eq!(routed["data"][0]["Data"]["Slug"], "");
    assert!(
        config
            .output_dir
            .join("Unclassified")
            .join("empty.json")
            .is_file()
    );
    assert_eq!(report.keys_removed, 1);
    assert_eq!(port.prompts().len(), 1);
    assert!(port.prompts()[0].contains("Disease Name: Lupus"));
}

#[tokio::test]
async fn blocked_category_folder_is_counted_and_the_run_continues() {
    let dir = TempDir::new("route-blocked");
    let config = route_config(&dir);
    dir.write(
        "New Data/asthma.json",
        r#"{"data":[{"Data":{"TitleCaseName":"Asthma","Description":"Chronic inflammation of the airways."}}]}"#,
    );
    dir.write(
        "New Data/gerd.json",
        r#"{"data":[{"Data":{"TitleCaseName":"Gerd","Description":"Stomach acid repeatedly flows back into the esophagus."}}]}"#,
    );
    dir.write("Categorized-Diseases/Respiratory Diseases", "not a folder");

    let port = ScriptedPort::replying(&["Respiratory Diseases", "Digestive Diseases"]);
    let classifier = Classifier::new(Arc::new(port), Taxonomy::clinical_groups());

    let report = run_route(&config, &FieldSanitizer::default(), &classifier)
        .await
        .expect("write failures are not fatal");

    assert_eq!(report.files_seen, 2);
    assert_eq!(report.records_processed, 2);
    assert_eq!(report.write_failures, 1);
    let gerd = config
        .output_dir
        .join("Digestive Diseases")
        .join("gerd.json");
    assert_eq!(report.written, vec![gerd.clone()]);
    assert!(gerd.is_file());
    assert!(config.output_dir.join("Respiratory Diseases").is_file());
}

#[tokio::test]
async fn missing_input_folder_is_created_or_fatal() {
    let dir = TempDir::new("route-missing");
    let mut config = route_config(&dir);
    let classifier =
        Classifier::new(Arc::new(ScriptedPort::default()), Taxonomy::clinical_groups());

    let report = run_route(&config, &FieldSanitizer::default(), &classifier)
        .await
        .expect("missing input folder is created");
    assert_eq!(report.files_seen, 0);
    assert!(config.input_dir.is_dir());
    assert!(config.output_dir.is_dir());

    config.input_dir = dir.path().join("absent");
    config.create_input_dir = false;
    let err = run_route(&config, &FieldSanitizer::default(), &classifier)
        .await
        .expect_err("strict mode needs the folder");
    assert!(matches!(err, PipelineError::InputFolderMissing { .. }));
}
