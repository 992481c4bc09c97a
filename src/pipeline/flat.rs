use std::path::Path;

use serde_json::Value;

use crate::{
    classifier::{ClassificationInput, Classifier},
    document::{
        CATEGORY_KEY, DESCRIPTION_KEY, Document, TITLE_KEY, field_text, record_fields,
        record_fields_mut,
    },
    pipeline::types::{CategorizePipelineConfig, RunReport, SanitizePipelineConfig},
    sanitizer::FieldSanitizer,
    writer::DocumentWriter,
};

/// Strips the removal keys from every record of one document and writes the
/// result to a single output file.
pub fn run_sanitize(config: &SanitizePipelineConfig, sanitizer: &FieldSanitizer) -> RunReport {
    let mut report = RunReport {
        files_seen: 1,
        ..RunReport::default()
    };

    let Some(mut document) = load_or_skip(config.input.as_path(), &mut report) else {
        return report;
    };

    for record in document.records_mut() {
        report.keys_removed += sanitizer.sanitize(record);
        report.records_processed += 1;
    }

    write_or_count(
        &DocumentWriter::new(config.indent),
        config.output.as_path(),
        &document,
        &mut report,
    );
    report
}

/// Sanitizes and classifies every record of one document, annotating each
/// record's `Data` with a `Category`, then writes a single output file.
pub async fn run_categorize(
    config: &CategorizePipelineConfig,
    sanitizer: &FieldSanitizer,
    classifier: &Classifier,
) -> RunReport {
    let mut report = RunReport {
        files_seen: 1,
        ..RunReport::default()
    };

    let Some(mut document) = load_or_skip(config.input.as_path(), &mut report) else {
        return report;
    };

    for record in document.records_mut() {
        if record_fields(record).is_none() {
            continue;
        }
        report.keys_removed += sanitizer.sanitize(record);

        let input = classification_input(record);
        let classification = classifier.classify(&input).await;
        if let Some(fields) = record_fields_mut(record) {
            fields.insert(
                CATEGORY_KEY.to_string(),
                Value::String(classification.label.clone()),
            );
        }
        report.record_classification(&classification);
        report.records_processed += 1;
    }

    write_or_count(
        &DocumentWriter::new(config.indent),
        config.output.as_path(),
        &document,
        &mut report,
    );
    report
}

fn classification_input(record: &Value) -> ClassificationInput {
    let Some(fields) = record_fields(record) else {
        return ClassificationInput::default();
    };
    ClassificationInput {
        name: field_text(fields, TITLE_KEY).map(str::to_string),
        description: field_text(fields, DESCRIPTION_KEY)
            .unwrap_or_default()
            .to_string(),
    }
}

pub(crate) fn load_or_skip(path: &Path, report: &mut RunReport) -> Option<Document> {
    match Document::load(path) {
        Ok(document) => {
            tracing::info!(
                target: "loader",
                path = %path.display(),
                records = document.records().len(),
                "document_loaded"
            );
            Some(document)
        }
        Err(err) => {
            tracing::warn!(target: "loader", error = %err, "document_skipped");
            report.files_skipped += 1;
            None
        }
    }
}

fn write_or_count(
    writer: &DocumentWriter,
    path: &Path,
    document: &Document,
    report: &mut RunReport,
) {
    match writer.write_flat(path, document) {
        Ok(()) => {
            tracing::info!(
                target: "writer",
                path = %path.display(),
                records = document.records().len(),
                "document_saved"
            );
            report.written.push(path.to_path_buf());
        }
        Err(err) => {
            tracing::warn!(target: "writer", error = %err, "document_write_failed");
            report.write_failures += 1;
        }
    }
}
