use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    classifier::{ClassificationInput, Classifier},
    document::{DESCRIPTION_KEY, Document, TITLE_KEY, field_text, record_fields},
    error::PipelineError,
    pipeline::{
        flat::load_or_skip,
        types::{RoutePipelineConfig, RunReport},
    },
    sanitizer::FieldSanitizer,
    writer::DocumentWriter,
};

const UNKNOWN_DISEASE_NAME: &str = "Unknown Disease";

/// Classifies every `*.json` document in the input folder by its first record
/// and copies it into `<output_dir>/<Category>/`.
///
/// Per-file problems are logged and counted. A missing input folder is fatal
/// unless `create_input_dir` is set, in which case the folder is created and
/// the run ends empty.
pub async fn run_route(
    config: &RoutePipelineConfig,
    sanitizer: &FieldSanitizer,
    classifier: &Classifier,
) -> Result<RunReport, PipelineError> {
    let mut report = RunReport::default();

    if !config.input_dir.is_dir() {
        if !config.create_input_dir {
            return Err(PipelineError::InputFolderMissing {
                path: config.input_dir.clone(),
            });
        }
        ensure_dir(&config.input_dir)?;
    }
    ensure_dir(&config.output_dir)?;

    let files = list_json_files(&config.input_dir)?;
    if files.is_empty() {
        tracing::info!(
            target: "pipeline",
            input_dir = %config.input_dir.display(),
            "no_json_files"
        );
        return Ok(report);
    }

    let writer = DocumentWriter::new(config.indent);
    for path in files {
        report.files_seen += 1;
        let Some(mut document) = load_or_skip(&path, &mut report) else {
            continue;
        };

        if config.sanitize {
            for record in document.records_mut() {
                report.keys_removed += sanitizer.sanitize(record);
            }
        }

        let input = first_record_input(&document);
        let disease_name = input.name.clone().unwrap_or_default();
        let classification = classifier.classify(&input).await;
        report.record_classification(&classification);
        report.records_processed += 1;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match writer.write_to_category(
            &config.output_dir,
            &classification.label,
            &file_name,
            &document,
        ) {
            Ok(written) => {
                tracing::info!(
                    target: "writer",
                    disease = %disease_name,
                    category = %classification.label,
                    path = %written.display(),
                    "document_routed"
                );
                report.written.push(written);
            }
            Err(err) => {
                tracing::warn!(
                    target: "writer",
                    file = %file_name,
                    error = %err,
                    "document_write_failed"
                );
                report.write_failures += 1;
            }
        }
    }

    Ok(report)
}

fn first_record_input(document: &Document) -> ClassificationInput {
    let fields = document.first_record().and_then(record_fields);
    let name = fields
        .and_then(|fields| field_text(fields, TITLE_KEY))
        .unwrap_or(UNKNOWN_DISEASE_NAME);
    let description = fields
        .and_then(|fields| field_text(fields, DESCRIPTION_KEY))
        .unwrap_or_default();
    ClassificationInput::new(description.trim()).with_name(name)
}

fn ensure_dir(path: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(path).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|source| PipelineError::ListFolder {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::ListFolder {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
