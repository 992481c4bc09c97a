use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy)]
pub struct DocumentWriter {
    indent: usize,
}

impl DocumentWriter {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    pub fn render<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, serde_json::Error> {
        let indent = " ".repeat(self.indent);
        let mut out = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
        value.serialize(&mut serializer)?;
        Ok(out)
    }

    /// Overwrites `path` with the pretty-printed value, creating the parent
    /// folder when needed. Not atomic.
    pub fn write_flat<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), PipelineError> {
        let bytes = self
            .render(value)
            .map_err(|source| PipelineError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, bytes).map_err(|source| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(target: "writer", path = %path.display(), "document_written");
        Ok(())
    }

    /// Writes to `<output_root>/<category>/<file_name>` and returns that path.
    pub fn write_to_category<T: Serialize>(
        &self,
        output_root: &Path,
        category: &str,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, PipelineError> {
        let path = category_folder(output_root, category).join(file_name);
        self.write_flat(&path, value)?;
        Ok(path)
    }
}

pub fn category_folder(output_root: &Path, category: &str) -> PathBuf {
    output_root.join(category_dir_name(category))
}

/// Folder name for a category; separators and dot-only names are replaced so
/// a label can never leave the output root.
pub fn category_dir_name(category: &str) -> String {
    let name = category
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect::<String>();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        return "_".to_string();
    }
    name
}
