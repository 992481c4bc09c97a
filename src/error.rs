use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {} as JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected document shape in {}: {reason}", path.display())]
    Shape { path: PathBuf, reason: String },
    #[error("failed to serialize document for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input folder {} not found", path.display())]
    InputFolderMissing { path: PathBuf },
    #[error("failed to list {}: {source}", path.display())]
    ListFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
