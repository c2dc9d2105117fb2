use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::document::{DecodeError, DocumentSource};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no document is loaded")]
    NoDocument,
    #[error(transparent)]
    Source(#[from] DecodeError),
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Host side of the download button
pub trait DownloadHandler {
    fn download(&self, artifact: &DocumentSource, suggested_name: &str) -> Result<(), ExportError>;
}

/// Insert `_<suffix>` before the extension: `report.pdf` -> `report_en.pdf`.
///
/// Names without an extension (or dot files like `.config`) get the suffix
/// appended at the end.
pub fn suggested_file_name(original: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return original.to_string();
    }
    match original.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, extension) = original.split_at(dot);
            format!("{}_{}{}", stem, suffix, extension)
        }
        _ => format!("{}_{}", original, suffix),
    }
}

/// Write the artifact's bytes to `destination`
pub fn save_artifact(artifact: &DocumentSource, destination: &Path) -> Result<(), ExportError> {
    let bytes = super::source::load_bytes(artifact)?;
    std::fs::write(destination, &bytes).map_err(|source| ExportError::Io {
        path: destination.to_path_buf(),
        source,
    })?;
    info!(path = %destination.display(), len = bytes.len(), "document saved");
    Ok(())
}

/// Saves downloads into a fixed directory under the suggested name
pub struct FileDownloader {
    directory: PathBuf,
}

impl FileDownloader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The user's download directory, if the platform has one
    pub fn user_downloads() -> Option<Self> {
        dirs::download_dir().map(Self::new)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl DownloadHandler for FileDownloader {
    fn download(&self, artifact: &DocumentSource, suggested_name: &str) -> Result<(), ExportError> {
        save_artifact(artifact, &self.directory.join(suggested_name))
    }
}
