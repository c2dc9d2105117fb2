use tracing::{debug, info};

use crate::document::{DecodeError, DocumentSource};

/// Read the raw bytes behind a source, fetching URLs over HTTP
pub fn load_bytes(source: &DocumentSource) -> Result<Vec<u8>, DecodeError> {
    let bytes = match source {
        DocumentSource::Path(path) => std::fs::read(path).map_err(|source| DecodeError::Io {
            path: path.clone(),
            source,
        })?,
        DocumentSource::Url(url) => fetch(url)?,
        DocumentSource::Bytes { data, .. } => data.to_vec(),
    };

    if bytes.is_empty() {
        return Err(DecodeError::EmptySource);
    }

    debug!(name = %source.display_name(), len = bytes.len(), "loaded document bytes");
    Ok(bytes)
}

fn fetch(url: &str) -> Result<Vec<u8>, DecodeError> {
    let fetch_err = |source| DecodeError::Fetch {
        url: url.to_string(),
        source,
    };

    info!(url, "fetching document");
    let response = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(fetch_err)?;
    let bytes = response.bytes().map_err(fetch_err)?;

    Ok(bytes.to_vec())
}
