use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::viewport::PageSize;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("document source is empty")]
    EmptySource,
    #[error("failed to decode document: {0}")]
    Backend(String),
}

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(PathBuf),
    Url(String),
    Bytes { name: String, data: Arc<[u8]> },
}

impl DocumentSource {
    /// Interpret a command-line argument as a URL or a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            DocumentSource::Url(arg.to_string())
        } else {
            DocumentSource::Path(PathBuf::from(arg))
        }
    }

    /// File name used for display and for the download suggestion
    pub fn display_name(&self) -> String {
        match self {
            DocumentSource::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            DocumentSource::Url(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url);
                without_query
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .filter(|segment| !segment.is_empty() && !segment.contains(':'))
                    .unwrap_or("document.pdf")
                    .to_string()
            }
            DocumentSource::Bytes { name, .. } => name.clone(),
        }
    }
}

/// What the viewer needs to know about a decoded document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub page_sizes: Vec<PageSize>,
}

impl DocumentInfo {
    pub fn page_count(&self) -> usize {
        self.page_sizes.len()
    }
}

/// A successfully decoded, paginated document
pub trait DecodedDocument {
    fn page_count(&self) -> usize;

    fn page_size(&self, index: usize) -> Option<PageSize>;

    fn info(&self) -> DocumentInfo {
        DocumentInfo {
            page_sizes: (0..self.page_count())
                .filter_map(|index| self.page_size(index))
                .collect(),
        }
    }
}

/// Turns a source into a decoded document
pub trait DocumentDecoder {
    type Document: DecodedDocument;

    fn decode(&self, source: &DocumentSource) -> Result<Self::Document, DecodeError>;
}

/// Identifies one load request; completions for older tickets are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub(crate) fn next(previous: Option<LoadTicket>) -> Self {
        LoadTicket(previous.map_or(1, |ticket| ticket.0 + 1))
    }
}

/// Lifecycle of the displayed document
#[derive(Debug, Default)]
pub enum DocumentState {
    #[default]
    Empty,
    Loading {
        ticket: LoadTicket,
        source: DocumentSource,
    },
    Ready {
        source: DocumentSource,
        info: DocumentInfo,
    },
    Failed {
        source: DocumentSource,
        error: DecodeError,
    },
}

impl DocumentState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DocumentState::Loading { .. })
    }

    pub fn source(&self) -> Option<&DocumentSource> {
        match self {
            DocumentState::Empty => None,
            DocumentState::Loading { source, .. }
            | DocumentState::Ready { source, .. }
            | DocumentState::Failed { source, .. } => Some(source),
        }
    }

    pub fn info(&self) -> Option<&DocumentInfo> {
        match self {
            DocumentState::Ready { info, .. } => Some(info),
            _ => None,
        }
    }

    /// Page count, unknown until decode succeeds
    pub fn page_count(&self) -> Option<usize> {
        self.info().map(DocumentInfo::page_count)
    }

    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            DocumentState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_arg() {
        assert_eq!(
            DocumentSource::from_arg("https://example.com/a.pdf"),
            DocumentSource::Url("https://example.com/a.pdf".to_string())
        );
        assert_eq!(
            DocumentSource::from_arg("docs/a.pdf"),
            DocumentSource::Path(PathBuf::from("docs/a.pdf"))
        );
    }

    #[test]
    fn test_display_name() {
        let path = DocumentSource::Path(PathBuf::from("/tmp/report.pdf"));
        assert_eq!(path.display_name(), "report.pdf");

        let url = DocumentSource::Url("https://example.com/files/paper.pdf?dl=1".to_string());
        assert_eq!(url.display_name(), "paper.pdf");

        let bare = DocumentSource::Url("https://example.com/".to_string());
        assert_eq!(bare.display_name(), "example.com");

        let bytes = DocumentSource::Bytes {
            name: "upload.pdf".to_string(),
            data: Arc::from(vec![1u8, 2, 3]),
        };
        assert_eq!(bytes.display_name(), "upload.pdf");
    }

    #[test]
    fn test_load_tickets_increase() {
        let first = LoadTicket::next(None);
        let second = LoadTicket::next(Some(first));
        assert_ne!(first, second);
    }

    struct FixedDocument(Vec<PageSize>);

    impl DecodedDocument for FixedDocument {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_size(&self, index: usize) -> Option<PageSize> {
            self.0.get(index).copied()
        }
    }

    #[test]
    fn test_info_from_decoded_document() {
        let document = FixedDocument(vec![PageSize::new(10.0, 20.0); 4]);
        assert_eq!(document.info().page_count(), 4);
    }
}
