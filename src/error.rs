use thiserror::Error;

use crate::config::ConfigError;
use crate::document::DecodeError;
use crate::services::export::ExportError;

/// Any error the viewer surfaces to its host
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
