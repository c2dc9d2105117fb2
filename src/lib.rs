pub mod config;
pub mod document;
pub mod error;
pub mod navigation;
pub mod services;
pub mod viewer;
pub mod viewport;

#[cfg(feature = "gui")]
pub mod widgets;

pub use config::ViewerConfig;
pub use document::{DecodeError, DocumentDecoder, DocumentInfo, DocumentSource, DocumentState};
pub use error::ViewerError;
pub use navigation::{NavigationCoordinator, ViewerAction};
pub use viewer::{DocumentStatus, ToolbarState, Viewer, ViewerEvent, ViewerState};
pub use viewport::{ScrollCommand, ViewportController, ViewportRect};
