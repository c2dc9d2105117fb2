mod page_view;
mod status_bar;
mod viewer_header_bar;
mod viewer_window;

pub use page_view::PageView;
pub use status_bar::StatusBar;
pub use viewer_header_bar::ViewerHeaderBar;
pub use viewer_window::ViewerWindow;
