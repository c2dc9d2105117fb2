mod action;
mod coordinator;
mod page_input;
mod zoom;

pub use action::ViewerAction;
pub use coordinator::NavigationCoordinator;
pub use page_input::{PageInput, PageInputError, clamp_page};
pub use zoom::{ZoomChange, ZoomLevel};
