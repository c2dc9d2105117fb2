pub mod animation;
pub mod controller;
pub mod layout;
pub mod observer;
pub mod region;

pub use animation::ScrollAnimation;
pub use controller::{
    CurrentPageUpdate, ScrollCommand, Tracking, ViewportController, select_current_page,
};
pub use layout::{PageLayout, PageSize, RenderedSize};
pub use observer::{
    SubscriptionId, THRESHOLD_COUNT, VisibilityBatch, VisibilityEntry, VisibilityObserver,
    thresholds,
};
pub use region::{PageRegion, RegionGeometry, RegionHandle, ViewportRect};
