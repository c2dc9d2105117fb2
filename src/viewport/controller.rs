use tracing::{debug, trace};

use super::observer::{SubscriptionId, VisibilityBatch, VisibilityObserver};
use super::region::{PageRegion, ViewportRect};

/// How the controller currently derives the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tracking {
    /// No regions registered (page count unknown or zero)
    #[default]
    Unobserved,
    /// Regions were invalidated by a zoom change and await re-registration
    Suspended,
    /// Visibility updates drive the current page
    Observing,
    /// A programmatic scroll is in flight; visibility is recorded but ignored
    Navigating { target: usize },
}

/// Instruction for the host's scroll container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    /// 1-based page the scroll is aiming at
    pub page: usize,
    /// Content offset to place at the top of the viewport
    pub offset: f64,
    pub smooth: bool,
}

/// Result of a confirmed visibility evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentPageUpdate {
    pub page: usize,
    pub previous: usize,
}

impl CurrentPageUpdate {
    pub fn changed(&self) -> bool {
        self.page != self.previous
    }
}

/// Owns the page regions and derives the authoritative current page
#[derive(Debug)]
pub struct ViewportController {
    regions: Vec<PageRegion>,
    observer: VisibilityObserver,
    /// Page count of the last registration, kept while regions are suspended
    page_count: usize,
    current_page: usize,
    tracking: Tracking,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            observer: VisibilityObserver::new(),
            page_count: 0,
            current_page: 1,
            tracking: Tracking::Unobserved,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> Option<usize> {
        (self.page_count > 0).then_some(self.page_count)
    }

    pub fn tracking(&self) -> Tracking {
        self.tracking
    }

    pub fn is_navigating(&self) -> bool {
        matches!(self.tracking, Tracking::Navigating { .. })
    }

    pub fn regions(&self) -> &[PageRegion] {
        &self.regions
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.observer.subscription()
    }

    /// Replace the observed regions.
    ///
    /// The previous subscription is retired before the new one starts, so no
    /// batch measured against the old geometry is accepted afterwards. When the
    /// previous regions were invalidated by a zoom change the returned command
    /// scrolls the current page back to the top of the viewport.
    pub fn register_page_regions(&mut self, mut regions: Vec<PageRegion>) -> Option<ScrollCommand> {
        let reanchor = self.tracking == Tracking::Suspended;
        self.release_regions();

        if regions.is_empty() {
            debug!("no page regions to observe");
            self.tracking = Tracking::Unobserved;
            return None;
        }

        regions.sort_by_key(|region| region.index);
        for region in &mut regions {
            region.visibility_ratio = 0.0;
            region.intersecting = false;
        }

        self.page_count = regions.len();
        self.current_page = self.current_page.clamp(1, self.page_count);
        self.regions = regions;
        let subscription = self.observer.subscribe();

        debug!(
            pages = self.page_count,
            generation = subscription.generation(),
            current_page = self.current_page,
            "registered page regions"
        );

        if reanchor {
            self.begin_navigation(self.current_page)
        } else {
            self.tracking = Tracking::Observing;
            None
        }
    }

    /// Region geometry is stale (zoom changed). Observation stops until the
    /// regions are registered again; the current page is kept.
    pub fn invalidate_regions(&mut self) {
        if self.tracking == Tracking::Unobserved {
            return;
        }
        self.release_regions();
        self.tracking = Tracking::Suspended;
        debug!(current_page = self.current_page, "page regions invalidated");
    }

    /// Measure the registered regions against a new viewport position
    pub fn on_viewport_changed(&mut self, viewport: ViewportRect) -> Option<CurrentPageUpdate> {
        let batch = self.observer.measure(&viewport, &self.regions)?;
        self.on_visibility_update(batch)
    }

    pub fn on_visibility_update(&mut self, batch: VisibilityBatch) -> Option<CurrentPageUpdate> {
        if !self.observer.is_current(batch.subscription) {
            debug!(
                generation = batch.subscription.generation(),
                "dropping visibility batch from retired subscription"
            );
            return None;
        }

        for entry in &batch.entries {
            match self.regions.get_mut(entry.index.wrapping_sub(1)) {
                Some(region) if region.index == entry.index => {
                    region.visibility_ratio = entry.ratio.clamp(0.0, 1.0);
                    region.intersecting = entry.intersecting;
                }
                _ => trace!(index = entry.index, "visibility entry for unknown page"),
            }
        }

        match self.tracking {
            Tracking::Observing => self.derive_current_page(),
            _ => None,
        }
    }

    /// Smooth-scroll so the page's top meets the viewport's top.
    ///
    /// Out of range pages are clamped. While regions are suspended only the
    /// current page moves; the re-registration scrolls there.
    pub fn scroll_to_page(&mut self, page: usize) -> Option<ScrollCommand> {
        if self.page_count == 0 {
            return None;
        }

        let clamped = page.clamp(1, self.page_count);
        if clamped != page {
            debug!(requested = page, clamped, "navigation target clamped");
        }

        if self.tracking == Tracking::Suspended {
            self.current_page = clamped;
            return None;
        }

        self.begin_navigation(clamped)
    }

    /// The programmatic scroll finished
    pub fn on_scroll_settled(&mut self) -> Option<CurrentPageUpdate> {
        let Tracking::Navigating { target } = self.tracking else {
            return None;
        };
        self.tracking = Tracking::Observing;

        let landed = self
            .regions
            .get(target - 1)
            .is_some_and(PageRegion::is_visible);

        if landed {
            debug!(page = target, "navigation settled");
            Some(CurrentPageUpdate {
                page: target,
                previous: self.current_page,
            })
        } else {
            debug!(page = target, "navigation settled away from target");
            self.derive_current_page()
        }
    }

    /// The user grabbed the scroll while a programmatic navigation was running
    pub fn on_user_scroll(&mut self) -> Option<CurrentPageUpdate> {
        if !self.is_navigating() {
            return None;
        }
        debug!("navigation interrupted by user scroll");
        self.tracking = Tracking::Observing;
        self.derive_current_page()
    }

    /// Release observation and regions; the current page is kept.
    pub fn teardown(&mut self) {
        self.release_regions();
        self.page_count = 0;
        self.tracking = Tracking::Unobserved;
    }

    /// Forget everything about the previous document
    pub fn reset(&mut self) {
        self.teardown();
        self.current_page = 1;
    }

    fn begin_navigation(&mut self, page: usize) -> Option<ScrollCommand> {
        let region = self.regions.get(page - 1)?;
        let command = ScrollCommand {
            page,
            offset: region.geometry.top,
            smooth: true,
        };
        self.tracking = Tracking::Navigating { target: page };
        self.current_page = page;
        debug!(page, offset = command.offset, "navigating");
        Some(command)
    }

    fn derive_current_page(&mut self) -> Option<CurrentPageUpdate> {
        let page = select_current_page(&self.regions, self.current_page)?;
        let update = CurrentPageUpdate {
            page,
            previous: self.current_page,
        };
        self.current_page = page;
        if update.changed() {
            trace!(from = update.previous, to = page, "current page changed");
        }
        Some(update)
    }

    fn release_regions(&mut self) {
        self.observer.disconnect();
        for region in self.regions.drain(..) {
            trace!(index = region.index, handle = region.handle.id(), "released region");
        }
    }
}

/// Pick the visible region with the largest ratio.
///
/// Ties keep `previous` when it is among the tied pages, otherwise the lowest
/// page number wins.
pub fn select_current_page(regions: &[PageRegion], previous: usize) -> Option<usize> {
    let max_ratio = regions
        .iter()
        .filter(|region| region.is_visible())
        .map(|region| region.visibility_ratio)
        .fold(None, |max: Option<f64>, ratio| {
            Some(max.map_or(ratio, |m| m.max(ratio)))
        })?;

    let mut tied = regions
        .iter()
        .filter(|region| region.is_visible() && region.visibility_ratio == max_ratio)
        .map(|region| region.index);

    let lowest = tied.next()?;
    if lowest == previous || tied.any(|index| index == previous) {
        Some(previous)
    } else {
        Some(lowest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::observer::VisibilityEntry;
    use crate::viewport::region::{RegionGeometry, RegionHandle};
    use pretty_assertions::assert_eq;

    const PAGE: f64 = 100.0;

    fn regions(count: usize) -> Vec<PageRegion> {
        (1..=count)
            .map(|index| {
                PageRegion::new(
                    index,
                    RegionHandle::new(index as u64),
                    RegionGeometry::new((index - 1) as f64 * PAGE, PAGE),
                )
            })
            .collect()
    }

    fn batch(controller: &ViewportController, entries: &[(usize, f64)]) -> VisibilityBatch {
        VisibilityBatch {
            subscription: controller.subscription().unwrap(),
            entries: entries
                .iter()
                .map(|&(index, ratio)| VisibilityEntry {
                    index,
                    ratio,
                    intersecting: ratio > 0.0,
                })
                .collect(),
        }
    }

    fn observing(count: usize) -> ViewportController {
        let mut controller = ViewportController::new();
        controller.register_page_regions(regions(count));
        controller
    }

    #[test]
    fn test_defaults_without_document() {
        let mut controller = ViewportController::new();
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.page_count(), None);
        assert_eq!(controller.tracking(), Tracking::Unobserved);
        assert_eq!(controller.scroll_to_page(3), None);
        assert_eq!(controller.on_viewport_changed(ViewportRect::new(0.0, 50.0)), None);
    }

    #[test]
    fn test_empty_registration_stops_observation() {
        let mut controller = observing(3);
        assert_eq!(controller.register_page_regions(Vec::new()), None);
        assert_eq!(controller.tracking(), Tracking::Unobserved);
        assert!(controller.subscription().is_none());
    }

    #[test]
    fn test_most_visible_page_wins() {
        let mut controller = observing(5);
        let update = controller
            .on_visibility_update(batch(&controller, &[(3, 0.8), (4, 0.2)]))
            .unwrap();

        assert_eq!(update, CurrentPageUpdate { page: 3, previous: 1 });
        assert_eq!(controller.current_page(), 3);
    }

    #[test]
    fn test_ratios_persist_across_batches() {
        let mut controller = observing(5);
        controller.on_visibility_update(batch(&controller, &[(2, 0.6), (3, 0.4)]));

        // Only page 3 crossed a threshold; page 2 is still at 60%
        controller.on_visibility_update(batch(&controller, &[(3, 0.5)]));
        assert_eq!(controller.current_page(), 2);
    }

    #[test]
    fn test_tie_prefers_previous_page() {
        let mut controller = observing(5);
        controller.on_visibility_update(batch(&controller, &[(3, 1.0)]));
        assert_eq!(controller.current_page(), 3);

        controller.on_visibility_update(batch(&controller, &[(2, 1.0)]));
        assert_eq!(controller.current_page(), 3);
    }

    #[test]
    fn test_tie_without_previous_picks_lowest() {
        let mut controller = observing(5);
        controller.on_visibility_update(batch(&controller, &[(4, 0.5), (2, 0.5)]));
        assert_eq!(controller.current_page(), 2);
    }

    #[test]
    fn test_nothing_visible_keeps_current_page() {
        let mut controller = observing(5);
        controller.on_visibility_update(batch(&controller, &[(4, 0.9)]));

        let update = controller.on_visibility_update(batch(&controller, &[(4, 0.0)]));
        assert_eq!(update, None);
        assert_eq!(controller.current_page(), 4);
    }

    #[test]
    fn test_stale_subscription_is_ignored() {
        let mut controller = observing(5);
        let stale = batch(&controller, &[(5, 1.0)]);

        controller.register_page_regions(regions(5));
        assert_eq!(controller.on_visibility_update(stale), None);
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn test_scroll_to_page_navigates_and_settles() {
        let mut controller = observing(5);
        let command = controller.scroll_to_page(4).unwrap();

        assert_eq!(command.page, 4);
        assert_eq!(command.offset, 300.0);
        assert!(command.smooth);
        assert_eq!(controller.current_page(), 4);
        assert!(controller.is_navigating());

        // Intermediate frames do not move the current page
        assert_eq!(controller.on_viewport_changed(ViewportRect::new(150.0, PAGE)), None);
        assert_eq!(controller.current_page(), 4);

        controller.on_viewport_changed(ViewportRect::new(300.0, PAGE));
        let update = controller.on_scroll_settled().unwrap();
        assert_eq!(update.page, 4);
        assert_eq!(controller.tracking(), Tracking::Observing);
    }

    #[test]
    fn test_scroll_to_page_clamps() {
        let mut controller = observing(5);
        assert_eq!(controller.scroll_to_page(0).unwrap().page, 1);
        assert_eq!(controller.scroll_to_page(42).unwrap().page, 5);
    }

    #[test]
    fn test_settle_away_from_target_rederives() {
        let mut controller = observing(5);
        controller.on_viewport_changed(ViewportRect::new(0.0, PAGE));
        controller.scroll_to_page(5);

        // The scroll never got anywhere near page 5
        controller.on_viewport_changed(ViewportRect::new(110.0, PAGE));
        let update = controller.on_scroll_settled().unwrap();
        assert_eq!(update.page, 2);
    }

    #[test]
    fn test_user_scroll_interrupts_navigation() {
        let mut controller = observing(5);
        controller.scroll_to_page(5);
        controller.on_viewport_changed(ViewportRect::new(120.0, PAGE));

        let update = controller.on_user_scroll().unwrap();
        assert_eq!(update.page, 2);
        assert_eq!(controller.on_scroll_settled(), None);
    }

    #[test]
    fn test_reregistration_after_invalidation_reanchors_current_page() {
        let mut controller = observing(5);
        controller.on_visibility_update(batch(&controller, &[(2, 1.0)]));

        controller.invalidate_regions();
        assert_eq!(controller.tracking(), Tracking::Suspended);
        assert!(controller.subscription().is_none());
        assert_eq!(controller.page_count(), Some(5));

        let command = controller.register_page_regions(regions(5)).unwrap();
        assert_eq!(command.page, 2);
        assert_eq!(controller.current_page(), 2);
    }

    #[test]
    fn test_navigation_while_suspended_moves_anchor() {
        let mut controller = observing(5);
        controller.invalidate_regions();

        assert_eq!(controller.scroll_to_page(4), None);
        let command = controller.register_page_regions(regions(5)).unwrap();
        assert_eq!(command.page, 4);
    }

    #[test]
    fn test_smaller_document_clamps_current_page() {
        let mut controller = observing(5);
        controller.on_visibility_update(batch(&controller, &[(5, 1.0)]));

        controller.register_page_regions(regions(2));
        assert_eq!(controller.current_page(), 2);
    }

    #[test]
    fn test_reset_returns_to_first_page() {
        let mut controller = observing(5);
        controller.on_visibility_update(batch(&controller, &[(3, 1.0)]));

        controller.reset();
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.page_count(), None);
        assert!(controller.regions().is_empty());
    }

    #[test]
    fn test_teardown_retires_subscription() {
        let mut controller = observing(5);
        controller.on_visibility_update(batch(&controller, &[(2, 1.0)]));
        let late = batch(&controller, &[(4, 1.0)]);

        controller.teardown();
        assert_eq!(controller.subscription(), None);
        assert_eq!(controller.tracking(), Tracking::Unobserved);

        assert_eq!(controller.on_visibility_update(late), None);
        assert_eq!(controller.on_viewport_changed(ViewportRect::new(3.0 * PAGE, PAGE)), None);
        assert_eq!(controller.current_page(), 2);
    }

    #[test]
    fn test_select_current_page_ignores_zero_ratio() {
        let mut pages = regions(3);
        pages[0].intersecting = true;
        assert_eq!(select_current_page(&pages, 1), None);
    }
}
