use tracing::debug;

use super::page_input::{PageInput, clamp_page};
use super::zoom::{ZoomChange, ZoomLevel};
use crate::config::ZoomConfig;
use crate::viewport::{CurrentPageUpdate, ScrollCommand, ViewportController};

/// Turns zoom and page-jump intents into viewport operations and owns the
/// provisional page-number input.
#[derive(Debug, Default)]
pub struct NavigationCoordinator {
    zoom: ZoomLevel,
    input: PageInput,
}

impl NavigationCoordinator {
    pub fn new(config: &ZoomConfig) -> Self {
        Self {
            zoom: ZoomLevel::new(config),
            input: PageInput::Idle,
        }
    }

    pub fn zoom(&self) -> &ZoomLevel {
        &self.zoom
    }

    pub fn zoom_scale(&self) -> f64 {
        self.zoom.scale()
    }

    pub fn page_input(&self) -> &PageInput {
        &self.input
    }

    pub fn pending_page_input(&self) -> &str {
        self.input.pending()
    }

    /// Text for the page-number field
    pub fn page_field_text(&self, current_page: usize) -> String {
        self.input.display(current_page)
    }

    /// Adjust zoom by `delta`. A real change invalidates the region geometry;
    /// the host has to lay the pages out again and re-register them.
    pub fn set_zoom(&mut self, delta: f64, viewport: &mut ViewportController) -> ZoomChange {
        let change = self.zoom.adjust(delta);
        self.apply_zoom(change, viewport)
    }

    pub fn zoom_in(&mut self, viewport: &mut ViewportController) -> ZoomChange {
        let change = self.zoom.zoom_in();
        self.apply_zoom(change, viewport)
    }

    pub fn zoom_out(&mut self, viewport: &mut ViewportController) -> ZoomChange {
        let change = self.zoom.zoom_out();
        self.apply_zoom(change, viewport)
    }

    pub fn reset_zoom(&mut self, viewport: &mut ViewportController) -> ZoomChange {
        let change = self.zoom.reset();
        self.apply_zoom(change, viewport)
    }

    fn apply_zoom(&mut self, change: ZoomChange, viewport: &mut ViewportController) -> ZoomChange {
        if change.changed() {
            debug!(from = change.previous, to = change.current, "zoom changed");
            viewport.invalidate_regions();
        }
        change
    }

    pub fn prev_page(&mut self, viewport: &mut ViewportController) -> Option<ScrollCommand> {
        let current = viewport.current_page();
        if current <= 1 {
            return None;
        }
        viewport.scroll_to_page(current - 1)
    }

    pub fn next_page(&mut self, viewport: &mut ViewportController) -> Option<ScrollCommand> {
        let page_count = viewport.page_count()?;
        let current = viewport.current_page();
        if current >= page_count {
            return None;
        }
        viewport.scroll_to_page(current + 1)
    }

    pub fn first_page(&mut self, viewport: &mut ViewportController) -> Option<ScrollCommand> {
        viewport.scroll_to_page(1)
    }

    pub fn last_page(&mut self, viewport: &mut ViewportController) -> Option<ScrollCommand> {
        let page_count = viewport.page_count()?;
        viewport.scroll_to_page(page_count)
    }

    pub fn go_to_page(
        &mut self,
        page: usize,
        viewport: &mut ViewportController,
    ) -> Option<ScrollCommand> {
        viewport.scroll_to_page(clamp_page(page, viewport.page_count()))
    }

    /// Record typed text; navigation waits for `commit_page_input`
    pub fn on_page_input_change(&mut self, raw: &str) {
        self.input = PageInput::from_raw(raw);
    }

    /// Navigate to the typed page (blur or Enter). Empty input is ignored.
    pub fn commit_page_input(&mut self, viewport: &mut ViewportController) -> Option<ScrollCommand> {
        let page = match self.input.parse() {
            Ok(page) => page,
            Err(err) => {
                debug!(%err, "ignoring page input");
                return None;
            }
        };
        self.input = PageInput::Idle;

        let target = clamp_page(page, viewport.page_count());
        if target != page {
            debug!(requested = page, target, "page input clamped");
        }
        viewport.scroll_to_page(target)
    }

    pub fn cancel_page_input(&mut self) {
        self.input = PageInput::Idle;
    }

    /// The viewport confirmed a current page; a half-typed number is stale now.
    pub fn on_current_page_confirmed(&mut self, update: &CurrentPageUpdate) {
        if self.input.is_editing() {
            debug!(page = update.page, "dropping pending page input");
        }
        self.input = PageInput::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{PageRegion, RegionGeometry, RegionHandle, Tracking, ViewportRect};

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

    fn setup(count: usize) -> (NavigationCoordinator, ViewportController) {
        let mut viewport = ViewportController::new();
        viewport.register_page_regions(regions(count));
        viewport.on_viewport_changed(ViewportRect::new(0.0, PAGE));
        (NavigationCoordinator::default(), viewport)
    }

    /// Apply a scroll command the way a host would and let it settle
    fn settle(viewport: &mut ViewportController, command: Option<ScrollCommand>) {
        if let Some(command) = command {
            viewport.on_viewport_changed(ViewportRect::new(command.offset, PAGE));
        }
        viewport.on_scroll_settled();
    }

    #[test]
    fn test_prev_page_at_first_page_is_noop() {
        let (mut nav, mut viewport) = setup(10);
        assert_eq!(nav.prev_page(&mut viewport), None);
        assert_eq!(viewport.current_page(), 1);
    }

    #[test]
    fn test_next_page_at_last_page_is_noop() {
        let (mut nav, mut viewport) = setup(3);
        let command = nav.last_page(&mut viewport);
        settle(&mut viewport, command);
        assert_eq!(viewport.current_page(), 3);

        assert_eq!(nav.next_page(&mut viewport), None);
    }

    #[test]
    fn test_next_and_prev() {
        let (mut nav, mut viewport) = setup(10);
        let command = nav.next_page(&mut viewport).unwrap();
        assert_eq!(command.page, 2);
        settle(&mut viewport, Some(command));

        let command = nav.prev_page(&mut viewport).unwrap();
        assert_eq!(command.page, 1);
    }

    #[test]
    fn test_commit_typed_page() {
        let (mut nav, mut viewport) = setup(10);
        nav.on_page_input_change("3");
        assert_eq!(nav.page_field_text(viewport.current_page()), "3");

        let command = nav.commit_page_input(&mut viewport);
        settle(&mut viewport, command);

        assert_eq!(viewport.current_page(), 3);
        assert_eq!(nav.pending_page_input(), "");
        assert_eq!(nav.page_field_text(viewport.current_page()), "3");
    }

    #[test]
    fn test_commit_clamps_to_last_page() {
        let (mut nav, mut viewport) = setup(10);
        nav.on_page_input_change("999");
        let command = nav.commit_page_input(&mut viewport);
        assert_eq!(command.map(|c| c.page), Some(10));
        assert_eq!(viewport.current_page(), 10);
    }

    #[test]
    fn test_commit_empty_input_is_noop() {
        let (mut nav, mut viewport) = setup(10);
        nav.on_page_input_change("x");
        assert_eq!(nav.commit_page_input(&mut viewport), None);
        assert_eq!(nav.commit_page_input(&mut viewport), None);
        assert_eq!(viewport.current_page(), 1);
        assert_eq!(viewport.tracking(), Tracking::Observing);
    }

    #[test]
    fn test_commit_without_document_clears_input() {
        let mut viewport = ViewportController::new();
        let mut nav = NavigationCoordinator::default();
        nav.on_page_input_change("4");

        assert_eq!(nav.commit_page_input(&mut viewport), None);
        assert_eq!(nav.pending_page_input(), "");
        assert_eq!(viewport.current_page(), 1);
    }

    #[test]
    fn test_confirmed_visibility_clears_input() {
        let (mut nav, mut viewport) = setup(10);
        nav.on_page_input_change("7");

        let update = viewport
            .on_viewport_changed(ViewportRect::new(150.0, PAGE))
            .unwrap();
        nav.on_current_page_confirmed(&update);

        assert_eq!(nav.page_input(), &PageInput::Idle);
        assert_eq!(nav.page_field_text(viewport.current_page()), "2");
    }

    #[test]
    fn test_zoom_invalidates_regions_but_keeps_page() {
        let (mut nav, mut viewport) = setup(5);
        let command = nav.go_to_page(2, &mut viewport);
        settle(&mut viewport, command);

        let change = nav.zoom_in(&mut viewport);
        assert!(change.changed());
        assert_eq!(viewport.tracking(), Tracking::Suspended);
        assert_eq!(viewport.current_page(), 2);
    }

    #[test]
    fn test_zoom_at_bound_does_not_invalidate() {
        let (mut nav, mut viewport) = setup(5);
        nav.set_zoom(10.0, &mut viewport);
        viewport.register_page_regions(regions(5));
        viewport.on_scroll_settled();

        let change = nav.zoom_in(&mut viewport);
        assert!(!change.changed());
        assert_eq!(viewport.tracking(), Tracking::Observing);
    }
}
