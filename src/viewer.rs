use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::document::{DecodeError, DocumentInfo, DocumentSource, DocumentState, LoadTicket};
use crate::navigation::{NavigationCoordinator, ViewerAction, ZoomChange};
use crate::services::export::{DownloadHandler, ExportError, suggested_file_name};
use crate::viewport::{
    CurrentPageUpdate, PageLayout, PageRegion, RegionHandle, ScrollCommand, ViewportController,
    ViewportRect, VisibilityBatch,
};

/// Something the host has to act on
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// Move the scroll container
    Scroll(ScrollCommand),
    /// The page indicator shows a different page now
    CurrentPageChanged(usize),
    /// Page geometry is stale; render at this zoom and register regions again
    RelayoutRequired { zoom: f64 },
}

/// Read-only snapshot of what the toolbar displays
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub current_page: usize,
    pub zoom_scale: f64,
    pub pending_page_input: String,
    pub page_count: Option<usize>,
}

/// What the status line shows for the document lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentStatus {
    Clear,
    Loading(String),
    Failed(String),
}

/// Owned copy of everything the toolbar and status line display, taken so
/// widgets can be updated without holding on to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarState {
    pub page_field_text: String,
    pub page_count_label: String,
    pub has_document: bool,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub zoom_label: String,
    pub zoom_at_min: bool,
    pub zoom_at_max: bool,
    pub status: DocumentStatus,
}

/// Single owner of the document lifecycle, the viewport controller and the
/// navigation coordinator.
#[derive(Debug)]
pub struct Viewer {
    config: ViewerConfig,
    layout: PageLayout,
    document: DocumentState,
    last_ticket: Option<LoadTicket>,
    viewport: ViewportController,
    navigation: NavigationCoordinator,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            layout: PageLayout::new(config.layout.base_width, config.layout.page_spacing),
            navigation: NavigationCoordinator::new(&config.zoom),
            config,
            document: DocumentState::Empty,
            last_ticket: None,
            viewport: ViewportController::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn document(&self) -> &DocumentState {
        &self.document
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn navigation(&self) -> &NavigationCoordinator {
        &self.navigation
    }

    pub fn state(&self) -> ViewerState {
        ViewerState {
            current_page: self.viewport.current_page(),
            zoom_scale: self.navigation.zoom_scale(),
            pending_page_input: self.navigation.pending_page_input().to_string(),
            page_count: self.document.page_count(),
        }
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        let zoom = self.navigation.zoom();
        let status = match &self.document {
            DocumentState::Loading { source, .. } => {
                DocumentStatus::Loading(format!("Loading {}", source.display_name()))
            }
            DocumentState::Failed { source, error } => DocumentStatus::Failed(format!(
                "Could not open {}: {}",
                source.display_name(),
                error
            )),
            DocumentState::Empty | DocumentState::Ready { .. } => DocumentStatus::Clear,
        };

        ToolbarState {
            page_field_text: self.page_field_text(),
            page_count_label: self.page_count_label(),
            has_document: self.document.page_count().is_some(),
            can_go_prev: self.can_go_prev(),
            can_go_next: self.can_go_next(),
            zoom_label: self.zoom_label(),
            zoom_at_min: zoom.at_min(),
            zoom_at_max: zoom.at_max(),
            status,
        }
    }

    pub fn current_page(&self) -> usize {
        self.viewport.current_page()
    }

    pub fn zoom_scale(&self) -> f64 {
        self.navigation.zoom_scale()
    }

    pub fn page_field_text(&self) -> String {
        self.navigation.page_field_text(self.viewport.current_page())
    }

    /// "/ 12", or "/ -" while the page count is unknown
    pub fn page_count_label(&self) -> String {
        match self.document.page_count() {
            Some(count) => format!("/ {}", count),
            None => "/ -".to_string(),
        }
    }

    pub fn zoom_label(&self) -> String {
        self.navigation.zoom().label()
    }

    pub fn can_go_prev(&self) -> bool {
        self.viewport.current_page() > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.document
            .page_count()
            .is_some_and(|count| self.viewport.current_page() < count)
    }

    /// Start showing a new source. The previous document and its regions are
    /// dropped right away; the returned ticket must accompany the decode result.
    pub fn open(&mut self, source: DocumentSource) -> LoadTicket {
        let ticket = LoadTicket::next(self.last_ticket);
        self.last_ticket = Some(ticket);

        info!(name = %source.display_name(), "loading document");
        self.viewport.reset();
        self.navigation.cancel_page_input();
        self.document = DocumentState::Loading { ticket, source };
        ticket
    }

    /// Decode finished. Results for a superseded ticket are ignored.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DocumentInfo, DecodeError>,
    ) -> Vec<ViewerEvent> {
        let source = match &self.document {
            DocumentState::Loading {
                ticket: current,
                source,
            } if *current == ticket => source.clone(),
            _ => {
                debug!(?ticket, "ignoring stale decode result");
                return Vec::new();
            }
        };

        match result {
            Ok(info) => {
                info!(pages = info.page_count(), "document ready");
                self.document = DocumentState::Ready { source, info };
                vec![ViewerEvent::RelayoutRequired {
                    zoom: self.zoom_scale(),
                }]
            }
            Err(error) => {
                warn!(%error, "document failed to load");
                self.document = DocumentState::Failed { source, error };
                Vec::new()
            }
        }
    }

    /// Lay the document's pages out at the current zoom
    pub fn layout_regions<F>(&self, handle_for: F) -> Vec<PageRegion>
    where
        F: Fn(usize) -> RegionHandle,
    {
        match self.document.info() {
            Some(info) => self
                .layout
                .regions(&info.page_sizes, self.zoom_scale(), handle_for),
            None => Vec::new(),
        }
    }

    pub fn register_page_regions(&mut self, regions: Vec<PageRegion>) -> Vec<ViewerEvent> {
        let before = self.viewport.current_page();
        let command = self.viewport.register_page_regions(regions);
        self.collect(before, command, None)
    }

    /// Lay out and register in one go, for hosts that use the built-in layout
    pub fn relayout<F>(&mut self, handle_for: F) -> Vec<ViewerEvent>
    where
        F: Fn(usize) -> RegionHandle,
    {
        let regions = self.layout_regions(handle_for);
        self.register_page_regions(regions)
    }

    pub fn on_viewport_changed(&mut self, viewport: ViewportRect) -> Vec<ViewerEvent> {
        let before = self.viewport.current_page();
        let update = self.viewport.on_viewport_changed(viewport);
        self.collect(before, None, update)
    }

    pub fn on_visibility_update(&mut self, batch: VisibilityBatch) -> Vec<ViewerEvent> {
        let before = self.viewport.current_page();
        let update = self.viewport.on_visibility_update(batch);
        self.collect(before, None, update)
    }

    pub fn on_scroll_settled(&mut self) -> Vec<ViewerEvent> {
        let before = self.viewport.current_page();
        let update = self.viewport.on_scroll_settled();
        self.collect(before, None, update)
    }

    pub fn on_user_scroll(&mut self) -> Vec<ViewerEvent> {
        let before = self.viewport.current_page();
        let update = self.viewport.on_user_scroll();
        self.collect(before, None, update)
    }

    pub fn dispatch(&mut self, action: ViewerAction) -> Vec<ViewerEvent> {
        let before = self.viewport.current_page();
        let viewport = &mut self.viewport;
        let navigation = &mut self.navigation;

        let command = match action {
            ViewerAction::PrevPage => navigation.prev_page(viewport),
            ViewerAction::NextPage => navigation.next_page(viewport),
            ViewerAction::FirstPage => navigation.first_page(viewport),
            ViewerAction::LastPage => navigation.last_page(viewport),
            ViewerAction::GoToPage(page) => navigation.go_to_page(page, viewport),
            ViewerAction::PageInput(raw) => {
                navigation.on_page_input_change(&raw);
                None
            }
            ViewerAction::CommitPageInput => navigation.commit_page_input(viewport),
            ViewerAction::CancelPageInput => {
                navigation.cancel_page_input();
                None
            }
            ViewerAction::ZoomIn => {
                let change = navigation.zoom_in(viewport);
                return self.zoom_events(change);
            }
            ViewerAction::ZoomOut => {
                let change = navigation.zoom_out(viewport);
                return self.zoom_events(change);
            }
            ViewerAction::ResetZoom => {
                let change = navigation.reset_zoom(viewport);
                return self.zoom_events(change);
            }
            ViewerAction::Zoom(delta) => {
                let change = navigation.set_zoom(delta, viewport);
                return self.zoom_events(change);
            }
        };

        self.collect(before, command, None)
    }

    /// Hand the displayed artifact to the host's download action
    pub fn download(&self, handler: &dyn DownloadHandler) -> Result<(), ExportError> {
        let source = match &self.document {
            DocumentState::Ready { source, .. } => source,
            _ => return Err(ExportError::NoDocument),
        };
        let name = self.suggested_download_name().ok_or(ExportError::NoDocument)?;
        handler.download(source, &name)
    }

    pub fn suggested_download_name(&self) -> Option<String> {
        let source = self.document.source()?;
        Some(suggested_file_name(
            &source.display_name(),
            &self.config.export_suffix,
        ))
    }

    /// Stop observing; used when the view goes away
    pub fn teardown(&mut self) {
        self.viewport.teardown();
    }

    fn zoom_events(&self, change: ZoomChange) -> Vec<ViewerEvent> {
        if change.changed() && self.document.page_count().is_some() {
            vec![ViewerEvent::RelayoutRequired {
                zoom: change.current,
            }]
        } else {
            Vec::new()
        }
    }

    fn collect(
        &mut self,
        before: usize,
        command: Option<ScrollCommand>,
        update: Option<CurrentPageUpdate>,
    ) -> Vec<ViewerEvent> {
        let mut events = Vec::new();
        if let Some(update) = update {
            self.navigation.on_current_page_confirmed(&update);
        }
        if let Some(command) = command {
            events.push(ViewerEvent::Scroll(command));
        }
        let after = self.viewport.current_page();
        if after != before {
            events.push(ViewerEvent::CurrentPageChanged(after));
        }
        events
    }
}
