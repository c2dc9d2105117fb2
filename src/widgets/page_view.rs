use glib::subclass::Signal;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{Box, Orientation, Picture, ScrolledWindow};
use pdfium_render::prelude::Pdfium;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ViewerConfig;
use crate::document::{
    DecodeError, DecodedDocument, DocumentDecoder, DocumentInfo, DocumentSource,
};
use crate::navigation::ViewerAction;
use crate::services::export::{DownloadHandler, ExportError};
use crate::services::pdf_document::{PdfiumDecoder, PdfiumDocument, RenderedPage};
use crate::viewer::{Viewer, ViewerEvent};
use crate::viewport::{RegionHandle, ScrollAnimation, ScrollCommand, ViewportRect};

const FRAME: Duration = Duration::from_millis(16);

mod imp {
    use super::*;

    pub struct PageView {
        pub viewer: RefCell<Viewer>,
        pub decoder: RefCell<Option<PdfiumDecoder>>,
        pub document: RefCell<Option<PdfiumDocument>>,
        pub scroller: RefCell<Option<ScrolledWindow>>,
        pub(super) page_pictures: RefCell<Vec<Picture>>,
        /// Pages rendered at the current zoom level (0-based)
        pub(super) rendered_pages: RefCell<HashSet<usize>>,
        pub pending_measure: Cell<bool>,
        pub scroll_animation: RefCell<Option<glib::SourceId>>,
        pub animation: RefCell<Option<ScrollAnimation>>,
    }

    impl Default for PageView {
        fn default() -> Self {
            Self {
                viewer: RefCell::new(Viewer::default()),
                decoder: RefCell::new(None),
                document: RefCell::new(None),
                scroller: RefCell::new(None),
                page_pictures: RefCell::new(Vec::new()),
                rendered_pages: RefCell::new(HashSet::new()),
                pending_measure: Cell::new(false),
                scroll_animation: RefCell::new(None),
                animation: RefCell::new(None),
            }
        }
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PageView {
        const NAME: &'static str = "PagewisePageView";
        type Type = super::PageView;
        type ParentType = Box;
    }

    impl ObjectImpl for PageView {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }

        fn signals() -> &'static [Signal] {
            static SIGNALS: OnceLock<Vec<Signal>> = OnceLock::new();
            SIGNALS.get_or_init(|| vec![Signal::builder("state-changed").build()])
        }

        fn dispose(&self) {
            if let Some(source) = self.scroll_animation.take() {
                source.remove();
            }
            self.viewer.borrow_mut().teardown();
        }
    }

    impl WidgetImpl for PageView {}
    impl BoxImpl for PageView {}
}

glib::wrapper! {
    /// Continuous column of rendered pages.
    ///
    /// Owns the [`Viewer`] and translates its events into scrolling,
    /// re-layout and page rendering. Emits `state-changed` whenever the
    /// toolbar should be refreshed.
    pub struct PageView(ObjectSubclass<imp::PageView>)
        @extends Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl PageView {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    /// Replace the viewer with one built from `config`. Drops any open document.
    pub fn set_config(&self, config: ViewerConfig) {
        self.cancel_scroll_animation();
        self.clear();
        self.set_spacing(config.layout.page_spacing.round() as i32);
        self.imp().viewer.replace(Viewer::new(config));
        self.emit_state_changed();
    }

    fn setup_widgets(&self) {
        self.set_orientation(Orientation::Vertical);
        self.set_halign(gtk::Align::Center);
        self.setup_scroll_tracking();
    }

    pub fn set_pdfium(&self, pdfium: &'static Pdfium) {
        self.imp().decoder.replace(Some(PdfiumDecoder::new(pdfium)));
    }

    /// Read access to the viewer for toolbar updates
    pub fn with_viewer<R>(&self, f: impl FnOnce(&Viewer) -> R) -> R {
        f(&self.imp().viewer.borrow())
    }

    /// Hook the scrolled window this view lives in
    pub fn attach_scroller(&self, scrolled: &ScrolledWindow) {
        let adjustment = scrolled.vadjustment();

        let view_weak = self.downgrade();
        adjustment.connect_value_changed(move |adjustment| {
            if let Some(view) = view_weak.upgrade() {
                view.check_foreign_scroll(adjustment.value());
                view.schedule_measure();
            }
        });

        let view_weak = self.downgrade();
        adjustment.connect_changed(move |_| {
            if let Some(view) = view_weak.upgrade() {
                view.schedule_measure();
            }
        });

        self.imp().scroller.replace(Some(scrolled.clone()));
    }

    pub fn open(&self, source: DocumentSource) {
        self.cancel_scroll_animation();
        self.clear();
        let ticket = self.imp().viewer.borrow_mut().open(source.clone());
        self.emit_state_changed();

        // Let the loading indicator paint before decoding
        let view_weak = self.downgrade();
        glib::idle_add_local_once(move || {
            if let Some(view) = view_weak.upgrade() {
                let result = view.decode(&source);
                let events = view.imp().viewer.borrow_mut().finish_load(ticket, result);
                view.handle_events(events);
            }
        });
    }

    fn decode(&self, source: &DocumentSource) -> Result<DocumentInfo, DecodeError> {
        let decoder = self.imp().decoder.borrow();
        let decoder = decoder
            .as_ref()
            .ok_or_else(|| DecodeError::Backend("pdfium is not available".to_string()))?;

        let document = decoder.decode(source)?;
        let info = document.info();
        self.imp().document.replace(Some(document));
        Ok(info)
    }

    pub fn dispatch(&self, action: ViewerAction) {
        let events = self.imp().viewer.borrow_mut().dispatch(action);
        self.handle_events(events);
    }

    pub fn download(&self, handler: &dyn DownloadHandler) -> Result<(), ExportError> {
        self.imp().viewer.borrow().download(handler)
    }

    fn handle_events(&self, events: Vec<ViewerEvent>) {
        for event in events {
            match event {
                ViewerEvent::Scroll(command) => self.animate_scroll(command),
                ViewerEvent::RelayoutRequired { zoom } => {
                    debug!(zoom, "relayout");
                    self.rebuild_pages();
                }
                ViewerEvent::CurrentPageChanged(page) => debug!(page, "current page"),
            }
        }
        self.emit_state_changed();
    }

    fn emit_state_changed(&self) {
        self.emit_by_name::<()>("state-changed", &[]);
    }

    fn clear(&self) {
        while let Some(child) = self.first_child() {
            self.remove(&child);
        }
        self.imp().page_pictures.borrow_mut().clear();
        self.imp().rendered_pages.borrow_mut().clear();
        self.imp().document.replace(None);
    }

    /// Create a placeholder Picture with the correct size (no pixel allocation)
    fn create_placeholder(width: i32, height: i32) -> Picture {
        let picture = Picture::builder()
            .can_shrink(false)
            .width_request(width)
            .height_request(height)
            .build();
        picture.add_css_class("page-placeholder");
        picture
    }

    /// Size placeholders for the current zoom and register the new regions
    fn rebuild_pages(&self) {
        self.cancel_scroll_animation();
        let events = {
            let viewer = self.imp().viewer.borrow();
            let Some(info) = viewer.document().info() else {
                return;
            };
            let layout = viewer.layout();
            let zoom = viewer.zoom_scale();

            let mut pictures = self.imp().page_pictures.borrow_mut();
            if pictures.len() != info.page_count() {
                while let Some(child) = self.first_child() {
                    self.remove(&child);
                }
                pictures.clear();
                for page in &info.page_sizes {
                    let size = layout.rendered_size(page, zoom);
                    let picture = Self::create_placeholder(size.width, size.height);
                    self.append(&picture);
                    pictures.push(picture);
                }
            } else {
                for (picture, page) in pictures.iter().zip(&info.page_sizes) {
                    let size = layout.rendered_size(page, zoom);
                    picture.set_width_request(size.width);
                    picture.set_height_request(size.height);
                    picture.set_paintable(gtk::gdk::Paintable::NONE);
                    picture.add_css_class("page-placeholder");
                }
            }
            drop(pictures);
            self.imp().rendered_pages.borrow_mut().clear();

            let regions = viewer.layout_regions(|page| RegionHandle::new(page as u64));
            drop(viewer);
            self.imp().viewer.borrow_mut().register_page_regions(regions)
        };

        self.handle_events(events);
        self.schedule_measure();
    }

    fn viewport_rect(&self) -> Option<ViewportRect> {
        let scroller = self.imp().scroller.borrow();
        let adjustment = scroller.as_ref()?.vadjustment();
        Some(ViewportRect::new(adjustment.value(), adjustment.page_size()))
    }

    /// Visibility is evaluated at most once per main loop iteration
    fn schedule_measure(&self) {
        let imp = self.imp();
        if imp.pending_measure.get() {
            return;
        }
        imp.pending_measure.set(true);

        let view_weak = self.downgrade();
        glib::idle_add_local_once(move || {
            if let Some(view) = view_weak.upgrade() {
                view.imp().pending_measure.set(false);
                view.measure();
            }
        });
    }

    fn measure(&self) {
        let Some(rect) = self.viewport_rect() else {
            return;
        };
        let events = self.imp().viewer.borrow_mut().on_viewport_changed(rect);
        if !events.is_empty() {
            self.handle_events(events);
        }
        self.render_visible_pages();
    }

    fn setup_scroll_tracking(&self) {
        let view_weak = self.downgrade();
        let scroll_controller =
            gtk::EventControllerScroll::new(gtk::EventControllerScrollFlags::VERTICAL);

        scroll_controller.connect_scroll(move |_, _, _| {
            if let Some(view) = view_weak.upgrade() {
                view.on_user_scroll();
            }
            glib::Propagation::Proceed
        });

        self.add_controller(scroll_controller);
    }

    /// A scrollbar drag (or anything else) moved the view mid-animation
    fn check_foreign_scroll(&self, value: f64) {
        let foreign = self
            .imp()
            .animation
            .borrow()
            .as_ref()
            .is_some_and(|animation| animation.is_foreign(value));
        if foreign {
            self.on_user_scroll();
        }
    }

    fn on_user_scroll(&self) {
        if self.imp().scroll_animation.borrow().is_none() {
            return;
        }
        self.cancel_scroll_animation();
        let events = self.imp().viewer.borrow_mut().on_user_scroll();
        self.handle_events(events);
    }

    fn cancel_scroll_animation(&self) {
        self.imp().animation.replace(None);
        if let Some(source) = self.imp().scroll_animation.take() {
            source.remove();
        }
    }

    /// Ease the scroll position towards the command's offset, then report the
    /// scroll as settled.
    fn animate_scroll(&self, command: ScrollCommand) {
        self.cancel_scroll_animation();
        let Some(adjustment) = self
            .imp()
            .scroller
            .borrow()
            .as_ref()
            .map(ScrolledWindow::vadjustment)
        else {
            return;
        };

        let duration_ms = self.imp().viewer.borrow().config().scroll_animation_ms;
        let animation = ScrollAnimation::new(
            adjustment.value(),
            &command,
            duration_ms,
            FRAME.as_millis() as u64,
        );
        self.imp().animation.replace(Some(animation));

        let view_weak = self.downgrade();
        let source = glib::timeout_add_local(FRAME, move || {
            let Some(view) = view_weak.upgrade() else {
                return glib::ControlFlow::Break;
            };

            let max_value = (adjustment.upper() - adjustment.page_size()).max(0.0);
            let step = view
                .imp()
                .animation
                .borrow_mut()
                .as_mut()
                .and_then(|animation| {
                    let value = animation.step(max_value)?;
                    Some((value, animation.is_finished()))
                });
            let Some((value, finished)) = step else {
                view.imp().scroll_animation.replace(None);
                return glib::ControlFlow::Break;
            };
            adjustment.set_value(value);

            if !finished {
                return glib::ControlFlow::Continue;
            }

            view.imp().scroll_animation.replace(None);
            view.imp().animation.replace(None);
            view.measure();
            let events = view.imp().viewer.borrow_mut().on_scroll_settled();
            view.handle_events(events);
            glib::ControlFlow::Break
        });
        self.imp().scroll_animation.replace(Some(source));
    }

    /// Render only the pages that are currently visible (plus a page of buffer)
    fn render_visible_pages(&self) {
        let visible: Vec<usize> = self.with_viewer(|viewer| {
            viewer
                .viewport()
                .regions()
                .iter()
                .filter(|region| region.intersecting)
                .map(|region| region.index - 1)
                .collect()
        });
        let (Some(first), Some(last)) = (visible.first().copied(), visible.last().copied()) else {
            return;
        };

        let page_pictures = self.imp().page_pictures.borrow();
        let end = (last + 1).min(page_pictures.len().saturating_sub(1));
        let zoom = self.with_viewer(|viewer| viewer.zoom_scale());
        let base_width = self.with_viewer(|viewer| viewer.layout().base_width);
        let width = (base_width * zoom).round() as i32;

        let document = self.imp().document.borrow();
        let Some(document) = document.as_ref() else {
            return;
        };
        let mut rendered = self.imp().rendered_pages.borrow_mut();

        for index in first.saturating_sub(1)..=end {
            if rendered.contains(&index) {
                continue;
            }
            let Some(picture) = page_pictures.get(index) else {
                continue;
            };
            match document.render_page(index, width) {
                Ok(page) => {
                    picture.set_paintable(Some(&texture_from_page(&page)));
                    picture.remove_css_class("page-placeholder");
                    rendered.insert(index);
                }
                Err(err) => warn!(page = index + 1, %err, "could not render page"),
            }
        }
    }
}

impl Default for PageView {
    fn default() -> Self {
        Self::new()
    }
}

fn texture_from_page(page: &RenderedPage) -> gtk::gdk::MemoryTexture {
    let bytes = glib::Bytes::from(&page.pixels);
    gtk::gdk::MemoryTexture::new(
        page.width,
        page.height,
        gtk::gdk::MemoryFormat::B8g8r8a8,
        &bytes,
        page.stride,
    )
}
