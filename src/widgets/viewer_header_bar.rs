use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{Button, Entry, HeaderBar, Label};
use std::cell::Cell;

use crate::viewer::ToolbarState;

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct ViewerHeaderBar {
        pub header_bar: HeaderBar,
        pub open_button: Button,
        pub download_button: Button,
        pub prev_button: Button,
        pub next_button: Button,
        pub page_entry: Entry,
        pub page_count_label: Label,
        pub zoom_out_button: Button,
        pub zoom_in_button: Button,
        pub zoom_label: Label,
        /// Set while the toolbar writes the entry itself
        pub syncing: Cell<bool>,
        pub entry_focused: Cell<bool>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for ViewerHeaderBar {
        const NAME: &'static str = "PagewiseHeaderBar";
        type Type = super::ViewerHeaderBar;
        type ParentType = glib::Object;
    }

    impl ObjectImpl for ViewerHeaderBar {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }
    }
}

glib::wrapper! {
    /// Toolbar with page navigation, the page field and zoom controls
    pub struct ViewerHeaderBar(ObjectSubclass<imp::ViewerHeaderBar>);
}

impl ViewerHeaderBar {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        imp.header_bar.set_show_title_buttons(true);

        imp.open_button.set_label("Open PDF");
        imp.header_bar.pack_start(&imp.open_button);

        // Page navigation
        let pages = gtk::Box::new(gtk::Orientation::Horizontal, 4);
        imp.prev_button.set_icon_name("go-up-symbolic");
        imp.prev_button.set_tooltip_text(Some("Previous page"));
        imp.next_button.set_icon_name("go-down-symbolic");
        imp.next_button.set_tooltip_text(Some("Next page"));
        imp.page_entry.set_width_chars(4);
        imp.page_entry.set_max_width_chars(6);
        imp.page_entry.set_alignment(1.0);
        imp.page_entry.set_input_purpose(gtk::InputPurpose::Digits);
        imp.page_count_label.set_text("/ -");
        imp.page_count_label.add_css_class("dim-label");

        let focus = gtk::EventControllerFocus::new();
        let header_weak = self.downgrade();
        focus.connect_enter(move |_| {
            if let Some(header) = header_weak.upgrade() {
                header.imp().entry_focused.set(true);
            }
        });
        let header_weak = self.downgrade();
        focus.connect_leave(move |_| {
            if let Some(header) = header_weak.upgrade() {
                header.imp().entry_focused.set(false);
            }
        });
        imp.page_entry.add_controller(focus);

        pages.append(&imp.prev_button);
        pages.append(&imp.page_entry);
        pages.append(&imp.page_count_label);
        pages.append(&imp.next_button);

        // Zoom
        let zoom = gtk::Box::new(gtk::Orientation::Horizontal, 4);
        zoom.set_margin_start(12);
        imp.zoom_out_button.set_icon_name("zoom-out-symbolic");
        imp.zoom_out_button.set_tooltip_text(Some("Zoom out"));
        imp.zoom_in_button.set_icon_name("zoom-in-symbolic");
        imp.zoom_in_button.set_tooltip_text(Some("Zoom in"));
        imp.zoom_label.set_width_chars(5);

        zoom.append(&imp.zoom_out_button);
        zoom.append(&imp.zoom_label);
        zoom.append(&imp.zoom_in_button);

        let title = gtk::Box::new(gtk::Orientation::Horizontal, 0);
        title.append(&pages);
        title.append(&zoom);
        imp.header_bar.set_title_widget(Some(&title));

        imp.download_button.set_icon_name("folder-download-symbolic");
        imp.download_button.set_tooltip_text(Some("Download"));
        imp.header_bar.pack_end(&imp.download_button);
    }

    /// Returns the HeaderBar widget to be used with set_titlebar()
    pub fn widget(&self) -> &HeaderBar {
        &self.imp().header_bar
    }

    pub fn open_button(&self) -> &Button {
        &self.imp().open_button
    }

    pub fn download_button(&self) -> &Button {
        &self.imp().download_button
    }

    pub fn prev_button(&self) -> &Button {
        &self.imp().prev_button
    }

    pub fn next_button(&self) -> &Button {
        &self.imp().next_button
    }

    pub fn page_entry(&self) -> &Entry {
        &self.imp().page_entry
    }

    pub fn zoom_out_button(&self) -> &Button {
        &self.imp().zoom_out_button
    }

    pub fn zoom_in_button(&self) -> &Button {
        &self.imp().zoom_in_button
    }

    /// True while [`Self::sync`] is rewriting the page entry
    pub fn is_syncing(&self) -> bool {
        self.imp().syncing.get()
    }

    /// Show a snapshot of the viewer's state in the toolbar
    pub fn sync(&self, state: &ToolbarState) {
        let imp = self.imp();

        // Let the user empty the field while typing a new number
        let current = imp.page_entry.text();
        let clearing = imp.entry_focused.get() && current.is_empty();
        if current.as_str() != state.page_field_text && !clearing {
            imp.syncing.set(true);
            imp.page_entry.set_text(&state.page_field_text);
            imp.syncing.set(false);
        }
        imp.page_entry.set_sensitive(state.has_document);
        imp.page_count_label.set_text(&state.page_count_label);

        imp.prev_button.set_sensitive(state.can_go_prev);
        imp.next_button.set_sensitive(state.can_go_next);

        imp.zoom_label.set_text(&state.zoom_label);
        imp.zoom_out_button.set_sensitive(!state.zoom_at_min);
        imp.zoom_in_button.set_sensitive(!state.zoom_at_max);

        imp.download_button.set_sensitive(state.has_document);
    }
}

impl Default for ViewerHeaderBar {
    fn default() -> Self {
        Self::new()
    }
}
