use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use std::cell::RefCell;
use std::time::Duration;

use crate::viewer::DocumentStatus;
use crate::error::ViewerError;

const MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct StatusBar {
        pub label: gtk::Label,
        pub spinner: gtk::Spinner,
        pub message_timeout: RefCell<Option<glib::SourceId>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for StatusBar {
        const NAME: &'static str = "PagewiseStatusBar";
        type Type = super::StatusBar;
        type ParentType = gtk::Box;
    }

    impl ObjectImpl for StatusBar {
        fn constructed(&self) {
            self.parent_constructed();

            let obj = self.obj();

            obj.set_orientation(gtk::Orientation::Horizontal);
            obj.set_halign(gtk::Align::Center);
            obj.set_valign(gtk::Align::End);
            obj.set_margin_bottom(12);

            self.label.set_halign(gtk::Align::Center);
            self.label.add_css_class("status-bar-label");

            let inner_box = gtk::Box::new(gtk::Orientation::Horizontal, 8);
            inner_box.add_css_class("status-bar");
            inner_box.set_margin_start(16);
            inner_box.set_margin_end(16);
            inner_box.set_margin_top(8);
            inner_box.set_margin_bottom(8);
            inner_box.append(&self.spinner);
            inner_box.append(&self.label);

            obj.append(&inner_box);

            // Initially hidden
            obj.set_visible(false);
        }

        fn dispose(&self) {
            if let Some(source) = self.message_timeout.take() {
                source.remove();
            }
        }
    }

    impl WidgetImpl for StatusBar {}
    impl BoxImpl for StatusBar {}
}

glib::wrapper! {
    /// Loading indicator and error line at the bottom of the window.
    ///
    /// Stays up while a document is loading or failed to load; short
    /// messages such as a finished download fade after a few seconds.
    pub struct StatusBar(ObjectSubclass<imp::StatusBar>)
        @extends gtk::Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    /// Set the status text to display
    pub fn set_status_text(&self, text: &str) {
        self.imp().label.set_text(text);

        let should_show = !text.is_empty();
        if self.is_visible() != should_show {
            self.set_visible(should_show);
        }
    }

    /// Reflect the document lifecycle
    pub fn show_document_status(&self, status: &DocumentStatus) {
        let imp = self.imp();
        if imp.message_timeout.borrow().is_some() {
            return;
        }

        match status {
            DocumentStatus::Loading(text) => {
                imp.spinner.set_visible(true);
                imp.spinner.start();
                self.set_status_text(text);
            }
            DocumentStatus::Failed(text) => {
                self.stop_spinner();
                self.set_status_text(text);
                self.add_css_class("status-error");
            }
            DocumentStatus::Clear => {
                self.stop_spinner();
                self.remove_css_class("status-error");
                self.set_status_text("");
            }
        }
    }

    pub fn show_error(&self, error: &ViewerError) {
        self.add_css_class("status-error");
        self.show_message(&error.to_string());
    }

    /// Show a message for a few seconds
    pub fn show_message(&self, text: &str) {
        let imp = self.imp();
        if let Some(source) = imp.message_timeout.take() {
            source.remove();
        }

        self.stop_spinner();
        self.set_status_text(text);

        let bar_weak = self.downgrade();
        let source = glib::timeout_add_local_once(MESSAGE_TIMEOUT, move || {
            if let Some(bar) = bar_weak.upgrade() {
                bar.imp().message_timeout.replace(None);
                bar.remove_css_class("status-error");
                bar.set_status_text("");
            }
        });
        imp.message_timeout.replace(Some(source));
    }

    fn stop_spinner(&self) {
        let spinner = &self.imp().spinner;
        spinner.stop();
        spinner.set_visible(false);
    }
}
