use gtk::gio;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{ApplicationWindow, Overlay, PolicyType, ScrolledWindow};
use pdfium_render::prelude::Pdfium;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::ViewerConfig;
use crate::document::DocumentSource;
use crate::error::ViewerError;
use crate::navigation::ViewerAction;
use crate::services::export::{DownloadHandler, ExportError, FileDownloader, save_artifact};
use crate::viewer::Viewer;
use crate::widgets::{PageView, StatusBar, ViewerHeaderBar};

const CSS: &str = "
.page-placeholder { background-color: white; box-shadow: 0 1px 4px alpha(black, 0.3); }
.status-bar { background-color: alpha(black, 0.7); border-radius: 8px; }
.status-bar-label { color: white; }
.status-error .status-bar { background-color: alpha(@error_color, 0.85); }
";

mod imp {
    use super::*;

    pub struct ViewerWindow {
        pub header_bar: ViewerHeaderBar,
        pub page_view: PageView,
        pub status_bar: StatusBar,
    }

    impl Default for ViewerWindow {
        fn default() -> Self {
            Self {
                header_bar: ViewerHeaderBar::new(),
                page_view: PageView::new(),
                status_bar: StatusBar::new(),
            }
        }
    }

    #[glib::object_subclass]
    impl ObjectSubclass for ViewerWindow {
        const NAME: &'static str = "PagewiseWindow";
        type Type = super::ViewerWindow;
        type ParentType = ApplicationWindow;
    }

    impl ObjectImpl for ViewerWindow {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }
    }

    impl WidgetImpl for ViewerWindow {}
    impl WindowImpl for ViewerWindow {}
    impl ApplicationWindowImpl for ViewerWindow {}
}

glib::wrapper! {
    pub struct ViewerWindow(ObjectSubclass<imp::ViewerWindow>)
        @extends ApplicationWindow, gtk::Window, gtk::Widget,
        @implements gio::ActionGroup, gio::ActionMap, gtk::Accessible, gtk::Buildable,
                    gtk::ConstraintTarget, gtk::Native, gtk::Root, gtk::ShortcutManager;
}

/// Writes the artifact to the file picked in the save dialog
struct SaveTo(PathBuf);

impl DownloadHandler for SaveTo {
    fn download(&self, artifact: &DocumentSource, _suggested_name: &str) -> Result<(), ExportError> {
        save_artifact(artifact, &self.0)
    }
}

impl ViewerWindow {
    pub fn new(app: &gtk::Application, config: ViewerConfig) -> Self {
        let window: Self = glib::Object::builder()
            .property("application", app)
            .property("title", "Pagewise")
            .property("default-width", 1000)
            .property("default-height", 800)
            .build();

        window.imp().page_view.set_config(config);
        window
    }

    pub fn set_pdfium(&self, pdfium: &'static Pdfium) {
        self.imp().page_view.set_pdfium(pdfium);
    }

    pub fn open(&self, source: DocumentSource) {
        self.imp().page_view.open(source);
    }

    pub fn show_error(&self, error: &ViewerError) {
        warn!(%error, "viewer error");
        self.imp().status_bar.show_error(error);
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        load_css();
        self.set_titlebar(Some(imp.header_bar.widget()));

        let scrolled_window = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Automatic)
            .vscrollbar_policy(PolicyType::Automatic)
            .vexpand(true)
            .hexpand(true)
            .child(&imp.page_view)
            .build();
        imp.page_view.attach_scroller(&scrolled_window);

        let overlay = Overlay::new();
        overlay.set_child(Some(&scrolled_window));
        overlay.add_overlay(&imp.status_bar);
        self.set_child(Some(&overlay));

        self.setup_state_sync();
        self.setup_toolbar();
        self.setup_page_entry();
        self.setup_keyboard_controller();
    }

    fn setup_state_sync(&self) {
        let imp = self.imp();

        let header_bar = imp.header_bar.clone();
        let status_bar = imp.status_bar.clone();
        imp.page_view.connect_closure(
            "state-changed",
            false,
            glib::closure_local!(move |view: &PageView| {
                let state = view.with_viewer(Viewer::toolbar_state);
                header_bar.sync(&state);
                status_bar.show_document_status(&state.status);
            }),
        );

        let state = imp.page_view.with_viewer(Viewer::toolbar_state);
        imp.header_bar.sync(&state);
    }

    fn setup_toolbar(&self) {
        let imp = self.imp();
        let header = &imp.header_bar;

        let window_weak = self.downgrade();
        header.open_button().connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.show_open_dialog();
            }
        });

        let window_weak = self.downgrade();
        header.download_button().connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.show_save_dialog();
            }
        });

        let buttons = [
            (header.prev_button(), ViewerAction::PrevPage),
            (header.next_button(), ViewerAction::NextPage),
            (header.zoom_out_button(), ViewerAction::ZoomOut),
            (header.zoom_in_button(), ViewerAction::ZoomIn),
        ];
        for (button, action) in buttons {
            let page_view = imp.page_view.clone();
            button.connect_clicked(move |_| page_view.dispatch(action.clone()));
        }
    }

    fn setup_page_entry(&self) {
        let imp = self.imp();
        let entry = imp.header_bar.page_entry();

        let page_view = imp.page_view.clone();
        let header_weak = imp.header_bar.downgrade();
        entry.connect_changed(move |entry| {
            let Some(header) = header_weak.upgrade() else {
                return;
            };
            if !header.is_syncing() {
                page_view.dispatch(ViewerAction::PageInput(entry.text().to_string()));
            }
        });

        let page_view = imp.page_view.clone();
        entry.connect_activate(move |_| page_view.dispatch(ViewerAction::CommitPageInput));

        let focus = gtk::EventControllerFocus::new();
        let page_view = imp.page_view.clone();
        focus.connect_leave(move |_| page_view.dispatch(ViewerAction::CommitPageInput));
        entry.add_controller(focus);

        let keys = gtk::EventControllerKey::new();
        let page_view = imp.page_view.clone();
        keys.connect_key_pressed(move |_, key, _, _| {
            if key == gtk::gdk::Key::Escape {
                page_view.dispatch(ViewerAction::CancelPageInput);
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });
        entry.add_controller(keys);
    }

    fn setup_keyboard_controller(&self) {
        let controller = gtk::EventControllerKey::new();
        let window_weak = self.downgrade();

        controller.connect_key_pressed(move |_, key, _, modifiers| {
            let Some(window) = window_weak.upgrade() else {
                return glib::Propagation::Proceed;
            };
            let Some(name) = key.name() else {
                return glib::Propagation::Proceed;
            };

            let ctrl = modifiers.contains(gtk::gdk::ModifierType::CONTROL_MASK);
            match ViewerAction::for_key(&name, ctrl) {
                Some(action) => {
                    window.imp().page_view.dispatch(action);
                    glib::Propagation::Stop
                }
                None => glib::Propagation::Proceed,
            }
        });

        self.add_controller(controller);
    }

    fn show_open_dialog(&self) {
        let dialog = gtk::FileDialog::builder().title("Select a PDF").build();
        let window_weak = self.downgrade();

        dialog.open(Some(self), None::<&gio::Cancellable>, move |result| {
            if let Some(window) = window_weak.upgrade() {
                window.handle_open_result(result);
            }
        });
    }

    fn handle_open_result(&self, result: Result<gio::File, glib::Error>) {
        let file = match result {
            Ok(f) => f,
            Err(_) => return,
        };

        let source = match file.path() {
            Some(path) => DocumentSource::Path(path),
            None => DocumentSource::Url(file.uri().to_string()),
        };
        self.open(source);
    }

    fn show_save_dialog(&self) {
        let Some(name) = self
            .imp()
            .page_view
            .with_viewer(|viewer| viewer.suggested_download_name())
        else {
            return;
        };

        let dialog = gtk::FileDialog::builder()
            .title("Save a copy")
            .initial_name(name.as_str())
            .build();
        if let Some(downloads) = FileDownloader::user_downloads() {
            dialog.set_initial_folder(Some(&gio::File::for_path(downloads.directory())));
        }
        let window_weak = self.downgrade();

        dialog.save(Some(self), None::<&gio::Cancellable>, move |result| {
            if let Some(window) = window_weak.upgrade() {
                window.handle_save_result(result);
            }
        });
    }

    fn handle_save_result(&self, result: Result<gio::File, glib::Error>) {
        let Some(path) = result.ok().and_then(|file| file.path()) else {
            return;
        };

        let imp = self.imp();
        match imp.page_view.download(&SaveTo(path.clone())) {
            Ok(()) => {
                info!(path = %path.display(), "download finished");
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                imp.status_bar.show_message(&format!("Saved {}", name));
            }
            Err(err) => self.show_error(&err.into()),
        }
    }

    pub fn header_bar(&self) -> &ViewerHeaderBar {
        &self.imp().header_bar
    }

    pub fn page_view(&self) -> &PageView {
        &self.imp().page_view
    }
}

fn load_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_string(CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
