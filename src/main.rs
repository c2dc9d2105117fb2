use anyhow::Context;
use gtk::prelude::*;
use gtk::{Application, glib};
use pdfium_render::prelude::Pdfium;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pagewise::error::ViewerError;
use pagewise::services::pdf_document::bind_pdfium;
use pagewise::widgets::ViewerWindow;
use pagewise::{DocumentSource, ViewerConfig};

const APP_ID: &str = "org.gtk_rs.pagewise";

fn main() -> glib::ExitCode {
    init_tracing();

    let config = load_config();
    let initial = std::env::args().nth(1).map(|arg| DocumentSource::from_arg(&arg));

    let pdfium = match init_pdfium() {
        Ok(pdfium) => Some(pdfium),
        Err(err) => {
            warn!("{:#}", err);
            None
        }
    };

    let app = Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        let window = ViewerWindow::new(app, config.clone());
        match pdfium {
            Some(pdfium) => window.set_pdfium(pdfium),
            None => window.show_error(&ViewerError::Decode(
                pagewise::DecodeError::Backend("pdfium library not found".to_string()),
            )),
        }
        if let Some(source) = initial.clone() {
            window.open(source);
        }
        window.present();
    });

    // The document argument is handled above; GTK only gets the program name
    app.run_with_args(&[env!("CARGO_PKG_NAME")])
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagewise=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config() -> ViewerConfig {
    match ViewerConfig::load() {
        Ok(config) => {
            info!(?config, "configuration loaded");
            config
        }
        Err(err) => {
            warn!(%err, "using default configuration");
            ViewerConfig::default()
        }
    }
}

fn init_pdfium() -> anyhow::Result<&'static Pdfium> {
    bind_pdfium().context("PDF rendering is unavailable")
}
