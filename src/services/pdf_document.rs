use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use crate::document::{DecodeError, DecodedDocument, DocumentDecoder, DocumentSource};
use crate::viewport::PageSize;

/// Bind the pdfium library once for the whole process.
///
/// Looks next to the executable's working directory first, then falls back to
/// the system library. The instance is leaked so documents can borrow it for
/// `'static`.
pub fn bind_pdfium() -> Result<&'static Pdfium, DecodeError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|err| {
            debug!(%err, "no bundled pdfium, trying the system library");
            Pdfium::bind_to_system_library()
        })
        .map_err(|err| DecodeError::Backend(format!("failed to bind to pdfium: {}", err)))?;

    info!("pdfium bound");
    Ok(Box::leak(Box::new(Pdfium::new(bindings))))
}

/// Bitmap of one rendered page, BGRA
pub struct RenderedPage {
    pub width: i32,
    pub height: i32,
    pub stride: usize,
    pub pixels: Vec<u8>,
}

/// Decodes PDF sources with pdfium
pub struct PdfiumDecoder {
    pdfium: &'static Pdfium,
}

impl PdfiumDecoder {
    pub fn new(pdfium: &'static Pdfium) -> Self {
        Self { pdfium }
    }
}

impl DocumentDecoder for PdfiumDecoder {
    type Document = PdfiumDocument;

    fn decode(&self, source: &DocumentSource) -> Result<PdfiumDocument, DecodeError> {
        let document = match source {
            DocumentSource::Path(path) => self.pdfium.load_pdf_from_file(path, None),
            other => {
                let bytes = super::source::load_bytes(other)?;
                self.pdfium.load_pdf_from_byte_vec(bytes, None)
            }
        }
        .map_err(|err| DecodeError::Backend(err.to_string()))?;

        let document = PdfiumDocument::new(document);
        info!(
            name = %source.display_name(),
            pages = document.page_count(),
            "document decoded"
        );
        Ok(document)
    }
}

/// A decoded PDF with its page sizes read up front
pub struct PdfiumDocument {
    document: PdfDocument<'static>,
    page_sizes: Vec<PageSize>,
}

impl PdfiumDocument {
    fn new(document: PdfDocument<'static>) -> Self {
        let page_sizes = document
            .pages()
            .iter()
            .map(|page| PageSize::new(page.width().value as f64, page.height().value as f64))
            .collect();
        Self {
            document,
            page_sizes,
        }
    }

    /// Render a page (0-based) at the given pixel width
    pub fn render_page(&self, index: usize, width: i32) -> Result<RenderedPage, DecodeError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|err| DecodeError::Backend(format!("page {}: {}", index + 1, err)))?;

        let config = PdfRenderConfig::new()
            .set_target_width(width.max(1))
            .set_format(PdfBitmapFormat::BGRA);

        let bitmap = page.render_with_config(&config).map_err(|err| {
            warn!(page = index + 1, %err, "render failed");
            DecodeError::Backend(err.to_string())
        })?;

        let width = bitmap.width();
        let height = bitmap.height();
        Ok(RenderedPage {
            width,
            height,
            stride: (width * 4) as usize,
            pixels: bitmap.as_raw_bytes(),
        })
    }
}

impl DecodedDocument for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    fn page_size(&self, index: usize) -> Option<PageSize> {
        self.page_sizes.get(index).copied()
    }
}
