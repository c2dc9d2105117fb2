use super::region::{PageRegion, RegionGeometry, RegionHandle};

/// Size of a page in document units (points for PDF)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pixel size of a page rendered at a given zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedSize {
    pub width: i32,
    pub height: i32,
}

/// Vertical stacking of pages in a continuous scroll column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    /// Render width of a page at 100% zoom
    pub base_width: f64,
    /// Gap between consecutive pages
    pub spacing: f64,
}

impl PageLayout {
    pub fn new(base_width: f64, spacing: f64) -> Self {
        Self {
            base_width,
            spacing,
        }
    }

    /// Every page is rendered at the same width; height follows the page's
    /// aspect ratio.
    pub fn rendered_size(&self, page: &PageSize, zoom: f64) -> RenderedSize {
        let width = (self.base_width * zoom).round().max(1.0);
        let height = if page.width > 0.0 {
            (page.height * width / page.width).round().max(1.0)
        } else {
            width
        };
        RenderedSize {
            width: width as i32,
            height: height as i32,
        }
    }

    pub fn geometries(&self, pages: &[PageSize], zoom: f64) -> Vec<RegionGeometry> {
        let mut top = 0.0;
        pages
            .iter()
            .map(|page| {
                let height = self.rendered_size(page, zoom).height as f64;
                let geometry = RegionGeometry::new(top, height);
                top += height + self.spacing;
                geometry
            })
            .collect()
    }

    /// Build one region per page, numbering pages from 1.
    ///
    /// `handle_for` maps a 1-based page number to the rendering surface's
    /// element id.
    pub fn regions<F>(&self, pages: &[PageSize], zoom: f64, handle_for: F) -> Vec<PageRegion>
    where
        F: Fn(usize) -> RegionHandle,
    {
        self.geometries(pages, zoom)
            .into_iter()
            .enumerate()
            .map(|(i, geometry)| PageRegion::new(i + 1, handle_for(i + 1), geometry))
            .collect()
    }
}
