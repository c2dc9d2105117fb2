/// Non-owning reference to the element the rendering surface produced for a page.
///
/// The surface owns the element; the controller only keeps the id so it can
/// match visibility measurements back to a page. Handles are released
/// explicitly when regions are re-registered or torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionHandle(u64);

impl RegionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Vertical extent of a page region in content coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionGeometry {
    pub top: f64,
    pub height: f64,
}

impl RegionGeometry {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            height: height.max(0.0),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The visible window into the scrolled content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    /// Current scroll offset (top edge of the visible area)
    pub offset: f64,
    pub height: f64,
}

impl ViewportRect {
    pub fn new(offset: f64, height: f64) -> Self {
        Self {
            offset,
            height: height.max(0.0),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.offset + self.height
    }

    /// Fraction of `geometry` that lies inside the viewport, in `[0, 1]`.
    pub fn visible_fraction(&self, geometry: &RegionGeometry) -> f64 {
        if geometry.height <= 0.0 {
            return 0.0;
        }
        let overlap = self.bottom().min(geometry.bottom()) - self.offset.max(geometry.top);
        (overlap / geometry.height).clamp(0.0, 1.0)
    }

    /// Edge-adjacent regions count as intersecting, like a zero-area overlap.
    pub fn intersects(&self, geometry: &RegionGeometry) -> bool {
        geometry.top <= self.bottom() && geometry.bottom() >= self.offset
    }
}

/// One page of the document as seen by the viewport controller
#[derive(Debug, Clone, PartialEq)]
pub struct PageRegion {
    /// 1-based page number
    pub index: usize,
    pub handle: RegionHandle,
    pub geometry: RegionGeometry,
    /// Last observed fraction of the region inside the viewport
    pub visibility_ratio: f64,
    /// Last observed intersecting flag
    pub intersecting: bool,
}

impl PageRegion {
    pub fn new(index: usize, handle: RegionHandle, geometry: RegionGeometry) -> Self {
        Self {
            index,
            handle,
            geometry,
            visibility_ratio: 0.0,
            intersecting: false,
        }
    }

    /// Regions with zero overlap but a touching edge are not candidates for
    /// the current page.
    pub fn is_visible(&self) -> bool {
        self.intersecting && self.visibility_ratio > 0.0
    }
}
