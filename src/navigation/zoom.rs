use crate::config::ZoomConfig;

fn to_percent(scale: f64) -> i64 {
    (scale * 100.0).round() as i64
}

/// Result of a zoom request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomChange {
    pub previous: f64,
    pub current: f64,
}

impl ZoomChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Zoom scale clamped to a configured range.
///
/// Stored as whole percents so repeated steps land exactly on the same values
/// in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomLevel {
    percent: i64,
    min: i64,
    max: i64,
    step: i64,
    default: i64,
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::new(&ZoomConfig::default())
    }
}

impl ZoomLevel {
    pub fn new(config: &ZoomConfig) -> Self {
        let min = to_percent(config.min).max(1);
        let max = to_percent(config.max).max(min);
        let default = to_percent(config.default).clamp(min, max);
        Self {
            percent: default,
            min,
            max,
            step: to_percent(config.step).max(1),
            default,
        }
    }

    /// Current scale factor (1.0 = 100%)
    pub fn scale(&self) -> f64 {
        self.percent as f64 / 100.0
    }

    pub fn percent(&self) -> u32 {
        self.percent as u32
    }

    pub fn step(&self) -> f64 {
        self.step as f64 / 100.0
    }

    pub fn at_min(&self) -> bool {
        self.percent == self.min
    }

    pub fn at_max(&self) -> bool {
        self.percent == self.max
    }

    /// Move the scale by `delta`, clamped to the configured range. A NaN delta
    /// leaves the scale unchanged.
    pub fn adjust(&mut self, delta: f64) -> ZoomChange {
        let previous = self.scale();
        self.percent = self
            .percent
            .saturating_add(to_percent(delta))
            .clamp(self.min, self.max);
        ZoomChange {
            previous,
            current: self.scale(),
        }
    }

    pub fn zoom_in(&mut self) -> ZoomChange {
        self.adjust(self.step())
    }

    pub fn zoom_out(&mut self) -> ZoomChange {
        self.adjust(-self.step())
    }

    pub fn reset(&mut self) -> ZoomChange {
        let previous = self.scale();
        self.percent = self.default;
        ZoomChange {
            previous,
            current: self.scale(),
        }
    }

    /// Label for the zoom indicator, e.g. "110%"
    pub fn label(&self) -> String {
        format!("{}%", self.percent)
    }
}
