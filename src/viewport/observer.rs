use std::collections::HashMap;

use tracing::trace;

use super::region::{PageRegion, ViewportRect};

/// Number of evenly spaced visibility thresholds (0%, 10%, ..., 100%)
pub const THRESHOLD_COUNT: usize = 11;

/// Identifies one generation of visibility observation.
///
/// Every registration of page regions gets a fresh id; batches produced under
/// an older id are stale and must not touch viewer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// A single region's visibility as measured by the observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    /// 1-based page number
    pub index: usize,
    pub ratio: f64,
    pub intersecting: bool,
}

/// Entries delivered together, tagged with the subscription that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityBatch {
    pub subscription: SubscriptionId,
    pub entries: Vec<VisibilityEntry>,
}

pub fn thresholds() -> [f64; THRESHOLD_COUNT] {
    let mut values = [0.0; THRESHOLD_COUNT];
    for (i, value) in values.iter_mut().enumerate() {
        *value = i as f64 / (THRESHOLD_COUNT - 1) as f64;
    }
    values
}

/// Index of the highest threshold the ratio has reached
fn threshold_bucket(ratio: f64) -> usize {
    thresholds()
        .iter()
        .rposition(|threshold| ratio >= *threshold)
        .unwrap_or(0)
}

/// Threshold-based visibility tracking over registered region geometry.
///
/// Mirrors what an intersection observer does: the first measurement after
/// subscribing reports every region, later measurements only report regions
/// whose threshold bucket or intersecting flag changed.
#[derive(Debug, Default)]
pub struct VisibilityObserver {
    active: Option<SubscriptionId>,
    next_generation: u64,
    /// (bucket, intersecting) per page index from the last report
    last_reported: HashMap<usize, (usize, bool)>,
}

impl VisibilityObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retire the current subscription (if any) and start a new one
    pub fn subscribe(&mut self) -> SubscriptionId {
        self.disconnect();
        self.next_generation += 1;
        let id = SubscriptionId(self.next_generation);
        self.active = Some(id);
        trace!(generation = id.0, "visibility subscription started");
        id
    }

    pub fn disconnect(&mut self) {
        if let Some(id) = self.active.take() {
            trace!(generation = id.0, "visibility subscription retired");
        }
        self.last_reported.clear();
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.active
    }

    pub fn is_current(&self, id: SubscriptionId) -> bool {
        self.active == Some(id)
    }

    /// Measure every region against the viewport and return the entries that
    /// crossed a threshold since the last report.
    pub fn measure(
        &mut self,
        viewport: &ViewportRect,
        regions: &[PageRegion],
    ) -> Option<VisibilityBatch> {
        let subscription = self.active?;

        let mut entries = Vec::new();
        for region in regions {
            let ratio = viewport.visible_fraction(&region.geometry);
            let intersecting = viewport.intersects(&region.geometry);
            let state = (threshold_bucket(ratio), intersecting);

            if self.last_reported.get(&region.index) != Some(&state) {
                self.last_reported.insert(region.index, state);
                entries.push(VisibilityEntry {
                    index: region.index,
                    ratio,
                    intersecting,
                });
            }
        }

        if entries.is_empty() {
            return None;
        }

        Some(VisibilityBatch {
            subscription,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::region::{RegionGeometry, RegionHandle};

    fn regions(count: usize, height: f64) -> Vec<PageRegion> {
        (1..=count)
            .map(|index| {
                PageRegion::new(
                    index,
                    RegionHandle::new(index as u64),
                    RegionGeometry::new((index - 1) as f64 * height, height),
                )
            })
            .collect()
    }

    #[test]
    fn test_thresholds_are_evenly_spaced() {
        let values = thresholds();
        assert_eq!(values.len(), 11);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[5], 0.5);
        assert_eq!(values[10], 1.0);
    }

    #[test]
    fn test_threshold_bucket() {
        assert_eq!(threshold_bucket(0.0), 0);
        assert_eq!(threshold_bucket(0.05), 0);
        assert_eq!(threshold_bucket(0.15), 1);
        assert_eq!(threshold_bucket(0.99), 9);
        assert_eq!(threshold_bucket(1.0), 10);
    }

    #[test]
    fn test_measure_without_subscription() {
        let mut observer = VisibilityObserver::new();
        let batch = observer.measure(&ViewportRect::new(0.0, 100.0), &regions(3, 100.0));
        assert!(batch.is_none());
    }

    #[test]
    fn test_first_measure_reports_every_region() {
        let mut observer = VisibilityObserver::new();
        let id = observer.subscribe();

        let batch = observer
            .measure(&ViewportRect::new(0.0, 100.0), &regions(3, 100.0))
            .unwrap();

        assert_eq!(batch.subscription, id);
        assert_eq!(batch.entries.len(), 3);
        assert_eq!(batch.entries[0].ratio, 1.0);
        assert!(batch.entries[0].intersecting);
        assert_eq!(batch.entries[2].ratio, 0.0);
        assert!(!batch.entries[2].intersecting);
    }

    #[test]
    fn test_only_threshold_crossings_are_reported() {
        let mut observer = VisibilityObserver::new();
        observer.subscribe();
        let pages = regions(3, 100.0);

        observer.measure(&ViewportRect::new(15.0, 100.0), &pages);

        // 85% -> 83% and 15% -> 17% stay inside the same buckets
        assert!(observer.measure(&ViewportRect::new(17.0, 100.0), &pages).is_none());

        let batch = observer
            .measure(&ViewportRect::new(25.0, 100.0), &pages)
            .unwrap();
        let indices: Vec<usize> = batch.entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_resubscribe_retires_old_id() {
        let mut observer = VisibilityObserver::new();
        let first = observer.subscribe();
        let second = observer.subscribe();

        assert_ne!(first, second);
        assert!(!observer.is_current(first));
        assert!(observer.is_current(second));

        observer.disconnect();
        assert!(!observer.is_current(second));
        assert!(observer.subscription().is_none());
    }
}
