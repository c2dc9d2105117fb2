use super::controller::ScrollCommand;

/// Offsets closer than this to the last written one count as our own write
const OWN_WRITE_TOLERANCE: f64 = 0.5;

/// Ease-out scroll from the current offset to a command's target, one step
/// per frame.
///
/// Remembers the last offset it produced so the host can tell its own writes
/// apart from a scrollbar drag or any other foreign scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnimation {
    start: f64,
    target: f64,
    frames: u64,
    frame: u64,
    last: f64,
}

impl ScrollAnimation {
    pub fn new(start: f64, command: &ScrollCommand, duration_ms: u64, frame_ms: u64) -> Self {
        let frames = if command.smooth && frame_ms > 0 {
            (duration_ms / frame_ms).max(1)
        } else {
            1
        };
        Self {
            start,
            target: command.offset,
            frames,
            frame: 0,
            last: start,
        }
    }

    /// Next offset to write, with the target clamped to `[0, max_offset]`.
    /// `None` once the animation has finished.
    pub fn step(&mut self, max_offset: f64) -> Option<f64> {
        if self.is_finished() {
            return None;
        }
        self.frame += 1;

        let target = self.target.clamp(0.0, max_offset.max(0.0));
        let t = self.frame as f64 / self.frames as f64;
        let eased = 1.0 - (1.0 - t).powi(3);
        self.last = self.start + (target - self.start) * eased;
        Some(self.last)
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.frames
    }

    /// True when `offset` was not written by this animation
    pub fn is_foreign(&self, offset: f64) -> bool {
        (offset - self.last).abs() > OWN_WRITE_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(offset: f64, smooth: bool) -> ScrollCommand {
        ScrollCommand {
            page: 3,
            offset,
            smooth,
        }
    }

    #[test]
    fn test_eases_to_target() {
        let mut animation = ScrollAnimation::new(0.0, &command(1000.0, true), 200, 16);

        let mut offsets = Vec::new();
        while let Some(offset) = animation.step(5000.0) {
            offsets.push(offset);
        }

        assert_eq!(offsets.len(), 12);
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(offsets.last().copied(), Some(1000.0));
        assert!(animation.is_finished());
        assert_eq!(animation.step(5000.0), None);
    }

    #[test]
    fn test_instant_jump_takes_one_frame() {
        let mut animation = ScrollAnimation::new(300.0, &command(1000.0, false), 200, 16);
        assert_eq!(animation.step(5000.0), Some(1000.0));
        assert!(animation.is_finished());
    }

    #[test]
    fn test_target_clamped_to_scroll_range() {
        let mut animation = ScrollAnimation::new(0.0, &command(9000.0, false), 200, 16);
        assert_eq!(animation.step(4000.0), Some(4000.0));
    }

    #[test]
    fn test_detects_scrollbar_drag() {
        let mut animation = ScrollAnimation::new(0.0, &command(1000.0, true), 200, 16);
        assert!(!animation.is_foreign(0.0));

        let written = animation.step(5000.0).unwrap();
        assert!(!animation.is_foreign(written));
        assert!(!animation.is_foreign(written + 0.25));

        // The user dragged the scrollbar back up mid-animation
        assert!(animation.is_foreign(written - 80.0));
        assert!(animation.is_foreign(4500.0));
    }
}
