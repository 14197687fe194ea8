/// User-adjustable bias between video time and subtitle time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingOffset {
    offset_ms: i64,
}

impl TimingOffset {
    pub fn new(offset_ms: i64) -> Self {
        Self { offset_ms }
    }

    pub fn increase(&mut self, delta_ms: i64) {
        self.offset_ms = self.offset_ms.saturating_add(delta_ms);
    }

    pub fn reset(&mut self) {
        self.offset_ms = 0;
    }

    pub fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    /// Maps a playback timestamp to the subtitle display time, never below zero.
    pub fn apply(&self, t_ms: i64) -> i64 {
        t_ms.saturating_add(self.offset_ms).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_results_clamp_to_zero() {
        let offset = TimingOffset::new(-5000);

        assert_eq!(offset.apply(1000), 0);
        assert_eq!(offset.apply(5000), 0);
        assert_eq!(offset.apply(7500), 2500);
    }

    #[test]
    fn increase_accumulates_and_reset_clears() {
        let mut offset = TimingOffset::default();
        offset.increase(100);
        offset.increase(100);
        offset.increase(-300);

        assert_eq!(offset.offset_ms(), -100);
        assert_eq!(offset.apply(1000), 900);

        offset.reset();
        assert_eq!(offset.offset_ms(), 0);
        assert_eq!(offset.apply(1000), 1000);
    }

    #[test]
    fn extreme_offsets_do_not_wrap() {
        let mut offset = TimingOffset::new(i64::MAX);
        offset.increase(1);

        assert_eq!(offset.apply(10), i64::MAX);
        assert_eq!(TimingOffset::new(i64::MIN).apply(10), 0);
    }
}
