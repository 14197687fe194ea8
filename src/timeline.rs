use crate::srt::Cue;

use std::cell::Cell;

use tracing::{trace, warn};

/// Sorted cues of one subtitle track.
///
/// Lookups keep a cursor on the last cue they landed on, so that forward
/// playback resolves in constant time per frame. The cursor only affects how
/// fast [`Timeline::active_at`] answers, never what it answers.
#[derive(Debug, Clone)]
pub struct Timeline {
    cues: Vec<Cue>,
    cursor: Cell<usize>,
}

impl Timeline {
    pub fn new(mut cues: Vec<Cue>) -> Self {
        // Stable, so cues sharing a start time keep document order.
        cues.sort_by_key(|c| c.start_ms);

        let overlaps = cues
            .windows(2)
            .filter(|pair| pair[1].start_ms < pair[0].end_ms)
            .count();
        if overlaps > 0 {
            warn!(
                overlaps,
                "Subtitle cues overlap in time; only one of them is shown at any moment"
            );
        }

        Self {
            cues,
            cursor: Cell::new(0),
        }
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// The latest point at which any cue is still visible.
    pub fn end_ms(&self) -> Option<i64> {
        self.cues.iter().map(|c| c.end_ms).max()
    }

    /// Returns the cue shown at `t_ms`, if any.
    pub fn active_at(&self, t_ms: i64) -> Option<&Cue> {
        if self.cues.is_empty() {
            return None;
        }

        let mut cursor = self.cursor.get();
        if let Some(cue) = self.cues.get(cursor) {
            if cue.is_active(t_ms) {
                return Some(cue);
            }
        }

        while cursor + 1 < self.cues.len() && self.cues[cursor].end_ms <= t_ms {
            cursor += 1;
            self.cursor.set(cursor);
            let cue = &self.cues[cursor];
            if cue.is_active(t_ms) {
                return Some(cue);
            }
        }

        // Number of cues starting at or before `t_ms`.
        let upper = self.cues.partition_point(|c| c.start_ms <= t_ms);
        trace!(t_ms, from = cursor, upper, "Cue cursor fell back to binary search");
        if upper == 0 {
            self.cursor.set(0);
            return None;
        }

        let index = upper - 1;
        self.cursor.set(index);
        let cue = &self.cues[index];
        if cue.is_active(t_ms) {
            Some(cue)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor.get()
    }
}
