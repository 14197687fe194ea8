use std::fmt::{self, Write};

/// A span of subtitle text, shown from `start_ms` (inclusive) until `end_ms` (exclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub(crate) start_ms: i64,
    pub(crate) end_ms: i64,
    pub(crate) lines: Vec<String>,
}

impl Cue {
    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_active(&self, t_ms: i64) -> bool {
        self.start_ms <= t_ms && t_ms < self.end_ms
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write_ts(fmt, self.start_ms)?;
        write!(fmt, " --> ")?;
        write_ts(fmt, self.end_ms)?;
        for line in &self.lines {
            write!(fmt, "\n{}", line)?;
        }
        Ok(())
    }
}

pub fn format_ts(timestamp_ms: i64) -> String {
    let mut buf = String::with_capacity(12);
    // Writing into a String cannot fail.
    let _ = write_ts(&mut buf, timestamp_ms);
    buf
}

fn write_ts<W: Write>(buf: &mut W, timestamp_ms: i64) -> fmt::Result {
    let timestamp_ms = timestamp_ms.max(0);
    let total_secs = timestamp_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp_ms % 1000;
    write!(
        buf,
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, millis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_format_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(format_ts(input), expected);
            }
        )*
        }
    }

    test_format_ts! {
        test_format_ts_0: (0, "00:00:00,000"),
        test_format_ts_1: (999, "00:00:00,999"),
        test_format_ts_2: (1001, "00:00:01,001"),
        test_format_ts_3: (60_000, "00:01:00,000"),
        test_format_ts_4: (7_326_159, "02:02:06,159"),
        test_format_ts_5: (360_000_001, "100:00:00,001"),
        test_format_ts_6: (-250, "00:00:00,000"),
    }

    #[test]
    fn active_window_is_half_open() {
        let cue = Cue {
            start_ms: 1000,
            end_ms: 2000,
            lines: vec!["Hello".to_string()],
        };

        assert!(!cue.is_active(999));
        assert!(cue.is_active(1000));
        assert!(cue.is_active(1999));
        assert!(!cue.is_active(2000));
        assert_eq!(cue.duration_ms(), 1000);
    }

    #[test]
    fn display_matches_timing_line_layout() {
        let cue = Cue {
            start_ms: 1000,
            end_ms: 4500,
            lines: vec!["First".to_string(), "Second".to_string()],
        };

        assert_eq!(
            cue.to_string(),
            "00:00:01,000 --> 00:00:04,500\nFirst\nSecond"
        );
    }
}
