//! Drawing subtitle cues on top of video frames.
//!
//! The player only depends on [`CueRenderer`]: it hands over the frame that is
//! about to be shown together with the active cue, and the renderer decides how
//! to lay the text out. [`TextRenderer`] is the renderer used for character-cell
//! frames.

use crate::srt::Cue;

use std::fmt;

/// Something that can overlay a cue on a frame.
///
/// Called at most once per displayed frame, and only when a cue is active.
/// The cue is borrowed for the duration of the call.
pub trait CueRenderer {
    fn draw(&self, frame: &mut Frame, cue: &Cue);
}

/// A character-cell frame buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = ' ');
    }

    /// Writes `text` starting at column `x` of row `y`, clipped to the frame.
    pub fn put_str(&mut self, x: usize, y: usize, text: &str) {
        if y >= self.height {
            return;
        }
        let row = y * self.width;
        for (col, ch) in (x..self.width).zip(text.chars()) {
            self.cells[row + col] = ch;
        }
    }

    /// Fills `len` cells of row `y` starting at column `x`, clipped to the frame.
    pub fn fill(&mut self, x: usize, y: usize, len: usize, ch: char) {
        if y >= self.height {
            return;
        }
        let row = y * self.width;
        let end = x.saturating_add(len).min(self.width);
        for col in x.min(end)..end {
            self.cells[row + col] = ch;
        }
    }

    pub fn row(&self, y: usize) -> Option<String> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        Some(self.cells[start..start + self.width].iter().collect())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height {
            if y > 0 {
                writeln!(fmt)?;
            }
            if let Some(row) = self.row(y) {
                write!(fmt, "{}", row.trim_end())?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    /// Empty cells kept free on every side of the frame.
    pub margin: usize,
    /// Empty rows between two subtitle lines.
    pub line_spacing: usize,
    /// Rows at the bottom kept free for player controls.
    pub reserved_bottom: usize,
    /// Clear one cell around each line so the text stays readable.
    pub draw_box: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            margin: 2,
            line_spacing: 0,
            reserved_bottom: 1,
            draw_box: true,
        }
    }
}

/// Word-wraps every line of `lines` on its own so that each output line
/// measures at most `max_width`.
///
/// Authored line breaks are always kept. A single word wider than
/// `max_width` is put on a line of its own rather than split.
pub fn wrap_lines<F>(lines: &[String], max_width: usize, measure: F) -> Vec<String>
where
    F: Fn(&str) -> usize,
{
    let mut wrapped = Vec::new();

    for line in lines {
        let mut current = String::new();
        for word in line.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                if !current.is_empty() {
                    wrapped.push(current);
                }
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            wrapped.push(current);
        }
    }

    wrapped
}

/// Renders cues as centred text near the bottom of a character frame.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    style: RenderStyle,
}

impl TextRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

impl CueRenderer for TextRenderer {
    fn draw(&self, frame: &mut Frame, cue: &Cue) {
        if frame.is_empty() {
            return;
        }
        let style = &self.style;
        let max_width = match frame.width().checked_sub(2 * style.margin) {
            Some(w) if w > 0 => w,
            _ => return,
        };

        let lines = wrap_lines(cue.lines(), max_width, text_width);
        if lines.is_empty() {
            return;
        }

        let total_height = lines.len() + (lines.len() - 1) * style.line_spacing;
        let mut y = frame
            .height()
            .saturating_sub(style.margin + style.reserved_bottom + total_height)
            .max(style.margin);

        for line in &lines {
            if y >= frame.height() {
                break;
            }
            let width = text_width(line);
            let x = frame.width().saturating_sub(width) / 2;
            if style.draw_box {
                frame.fill(x.saturating_sub(1), y, width + 2, ' ');
            }
            frame.put_str(x, y, line);
            y += 1 + style.line_spacing;
        }
    }
}
