use crate::error::SubtitleError;
use crate::srt::Cue;
use crate::timeline::Timeline;

use std::iter::Peekable;
use std::path::Path;
use std::str::Split;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::combinator::{all_consuming, map_res};
use nom::error::{context, convert_error, VerboseError};
use nom::{Err, IResult};
use tracing::debug;

const ARROW: &str = "-->";

/// Reads and parses the subtitle file at `path`.
///
/// Bytes that are not valid UTF-8 are replaced, not rejected.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Timeline, SubtitleError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| SubtitleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&String::from_utf8_lossy(&bytes))
}

/// Parses timed-text content into a [`Timeline`].
///
/// A single malformed block fails the whole parse. Blocks without any text
/// lines are dropped.
pub fn parse_str(input: &str) -> Result<Timeline, SubtitleError> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let mut lines = Lines::new(input);
    let mut cues = Vec::new();
    let mut dropped = 0;

    loop {
        let first = match lines.next_non_blank() {
            Some(line) => line,
            None => break,
        };

        // The index line is optional: only consume another line when the
        // first one cannot be the timing line itself.
        let timing = if first.contains(ARROW) {
            first
        } else {
            lines.next_line().ok_or_else(|| {
                SubtitleError::parse(
                    lines.number + 1,
                    format!("Unexpected end of input after cue index '{}'", first),
                )
            })?
        };
        let (start_ms, end_ms) = timing_line(timing, lines.number)?;

        let mut text = Vec::new();
        while let Some(line) = lines.next_line() {
            if line.is_empty() {
                break;
            }
            text.push(line.to_string());
        }

        if text.is_empty() {
            dropped += 1;
            continue;
        }
        cues.push(Cue {
            start_ms,
            end_ms,
            lines: text,
        });
    }

    debug!(cues = cues.len(), dropped, "Parsed subtitle blocks");
    Ok(Timeline::new(cues))
}

/// Line reader that keeps track of the 1-based number of the last line read.
struct Lines<'a> {
    iter: Peekable<Split<'a, char>>,
    number: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            iter: input.split('\n').peekable(),
            number: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let raw = self.iter.next()?;
        // What follows the final newline is not a line of its own.
        if raw.is_empty() && self.iter.peek().is_none() {
            return None;
        }
        self.number += 1;
        Some(trim(raw.strip_suffix('\r').unwrap_or(raw)))
    }

    fn next_non_blank(&mut self) -> Option<&'a str> {
        while let Some(line) = self.next_line() {
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }
}

/// Trims spaces and tabs only.
fn trim(line: &str) -> &str {
    line.trim_matches(|c: char| c == ' ' || c == '\t')
}

fn timing_line(line: &str, number: usize) -> Result<(i64, i64), SubtitleError> {
    let arrow = line.find(ARROW).ok_or_else(|| {
        SubtitleError::parse(number, format!("Expected a timing line, found '{}'", line))
    })?;
    let start_ms = parse_timestamp(trim(&line[..arrow]), number)?;
    let end_ms = parse_timestamp(trim(&line[arrow + ARROW.len()..]), number)?;
    if end_ms < start_ms {
        return Err(SubtitleError::parse(
            number,
            format!("Cue ends before it starts: '{}'", line),
        ));
    }
    Ok((start_ms, end_ms))
}

fn parse_timestamp(text: &str, number: usize) -> Result<i64, SubtitleError> {
    match all_consuming(timestamp)(text) {
        Ok((_, millis)) => Ok(millis),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => Err(SubtitleError::parse(
            number,
            format!(
                "Bad timestamp '{}', expected HH:MM:SS,mmm\n{}",
                text,
                convert_error(text, err)
            ),
        )),
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

fn two_digits(input: &str) -> IResult<&str, i64, VerboseError<&str>> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<i64>()
    })(input)
}

fn three_digits(input: &str) -> IResult<&str, i64, VerboseError<&str>> {
    map_res(take_while_m_n(3, 3, |c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<i64>()
    })(input)
}

fn timestamp(input: &str) -> IResult<&str, i64, VerboseError<&str>> {
    let (input, hours) = context("hours", two_digits)(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = context("minutes", two_digits)(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = context("seconds", two_digits)(input)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = context("milliseconds", three_digits)(input)?;

    Ok((
        input,
        (hours * 3600 + minutes * 60 + seconds) * 1000 + millis,
    ))
}
