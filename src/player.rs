//! The frame-driven playback loop.
//!
//! Every tick decodes one frame, shifts the video time by the subtitle offset,
//! looks up the active cue and hands it to the renderer. User input is applied
//! between ticks and becomes visible on the next one.

use crate::offset::TimingOffset;
use crate::render::{CueRenderer, Frame};
use crate::srt::Cue;
use crate::timeline::Timeline;

use std::collections::VecDeque;

use tracing::{debug, info};

pub const SEEK_STEP_MS: i64 = 5000;
pub const NUDGE_STEP_MS: i64 = 100;

const ESCAPE: char = '\u{1b}';

/// A decoded video stream, positioned by time.
pub trait VideoSource {
    /// Decodes the next frame into `frame`. Returns `false` once the stream is exhausted.
    fn read(&mut self, frame: &mut Frame) -> bool;
    /// Presentation time of the most recently read frame.
    fn time_ms(&self) -> i64;
    fn seek_ms(&mut self, t_ms: i64);
    fn fps(&self) -> f64;
    fn duration_ms(&self) -> i64;
}

/// Blank frames at a constant rate, for playing subtitles without a decoder.
#[derive(Debug, Clone)]
pub struct SyntheticVideo {
    fps: f64,
    duration_ms: i64,
    next_frame: i64,
    time_ms: i64,
}

impl SyntheticVideo {
    /// `fps` must be positive and finite.
    pub fn new(fps: f64, duration_ms: i64) -> Self {
        debug_assert!(fps.is_finite() && fps > 0.0, "invalid frame rate {}", fps);
        Self {
            fps,
            duration_ms: duration_ms.max(0),
            next_frame: 0,
            time_ms: 0,
        }
    }

    fn frame_time(&self, index: i64) -> i64 {
        (index as f64 * 1000.0 / self.fps).round() as i64
    }
}

impl VideoSource for SyntheticVideo {
    fn read(&mut self, frame: &mut Frame) -> bool {
        let t = self.frame_time(self.next_frame);
        if t >= self.duration_ms {
            return false;
        }
        frame.clear();
        self.time_ms = t;
        self.next_frame += 1;
        true
    }

    fn time_ms(&self) -> i64 {
        self.time_ms
    }

    fn seek_ms(&mut self, t_ms: i64) {
        let t_ms = t_ms.clamp(0, self.duration_ms);
        self.next_frame = (t_ms as f64 * self.fps / 1000.0).floor() as i64;
        self.time_ms = t_ms;
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn duration_ms(&self) -> i64 {
        self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    /// Jump the video by the given amount.
    Seek(i64),
    /// Shift subtitles relative to the video.
    NudgeSubtitles(i64),
    ResetSubtitles,
    Quit,
}

impl Command {
    pub fn from_key(key: char) -> Option<Self> {
        let command = match key {
            ' ' => Command::TogglePause,
            'a' | 'A' => Command::Seek(-SEEK_STEP_MS),
            'd' | 'D' => Command::Seek(SEEK_STEP_MS),
            'j' | 'J' => Command::NudgeSubtitles(-NUDGE_STEP_MS),
            'k' | 'K' => Command::NudgeSubtitles(NUDGE_STEP_MS),
            '0' => Command::ResetSubtitles,
            'q' | 'Q' | ESCAPE => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Whether the playback loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Source of user commands, polled once per presented frame.
pub trait Input {
    fn poll(&mut self, video_ms: i64) -> Option<Command>;
}

/// Commands delivered once the video reaches a given time.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pending: VecDeque<(i64, Command)>,
}

impl ScriptedInput {
    pub fn new(mut commands: Vec<(i64, Command)>) -> Self {
        commands.sort_by_key(|(at_ms, _)| *at_ms);
        Self {
            pending: commands.into(),
        }
    }
}

impl Input for ScriptedInput {
    fn poll(&mut self, video_ms: i64) -> Option<Command> {
        let due = matches!(self.pending.front(), Some((at_ms, _)) if *at_ms <= video_ms);
        if due {
            self.pending.pop_front().map(|(_, command)| command)
        } else {
            None
        }
    }
}

/// What was shown on a presented frame.
#[derive(Debug, Clone, Copy)]
pub struct Status<'a> {
    pub video_ms: i64,
    pub display_ms: i64,
    pub offset_ms: i64,
    pub paused: bool,
    pub cue: Option<&'a Cue>,
}

pub struct Player<V, R> {
    video: V,
    subtitles: Option<Timeline>,
    renderer: R,
    timing: TimingOffset,
    paused: bool,
    needs_refresh: bool,
    decoded: Frame,
    frame: Frame,
}

impl<V: VideoSource, R: CueRenderer> Player<V, R> {
    pub fn new(video: V, subtitles: Option<Timeline>, renderer: R, frame: Frame) -> Self {
        Self {
            video,
            subtitles,
            renderer,
            timing: TimingOffset::default(),
            paused: false,
            needs_refresh: false,
            decoded: frame.clone(),
            frame,
        }
    }

    pub fn with_timing(mut self, timing: TimingOffset) -> Self {
        self.timing = timing;
        self
    }

    pub fn timing(&self) -> &TimingOffset {
        &self.timing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn display_time_ms(&self) -> i64 {
        self.timing.apply(self.video.time_ms())
    }

    pub fn status(&self) -> Status<'_> {
        let display_ms = self.display_time_ms();
        Status {
            video_ms: self.video.time_ms(),
            display_ms,
            offset_ms: self.timing.offset_ms(),
            paused: self.paused,
            cue: self
                .subtitles
                .as_ref()
                .and_then(|subs| subs.active_at(display_ms)),
        }
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        debug!(?command, "Handling command");
        match command {
            Command::TogglePause => self.paused = !self.paused,
            Command::Seek(delta_ms) => {
                let target = self.video.time_ms().saturating_add(delta_ms);
                self.video.seek_ms(target);
                self.needs_refresh = true;
            }
            Command::NudgeSubtitles(delta_ms) => self.timing.increase(delta_ms),
            Command::ResetSubtitles => self.timing.reset(),
            Command::Quit => return Flow::Exit,
        }
        Flow::Continue
    }

    /// Advances playback by one frame and composes the subtitle overlay.
    pub fn tick(&mut self) -> Flow {
        if self.paused {
            if self.needs_refresh {
                self.video.read(&mut self.decoded);
                self.needs_refresh = false;
            }
        } else {
            if !self.video.read(&mut self.decoded) {
                return Flow::Exit;
            }
            self.needs_refresh = false;
        }

        self.frame.clone_from(&self.decoded);
        if let Some(subs) = &self.subtitles {
            let display_ms = self.timing.apply(self.video.time_ms());
            if let Some(cue) = subs.active_at(display_ms) {
                self.renderer.draw(&mut self.frame, cue);
            }
        }
        Flow::Continue
    }

    /// Plays until the video ends or a `Quit` command arrives.
    ///
    /// Stops as well when paused with no further input, since nothing could
    /// resume playback.
    pub fn run<I, P>(&mut self, input: &mut I, mut present: P)
    where
        I: Input,
        P: FnMut(&Frame, &Status),
    {
        info!(
            fps = self.video.fps(),
            duration_ms = self.video.duration_ms(),
            cues = self.subtitles.as_ref().map_or(0, Timeline::len),
            "Playback started"
        );
        loop {
            if self.tick() == Flow::Exit {
                info!(video_ms = self.video.time_ms(), "End of video");
                break;
            }
            present(&self.frame, &self.status());

            match input.poll(self.video.time_ms()) {
                Some(command) => {
                    if self.handle(command) == Flow::Exit {
                        info!(video_ms = self.video.time_ms(), "Playback stopped by user");
                        break;
                    }
                }
                None if self.paused && !self.needs_refresh => {
                    info!(video_ms = self.video.time_ms(), "Paused with no pending input");
                    break;
                }
                None => {}
            }
        }
    }
}
