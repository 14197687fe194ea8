//! Subtitle playback core: timed-text parsing, cue lookup at playback time,
//! user timing offsets and the renderer hand-off used by the player loop.

pub mod error;
pub mod offset;
pub mod parser;
pub mod player;
pub mod render;
pub mod srt;
pub mod timeline;

pub use error::SubtitleError;
pub use offset::TimingOffset;
pub use parser::{parse_file, parse_str};
pub use render::{CueRenderer, Frame, RenderStyle, TextRenderer};
pub use srt::Cue;
pub use timeline::Timeline;
