use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("Cannot read subtitles from '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl SubtitleError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SubtitleError::Parse {
            line,
            message: message.into(),
        }
    }
}
