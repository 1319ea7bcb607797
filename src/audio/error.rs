use std::io;
use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

/// Failures reported by a media engine. These never cross the playback
/// contract: a player turns them into its terminal error state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Unsupported locator: {0}")]
    UnsupportedLocator(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing codec parameters: {0}")]
    MissingCodecParams(&'static str),

    #[error("Engine is not running: {0}")]
    EngineStopped(String),
}

impl From<SymphoniaError> for AudioError {
    fn from(e: SymphoniaError) -> Self {
        match e {
            SymphoniaError::IoError(io_err) => AudioError::IoError(io_err.to_string()),
            SymphoniaError::Unsupported(what) => AudioError::UnsupportedFormat(what.to_string()),
            other => AudioError::DecodingError(other.to_string()),
        }
    }
}

impl From<io::Error> for AudioError {
    fn from(e: io::Error) -> Self {
        AudioError::IoError(e.to_string())
    }
}

impl From<url::ParseError> for AudioError {
    fn from(e: url::ParseError) -> Self {
        AudioError::UnsupportedLocator(e.to_string())
    }
}

/// Reasons a transport operation was rejected. Rejections leave the player
/// in a renderable state; callers log them and move on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Total duration is not known yet")]
    DurationUnknown,

    #[error("Invalid seek target: {0}")]
    InvalidSeekTarget(f64),

    #[error("Player is in a terminal state: {0}")]
    Terminated(String),
}
