//! Audio playback: the real and simulated players behind one contract

pub mod clock;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod format;
pub mod media_engine;
pub mod progress;
pub mod real;
pub mod simulated;
pub mod source;
#[cfg(test)]
pub(crate) mod testing;
mod tick;

pub use clock::{Clock, ManualClock, SharedClock, TokioClock};
pub use engine::{EngineEvent, EngineEventSink, EngineFactory, MediaEngine};
pub use error::{AudioError, PlaybackError};
pub use format::{format_duration, progress_percent};
pub use media_engine::{SymphoniaEngine, SymphoniaEngineFactory};
pub use progress::{PlaybackEvent, PlaybackState, PlayerUpdate, PlayerView};
pub use real::{RealMediaPhase, RealMediaPlayer};
pub use simulated::SimulatedPlayer;
pub use source::{AudioSpec, PlaybackSource, RoutedEvent, SourceEvent};
