//! The seam between `RealMediaPlayer` and whatever actually decodes audio.

use crate::audio::error::AudioError;
use crate::audio::source::{EventSender, RoutedEvent, SourceEvent};
use crate::chat::MessageId;
use tracing::trace;

const LOG_TARGET: &str = "r_chatplay::audio::engine";

/// Notifications an engine emits on its own schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Total length of the track became known (seconds).
    DurationResolved(f64),
    /// Playback position moved (seconds).
    TimeAdvanced(f64),
    Started,
    Paused,
    /// Natural end of the track. The engine has already rewound to 0.
    Ended,
    Failed(AudioError),
}

/// Where an engine posts its events. Tags them with the owning message.
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    message_id: MessageId,
    events: EventSender,
}

impl EngineEventSink {
    pub fn new(message_id: MessageId, events: EventSender) -> Self {
        Self { message_id, events }
    }

    /// Returns `false` once the host stopped listening.
    pub fn send(&self, event: EngineEvent) -> bool {
        trace!(target: LOG_TARGET, message_id = self.message_id, "Engine event: {:?}", event);
        self.events
            .send(RoutedEvent {
                message_id: self.message_id,
                event: SourceEvent::Engine(event),
            })
            .is_ok()
    }
}

/// Commands a player issues to its engine. Calls return as soon as the
/// command is queued; outcomes arrive later as `EngineEvent`s.
pub trait MediaEngine: Send {
    /// Starts resolving metadata. Calling it again is a no-op.
    fn load(&mut self) -> Result<(), AudioError>;

    fn play(&mut self) -> Result<(), AudioError>;

    fn pause(&mut self) -> Result<(), AudioError>;

    /// Jumps to `seconds`; the engine reports the new position with a
    /// `TimeAdvanced` event.
    fn set_position(&mut self, seconds: f64) -> Result<(), AudioError>;

    /// Releases the engine. Events already in flight may still arrive.
    fn shutdown(&mut self);
}

/// Builds engines for media locators.
pub trait EngineFactory: Send + Sync {
    fn create(&self, locator: &str, sink: EngineEventSink) -> Box<dyn MediaEngine>;
}
