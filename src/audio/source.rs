//! The playback contract seen by the chat host.

use crate::audio::clock::SharedClock;
use crate::audio::engine::{EngineEvent, EngineEventSink, EngineFactory};
use crate::audio::error::PlaybackError;
use crate::audio::progress::{Notifier, PlayerUpdate, PlayerView};
use crate::audio::real::RealMediaPlayer;
use crate::audio::simulated::SimulatedPlayer;
use crate::chat::MessageId;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

const LOG_TARGET: &str = "r_chatplay::audio::source";

/// Locator that selects the simulated player instead of a media file.
pub const MOCK_LOCATOR: &str = "mock";

/// Something that happened to a player outside of a UI call.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Tick { generation: u64 },
    Engine(EngineEvent),
}

/// A `SourceEvent` addressed to the player of one message.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEvent {
    pub message_id: MessageId,
    pub event: SourceEvent,
}

/// Queue feeding tick tasks and engines back into the host loop.
pub type EventSender = mpsc::UnboundedSender<RoutedEvent>;

/// What an audio message plays.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSpec {
    Locator(String),
    Simulated { duration_seconds: Option<f64> },
}

impl AudioSpec {
    /// Maps a message's audio fields to a spec: the `mock` locator plays a
    /// simulation of `duration_seconds`, anything else is a media locator.
    pub fn from_message(locator: &str, duration_seconds: Option<f64>) -> Self {
        if locator == MOCK_LOCATOR {
            AudioSpec::Simulated { duration_seconds }
        } else {
            AudioSpec::Locator(locator.to_string())
        }
    }
}

/// Everything needed to build a player for one message.
pub struct SourceContext<'a> {
    pub message_id: MessageId,
    pub clock: SharedClock,
    pub tick_interval: Duration,
    pub events: EventSender,
    pub updates: broadcast::Sender<PlayerUpdate>,
    pub engines: &'a dyn EngineFactory,
}

/// One audio timeline, real or simulated.
pub enum PlaybackSource {
    RealMedia(RealMediaPlayer),
    Simulated(SimulatedPlayer),
}

impl PlaybackSource {
    pub fn build(spec: &AudioSpec, ctx: SourceContext<'_>) -> Self {
        let notifier = Notifier::new(ctx.message_id, ctx.updates);
        match spec {
            AudioSpec::Locator(locator) => {
                let sink = EngineEventSink::new(ctx.message_id, ctx.events);
                let engine = ctx.engines.create(locator, sink);
                PlaybackSource::RealMedia(RealMediaPlayer::new(locator, engine, notifier))
            }
            AudioSpec::Simulated { duration_seconds } => PlaybackSource::Simulated(SimulatedPlayer::new(
                duration_seconds.unwrap_or(0.0),
                ctx.clock,
                ctx.tick_interval,
                ctx.events,
                notifier,
            )),
        }
    }

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        match self {
            PlaybackSource::RealMedia(player) => player.play(),
            PlaybackSource::Simulated(player) => player.play(),
        }
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        match self {
            PlaybackSource::RealMedia(player) => player.pause(),
            PlaybackSource::Simulated(player) => player.pause(),
        }
    }

    pub fn toggle_play(&mut self) -> Result<(), PlaybackError> {
        match self {
            PlaybackSource::RealMedia(player) => player.toggle_play(),
            PlaybackSource::Simulated(player) => player.toggle_play(),
        }
    }

    /// Seeks to `target` seconds, clamped to the track. Returns the
    /// position applied.
    pub fn seek(&mut self, target: f64) -> Result<f64, PlaybackError> {
        match self {
            PlaybackSource::RealMedia(player) => player.seek(target),
            PlaybackSource::Simulated(player) => player.seek(target),
        }
    }

    /// Seeks to `fraction` of the total duration, as a waveform click does.
    pub fn seek_fraction(&mut self, fraction: f64) -> Result<f64, PlaybackError> {
        if fraction.is_nan() {
            return Err(PlaybackError::InvalidSeekTarget(fraction));
        }
        let total = self.total_duration().ok_or(PlaybackError::DurationUnknown)?;
        self.seek(fraction.clamp(0.0, 1.0) * total)
    }

    pub fn handle_event(&mut self, event: SourceEvent) {
        match (self, event) {
            (PlaybackSource::Simulated(player), SourceEvent::Tick { generation }) => player.on_tick(generation),
            (PlaybackSource::RealMedia(player), SourceEvent::Engine(event)) => player.handle_engine_event(event),
            (_, event) => warn!(target: LOG_TARGET, "Event does not belong to this kind of player: {:?}", event),
        }
    }

    pub fn current_time(&self) -> f64 {
        match self {
            PlaybackSource::RealMedia(player) => player.current_time(),
            PlaybackSource::Simulated(player) => player.current_time(),
        }
    }

    /// `None` until the duration is known.
    pub fn total_duration(&self) -> Option<f64> {
        match self {
            PlaybackSource::RealMedia(player) => player.total_duration(),
            PlaybackSource::Simulated(player) => player.total_duration(),
        }
    }

    pub fn is_playing(&self) -> bool {
        match self {
            PlaybackSource::RealMedia(player) => player.is_playing(),
            PlaybackSource::Simulated(player) => player.is_playing(),
        }
    }

    pub fn view(&self) -> PlayerView {
        match self {
            PlaybackSource::RealMedia(player) => player.view(),
            PlaybackSource::Simulated(player) => player.view(),
        }
    }

    /// Cancels every timer or engine the player owns.
    pub fn dispose(&mut self) {
        match self {
            PlaybackSource::RealMedia(player) => player.dispose(),
            PlaybackSource::Simulated(player) => player.dispose(),
        }
    }
}
