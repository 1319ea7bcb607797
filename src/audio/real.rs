// src/audio/real.rs

use crate::audio::engine::{EngineEvent, MediaEngine};
use crate::audio::error::{AudioError, PlaybackError};
use crate::audio::format::clamp_position;
use crate::audio::progress::{Notifier, PlaybackEvent, PlaybackState, PlayerView};
use tracing::{debug, error, info, instrument, trace, warn};

const LOG_TARGET: &str = "r_chatplay::audio::real";

/// Lifecycle of a real media track.
#[derive(Debug, Clone, PartialEq)]
pub enum RealMediaPhase {
    /// Waiting for the engine to report the duration.
    Unresolved,
    Ready,
    Playing,
    Paused,
    Ended,
    /// Terminal. Carries the engine's failure message.
    Error(String),
}

/// A play or pause the engine has not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingTransition {
    Play,
    Pause,
}

/// Player over a decoded media stream. Position and duration only change
/// when the engine reports them.
pub struct RealMediaPlayer {
    locator: String,
    engine: Box<dyn MediaEngine>,
    state: PlaybackState,
    phase: RealMediaPhase,
    pending: Option<PendingTransition>,
    label_seconds: f64,
    notifier: Notifier,
    disposed: bool,
}

impl RealMediaPlayer {
    /// Wraps `engine` and immediately asks it for metadata.
    pub fn new(locator: &str, engine: Box<dyn MediaEngine>, notifier: Notifier) -> Self {
        debug!(target: LOG_TARGET, message_id = notifier.message_id(), "Creating media player for {}", locator);
        let mut player = Self {
            locator: locator.to_string(),
            engine,
            state: PlaybackState::default(),
            phase: RealMediaPhase::Unresolved,
            pending: None,
            label_seconds: 0.0,
            notifier,
            disposed: false,
        };
        if let Err(e) = player.engine.load() {
            player.fail(e);
        }
        player
    }

    #[instrument(skip(self), fields(message_id = self.notifier.message_id(), locator = %self.locator))]
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        self.ensure_live()?;
        if self.pending.is_some() || self.phase == RealMediaPhase::Playing {
            trace!(target: LOG_TARGET, "Play ignored: already playing or transition in flight.");
            return Ok(());
        }
        if self.phase == RealMediaPhase::Unresolved {
            warn!(target: LOG_TARGET, "Play requested before duration is known, requesting metadata.");
            if let Err(e) = self.engine.load() {
                self.fail(e);
            }
            return Err(PlaybackError::DurationUnknown);
        }

        if let Err(e) = self.engine.play() {
            self.fail(e);
            return Err(self.terminated());
        }
        self.pending = Some(PendingTransition::Play);
        debug!(target: LOG_TARGET, "Play sent to engine.");
        Ok(())
    }

    #[instrument(skip(self), fields(message_id = self.notifier.message_id(), locator = %self.locator))]
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        self.ensure_live()?;
        if self.pending.is_some() || self.phase != RealMediaPhase::Playing {
            trace!(target: LOG_TARGET, "Pause ignored: not playing or transition in flight.");
            return Ok(());
        }

        if let Err(e) = self.engine.pause() {
            self.fail(e);
            return Err(self.terminated());
        }
        self.pending = Some(PendingTransition::Pause);
        debug!(target: LOG_TARGET, "Pause sent to engine.");
        Ok(())
    }

    /// Flips between playing and paused. While the engine has not confirmed
    /// the previous transition the call is ignored.
    pub fn toggle_play(&mut self) -> Result<(), PlaybackError> {
        if let Some(pending) = self.pending {
            debug!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Toggle ignored, {:?} still in flight.", pending);
            return Ok(());
        }
        if self.phase == RealMediaPhase::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Sets the engine position. The position and label move at once; the
    /// progress update follows with the engine's next `TimeAdvanced` event.
    #[instrument(skip(self), fields(message_id = self.notifier.message_id(), locator = %self.locator))]
    pub fn seek(&mut self, target: f64) -> Result<f64, PlaybackError> {
        self.ensure_live()?;
        let Some(total) = self.state.total_seconds else {
            warn!(target: LOG_TARGET, "Seek to {} ignored: duration unknown.", target);
            return Err(PlaybackError::DurationUnknown);
        };
        let position = clamp_position(target, total).ok_or(PlaybackError::InvalidSeekTarget(target))?;
        if position != target {
            debug!(target: LOG_TARGET, "Seek target {} clamped to {}", target, position);
        }

        if let Err(e) = self.engine.set_position(position) {
            self.fail(e);
            return Err(self.terminated());
        }
        self.state.current_seconds = position;
        self.label_seconds = position;
        Ok(position)
    }

    /// Applies one engine notification.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if self.disposed {
            trace!(target: LOG_TARGET, "Engine event after dispose ignored: {:?}", event);
            return;
        }
        if let RealMediaPhase::Error(_) = self.phase {
            trace!(target: LOG_TARGET, "Engine event after failure ignored: {:?}", event);
            return;
        }

        match event {
            EngineEvent::DurationResolved(total) => self.on_duration_resolved(total),
            EngineEvent::TimeAdvanced(position) => self.on_time_advanced(position),
            EngineEvent::Started => self.on_started(),
            EngineEvent::Paused => self.on_paused(),
            EngineEvent::Ended => self.on_ended(),
            EngineEvent::Failed(e) => self.fail(e),
        }
    }

    fn on_duration_resolved(&mut self, total: f64) {
        if !total.is_finite() || total <= 0.0 {
            warn!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Engine reported unusable duration {}, staying unresolved.", total);
            return;
        }
        self.state.total_seconds = Some(total);
        self.state.current_seconds = self.state.current_seconds.clamp(0.0, total);
        if self.phase == RealMediaPhase::Unresolved {
            self.phase = RealMediaPhase::Ready;
        }
        self.label_seconds = total;
        info!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Duration resolved: {:.2}s", total);
        self.notify(PlaybackEvent::DurationResolved { total_seconds: total });
    }

    fn on_time_advanced(&mut self, position: f64) {
        let Some(total) = self.state.total_seconds else {
            trace!(target: LOG_TARGET, "Time update before duration is known, ignoring.");
            return;
        };
        let Some(position) = clamp_position(position, total) else {
            return;
        };
        self.state.current_seconds = position;
        self.label_seconds = position;
        self.notify(PlaybackEvent::Progress { current_seconds: position });
    }

    fn on_started(&mut self) {
        self.pending = None;
        if self.phase == RealMediaPhase::Playing {
            return;
        }
        self.phase = RealMediaPhase::Playing;
        self.state.is_playing = true;
        self.notify(PlaybackEvent::PlayingChanged { is_playing: true });
    }

    fn on_paused(&mut self) {
        self.pending = None;
        if self.phase != RealMediaPhase::Playing {
            return;
        }
        self.phase = RealMediaPhase::Paused;
        self.state.is_playing = false;
        self.notify(PlaybackEvent::PlayingChanged { is_playing: false });
    }

    fn on_ended(&mut self) {
        self.pending = None;
        self.phase = RealMediaPhase::Ended;
        self.state.is_playing = false;
        self.state.current_seconds = 0.0;
        // Position rewinds but the label keeps showing the full length.
        self.label_seconds = self.state.total_seconds.unwrap_or(0.0);
        info!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Playback ended.");
        self.notify(PlaybackEvent::Ended);
    }

    fn fail(&mut self, e: AudioError) {
        error!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Audio playback error for {}: {}", self.locator, e);
        let message = e.to_string();
        self.phase = RealMediaPhase::Error(message.clone());
        self.pending = None;
        self.state.is_playing = false;
        self.engine.shutdown();
        self.notify(PlaybackEvent::Failed { message });
    }

    fn ensure_live(&self) -> Result<(), PlaybackError> {
        if self.disposed {
            return Err(PlaybackError::Terminated("player disposed".to_string()));
        }
        if let RealMediaPhase::Error(_) = self.phase {
            debug!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Call ignored, player is in its error state.");
            return Err(self.terminated());
        }
        Ok(())
    }

    fn terminated(&self) -> PlaybackError {
        match &self.phase {
            RealMediaPhase::Error(message) => PlaybackError::Terminated(message.clone()),
            _ => PlaybackError::Terminated("player disposed".to_string()),
        }
    }

    fn notify(&self, event: PlaybackEvent) {
        self.notifier.notify(event, self.view());
    }

    /// Shuts the engine down and makes every later call a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Disposing media player.");
        self.engine.shutdown();
        self.pending = None;
        self.state.is_playing = false;
        self.disposed = true;
    }

    pub fn phase(&self) -> &RealMediaPhase {
        &self.phase
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_seconds
    }

    pub fn total_duration(&self) -> Option<f64> {
        self.state.total_seconds
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_some()
    }

    pub fn view(&self) -> PlayerView {
        let error = match &self.phase {
            RealMediaPhase::Error(message) => Some(message.as_str()),
            _ => None,
        };
        PlayerView::build(&self.state, self.label_seconds, error)
    }
}
