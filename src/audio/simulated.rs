// src/audio/simulated.rs

use crate::audio::clock::SharedClock;
use crate::audio::error::PlaybackError;
use crate::audio::format::clamp_position;
use crate::audio::progress::{Notifier, PlaybackEvent, PlaybackState, PlayerView};
use crate::audio::source::EventSender;
use crate::audio::tick::TickDriver;
use std::time::Duration;
use tracing::{debug, info, instrument, trace, warn};

const LOG_TARGET: &str = "r_chatplay::audio::simulated";

/// Default cadence of the simulation tick.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq)]
enum SimulatedMode {
    Idle,
    /// Position `anchor_position` was reached at clock time `anchor`.
    Playing { anchor: Duration, anchor_position: f64 },
}

/// Timer-driven stand-in for an audio track with a fixed nominal duration.
///
/// Position is computed from the injected clock on every tick, so the
/// player never accumulates per-tick rounding.
pub struct SimulatedPlayer {
    state: PlaybackState,
    mode: SimulatedMode,
    label_seconds: f64,
    clock: SharedClock,
    tick_interval: Duration,
    events: EventSender,
    notifier: Notifier,
    driver: Option<TickDriver>,
    generation: u64,
    disposed: bool,
}

impl SimulatedPlayer {
    /// Creates an idle player. Durations that are not a finite positive
    /// number leave the total unknown and make `play` a no-op.
    pub fn new(
        nominal_seconds: f64,
        clock: SharedClock,
        tick_interval: Duration,
        events: EventSender,
        notifier: Notifier,
    ) -> Self {
        let total_seconds = (nominal_seconds.is_finite() && nominal_seconds > 0.0).then_some(nominal_seconds);
        debug!(target: LOG_TARGET, message_id = notifier.message_id(), "Creating simulated player with duration {:?}", total_seconds);
        Self {
            state: PlaybackState {
                is_playing: false,
                current_seconds: 0.0,
                total_seconds,
            },
            mode: SimulatedMode::Idle,
            label_seconds: total_seconds.unwrap_or(0.0),
            clock,
            tick_interval,
            events,
            notifier,
            driver: None,
            generation: 0,
            disposed: false,
        }
    }

    #[instrument(skip(self), fields(message_id = self.notifier.message_id()))]
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        self.ensure_live()?;
        if self.state.total_seconds.is_none() {
            warn!(target: LOG_TARGET, "Simulated audio has no duration, nothing to play.");
            return Err(PlaybackError::DurationUnknown);
        }
        if self.state.is_playing {
            trace!(target: LOG_TARGET, "Already playing, ignoring play.");
            return Ok(());
        }

        self.start_driver();
        self.state.is_playing = true;
        info!(target: LOG_TARGET, "Simulated playback started at {:.2}s", self.state.current_seconds);
        self.notify(PlaybackEvent::PlayingChanged { is_playing: true });
        Ok(())
    }

    #[instrument(skip(self), fields(message_id = self.notifier.message_id()))]
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        self.ensure_live()?;
        if !self.state.is_playing {
            trace!(target: LOG_TARGET, "Not playing, ignoring pause.");
            return Ok(());
        }

        self.stop_driver();
        self.mode = SimulatedMode::Idle;
        self.state.is_playing = false;
        info!(target: LOG_TARGET, "Simulated playback paused at {:.2}s", self.state.current_seconds);
        self.notify(PlaybackEvent::PlayingChanged { is_playing: false });
        Ok(())
    }

    pub fn toggle_play(&mut self) -> Result<(), PlaybackError> {
        if self.state.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Moves the position to `target` (clamped) and reports it right away.
    /// While playing, the tick is recreated anchored at the new position.
    #[instrument(skip(self), fields(message_id = self.notifier.message_id()))]
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

        self.state.current_seconds = position;
        self.label_seconds = position;
        self.notify(PlaybackEvent::Progress { current_seconds: position });

        if self.state.is_playing {
            self.start_driver();
        }
        Ok(position)
    }

    /// Recomputes the position for a tick of the given generation. Ticks
    /// from a replaced or cancelled driver are ignored.
    pub fn on_tick(&mut self, generation: u64) {
        if self.disposed || generation != self.generation {
            trace!(target: LOG_TARGET, generation, current = self.generation, "Discarding stale tick.");
            return;
        }
        let SimulatedMode::Playing { anchor, anchor_position } = self.mode else {
            trace!(target: LOG_TARGET, "Tick while idle, ignoring.");
            return;
        };
        let Some(total) = self.state.total_seconds else {
            return;
        };

        let elapsed = self.clock.now().saturating_sub(anchor);
        let current = anchor_position + elapsed.as_secs_f64();
        if current >= total {
            self.complete(total);
            return;
        }

        self.state.current_seconds = current;
        self.label_seconds = current;
        self.notify(PlaybackEvent::Progress { current_seconds: current });
    }

    fn complete(&mut self, total: f64) {
        self.stop_driver();
        self.mode = SimulatedMode::Idle;
        self.state.is_playing = false;
        self.state.current_seconds = 0.0;
        // Position rewinds but the label keeps showing the full length.
        self.label_seconds = total;
        info!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Simulated playback finished.");
        self.notify(PlaybackEvent::Ended);
    }

    fn start_driver(&mut self) {
        self.stop_driver();
        self.generation += 1;
        self.mode = SimulatedMode::Playing {
            anchor: self.clock.now(),
            anchor_position: self.state.current_seconds,
        };
        self.driver = Some(TickDriver::spawn(
            self.notifier.message_id(),
            self.generation,
            self.tick_interval,
            self.events.clone(),
        ));
    }

    fn stop_driver(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.stop();
        }
    }

    fn ensure_live(&self) -> Result<(), PlaybackError> {
        if self.disposed {
            return Err(PlaybackError::Terminated("player disposed".to_string()));
        }
        Ok(())
    }

    fn notify(&self, event: PlaybackEvent) {
        self.notifier.notify(event, self.view());
    }

    /// Cancels the tick and makes every later call a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug!(target: LOG_TARGET, message_id = self.notifier.message_id(), "Disposing simulated player.");
        self.stop_driver();
        self.mode = SimulatedMode::Idle;
        self.state.is_playing = false;
        self.disposed = true;
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

    pub fn view(&self) -> PlayerView {
        PlayerView::build(&self.state, self.label_seconds, None)
    }

    /// True while a tick task is owned by this player.
    pub fn has_active_tick(&self) -> bool {
        self.driver.is_some()
    }

    /// Number of tick drivers started so far.
    pub fn tick_generation(&self) -> u64 {
        self.generation
    }
}
