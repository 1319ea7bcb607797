// src/audio/media_engine.rs

use crate::audio::decoder::SymphoniaDecoder;
use crate::audio::engine::{EngineEvent, EngineEventSink, EngineFactory, MediaEngine};
use crate::audio::error::AudioError;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, error, info, instrument, trace};

const LOG_TARGET: &str = "r_chatplay::audio::media_engine";

/// Default spacing between `TimeAdvanced` events while playing.
pub const DEFAULT_TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
enum EngineCommand {
    Play,
    Pause,
    Seek(f64),
}

/// Decodes a local file with symphonia on a blocking worker, pacing packets
/// against their timestamps so positions advance in real time.
pub struct SymphoniaEngine {
    locator: String,
    sink: EngineEventSink,
    time_update_interval: Duration,
    command_tx: Option<Sender<EngineCommand>>,
}

impl SymphoniaEngine {
    pub fn new(locator: &str, sink: EngineEventSink, time_update_interval: Duration) -> Self {
        Self {
            locator: locator.to_string(),
            sink,
            time_update_interval,
            command_tx: None,
        }
    }

    fn send(&self, command: EngineCommand) -> Result<(), AudioError> {
        let tx = self
            .command_tx
            .as_ref()
            .ok_or_else(|| AudioError::EngineStopped(self.locator.clone()))?;
        tx.send(command)
            .map_err(|_| AudioError::EngineStopped(self.locator.clone()))
    }
}

impl MediaEngine for SymphoniaEngine {
    #[instrument(skip(self), fields(locator = %self.locator))]
    fn load(&mut self) -> Result<(), AudioError> {
        if self.command_tx.is_some() {
            trace!(target: LOG_TARGET, "Engine already loading or loaded.");
            return Ok(());
        }
        info!(target: LOG_TARGET, "Spawning decode worker for {}", self.locator);
        let (command_tx, command_rx) = mpsc::channel();
        let locator = self.locator.clone();
        let sink = self.sink.clone();
        let interval = self.time_update_interval;
        // The worker exits on its own once the command sender is dropped.
        task::spawn_blocking(move || {
            run_worker(&locator, &sink, &command_rx, interval);
            debug!(target: LOG_TARGET, "Decode worker for {} finished.", locator);
        });
        self.command_tx = Some(command_tx);
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.load()?;
        self.send(EngineCommand::Play)
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.send(EngineCommand::Pause)
    }

    fn set_position(&mut self, seconds: f64) -> Result<(), AudioError> {
        self.send(EngineCommand::Seek(seconds))
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the worker's receive loop.
        if self.command_tx.take().is_some() {
            debug!(target: LOG_TARGET, locator = %self.locator, "Engine shut down.");
        }
    }
}

impl Drop for SymphoniaEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Position bookkeeping for the worker loop. A decoded packet stays in
/// flight until its end time is reached; only a seek discards it.
#[derive(Debug)]
pub(crate) struct Pacer {
    playing: bool,
    position: f64,
    anchor: Instant,
    anchor_position: f64,
    last_reported: f64,
    in_flight: Option<f64>,
    interval: f64,
}

impl Pacer {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            playing: false,
            position: 0.0,
            anchor: Instant::now(),
            anchor_position: 0.0,
            last_reported: 0.0,
            in_flight: None,
            interval: interval.as_secs_f64(),
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.playing
    }

    pub(crate) fn position(&self) -> f64 {
        self.position
    }

    pub(crate) fn in_flight(&self) -> Option<f64> {
        self.in_flight
    }

    /// Returns `false` if already playing.
    pub(crate) fn start(&mut self) -> bool {
        if self.playing {
            return false;
        }
        self.playing = true;
        self.anchor = Instant::now();
        self.anchor_position = self.position;
        true
    }

    /// Returns `false` if already paused.
    pub(crate) fn pause(&mut self) -> bool {
        std::mem::replace(&mut self.playing, false)
    }

    pub(crate) fn hold(&mut self, packet_end: f64) {
        self.in_flight = Some(packet_end);
    }

    /// Moves to a new position, dropping any packet in flight.
    pub(crate) fn seek_to(&mut self, position: f64) {
        self.in_flight = None;
        self.position = position;
        self.last_reported = position;
        self.anchor = Instant::now();
        self.anchor_position = position;
    }

    /// Wall time at which the stream reaches `position`.
    pub(crate) fn due(&self, position: f64) -> Instant {
        self.anchor + Duration::from_secs_f64((position - self.anchor_position).max(0.0))
    }

    /// Accounts for the packet in flight. Returns the position to report
    /// once at least one interval has passed since the last report.
    pub(crate) fn complete_packet(&mut self) -> Option<f64> {
        let end = self.in_flight.take()?;
        self.position = end;
        if self.position - self.last_reported >= self.interval {
            self.last_reported = self.position;
            return Some(self.position);
        }
        None
    }
}

/// Returns `false` when the worker should stop.
fn apply_command(
    command: EngineCommand,
    decoder: &mut SymphoniaDecoder,
    pacer: &mut Pacer,
    sink: &EngineEventSink,
) -> bool {
    trace!(target: LOG_TARGET, "Worker received command: {:?}", command);
    match command {
        EngineCommand::Play => {
            if pacer.start() {
                return sink.send(EngineEvent::Started);
            }
        }
        EngineCommand::Pause => {
            if pacer.pause() {
                return sink.send(EngineEvent::Paused);
            }
        }
        EngineCommand::Seek(seconds) => match decoder.seek(seconds) {
            Ok(reached) => {
                pacer.seek_to(reached);
                return sink.send(EngineEvent::TimeAdvanced(reached));
            }
            Err(e) => {
                error!(target: LOG_TARGET, "Seek to {} failed: {}", seconds, e);
                sink.send(EngineEvent::Failed(e));
                return false;
            }
        },
    }
    true
}

fn run_worker(locator: &str, sink: &EngineEventSink, commands: &Receiver<EngineCommand>, interval: Duration) {
    let mut decoder = match SymphoniaDecoder::open(locator) {
        Ok(decoder) => decoder,
        Err(e) => {
            error!(target: LOG_TARGET, "Failed to open {}: {}", locator, e);
            sink.send(EngineEvent::Failed(e));
            return;
        }
    };
    if !sink.send(EngineEvent::DurationResolved(decoder.duration_seconds())) {
        return;
    }

    let mut pacer = Pacer::new(interval);
    loop {
        if !pacer.is_playing() {
            match commands.recv() {
                Ok(command) => {
                    if !apply_command(command, &mut decoder, &mut pacer, sink) {
                        return;
                    }
                    continue;
                }
                Err(_) => return,
            }
        }

        let packet_end = match pacer.in_flight() {
            Some(end) => end,
            None => match decoder.next_packet_end() {
                Ok(Some(end)) => {
                    pacer.hold(end);
                    end
                }
                Ok(None) => {
                    info!(target: LOG_TARGET, "Reached end of {}", locator);
                    pacer.pause();
                    if let Err(e) = decoder.seek(0.0) {
                        sink.send(EngineEvent::Failed(e));
                        return;
                    }
                    pacer.seek_to(0.0);
                    if !sink.send(EngineEvent::Ended) {
                        return;
                    }
                    continue;
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "Decoding {} failed: {}", locator, e);
                    sink.send(EngineEvent::Failed(e));
                    return;
                }
            },
        };

        let wait = pacer.due(packet_end).saturating_duration_since(Instant::now());
        match commands.recv_timeout(wait) {
            // The packet stays in flight unless the command was a seek.
            Ok(command) => {
                if !apply_command(command, &mut decoder, &mut pacer, sink) {
                    return;
                }
                continue;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }

        if let Some(position) = pacer.complete_packet() {
            if !sink.send(EngineEvent::TimeAdvanced(position)) {
                return;
            }
        }
    }
}

/// Default factory: every locator is played through symphonia.
#[derive(Debug, Clone)]
pub struct SymphoniaEngineFactory {
    time_update_interval: Duration,
}

impl SymphoniaEngineFactory {
    pub fn new(time_update_interval: Duration) -> Self {
        Self { time_update_interval }
    }
}

impl Default for SymphoniaEngineFactory {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_UPDATE_INTERVAL)
    }
}

impl EngineFactory for SymphoniaEngineFactory {
    fn create(&self, locator: &str, sink: EngineEventSink) -> Box<dyn MediaEngine> {
        Box::new(SymphoniaEngine::new(locator, sink, self.time_update_interval))
    }
}
