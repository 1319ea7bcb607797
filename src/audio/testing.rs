//! Scripted engine used by unit tests to drive `RealMediaPlayer` by hand.

use crate::audio::engine::{EngineEventSink, EngineFactory, MediaEngine};
use crate::audio::error::AudioError;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load,
    Play,
    Pause,
    SetPosition(f64),
    Shutdown,
}

/// Records every call; the test plays the engine's part by sending
/// events through the captured sink.
pub struct ScriptedEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl ScriptedEngine {
    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MediaEngine for ScriptedEngine {
    fn load(&mut self) -> Result<(), AudioError> {
        self.record(EngineCall::Load);
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.record(EngineCall::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.record(EngineCall::Pause);
        Ok(())
    }

    fn set_position(&mut self, seconds: f64) -> Result<(), AudioError> {
        self.record(EngineCall::SetPosition(seconds));
        Ok(())
    }

    fn shutdown(&mut self) {
        self.record(EngineCall::Shutdown);
    }
}

#[derive(Default, Clone)]
pub struct ScriptedFactory {
    pub calls: Arc<Mutex<Vec<EngineCall>>>,
    pub sinks: Arc<Mutex<Vec<(String, EngineEventSink)>>>,
}

impl ScriptedFactory {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    /// Sink of the most recently created engine.
    pub fn last_sink(&self) -> EngineEventSink {
        self.sinks.lock().unwrap().last().map(|(_, sink)| sink.clone()).unwrap()
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self, locator: &str, sink: EngineEventSink) -> Box<dyn MediaEngine> {
        self.sinks.lock().unwrap().push((locator.to_string(), sink));
        Box::new(ScriptedEngine {
            calls: self.calls.clone(),
        })
    }
}
