// src/audio/tick.rs

use crate::audio::source::{EventSender, RoutedEvent, SourceEvent};
use crate::chat::MessageId;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, instrument, trace};

const LOG_TARGET: &str = "r_chatplay::audio::tick";

/// Owned handle to the periodic task driving a simulated player.
///
/// The task only posts `SourceEvent::Tick` into the host's event queue; all
/// state changes happen when the host hands the tick back to the player.
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct TickDriver {
    task_handle: JoinHandle<()>,
    message_id: MessageId,
    generation: u64,
}

impl TickDriver {
    /// Spawns a tick task. The first tick fires one `period` after the call.
    #[instrument(skip(events), fields(message_id = message_id, generation = generation))]
    pub fn spawn(
        message_id: MessageId,
        generation: u64,
        period: Duration,
        events: EventSender,
    ) -> Self {
        debug!(target: LOG_TARGET, "Spawning tick task every {:?}", period);
        let task_handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let event = RoutedEvent {
                    message_id,
                    event: SourceEvent::Tick { generation },
                };
                if events.send(event).is_err() {
                    // Host is gone; nothing left to drive.
                    trace!(target: LOG_TARGET, message_id = message_id, "Event queue closed, tick task exiting.");
                    break;
                }
            }
        });

        Self {
            task_handle,
            message_id,
            generation,
        }
    }

    /// Cancels the tick task. Ticks already queued keep their old
    /// generation and are discarded by the player.
    pub fn stop(self) {
        debug!(target: LOG_TARGET, message_id = self.message_id, generation = self.generation, "Stopping tick task.");
        drop(self);
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.task_handle.abort();
    }
}
