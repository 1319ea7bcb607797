use super::{run_loop, Author, ChatMessage, MessageContent, MessageId};
use crate::audio::source::EventSender;
use crate::audio::{AudioSpec, EngineFactory, PlayerUpdate, PlayerView, RoutedEvent, SharedClock};
use crate::config::Settings;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, instrument};

pub const HOST_LOG_TARGET: &str = "r_chatplay::chat::host";

/// Requests the UI layer sends to the host.
#[derive(Debug)]
pub enum HostCommand {
    PostMessage {
        sender: Author,
        content: MessageContent,
        respond: Option<oneshot::Sender<MessageId>>,
    },
    TogglePlay {
        message_id: MessageId,
    },
    /// A click on the waveform at `fraction` of its width.
    SeekFraction {
        message_id: MessageId,
        fraction: f64,
    },
    RemoveMessage {
        message_id: MessageId,
    },
    GetView {
        message_id: MessageId,
        respond: oneshot::Sender<Option<PlayerView>>,
    },
    Shutdown,
}

/// Owns the conversation and every player in it.
///
/// All player state is mutated from the host task only: UI commands and
/// player events (ticks, engine reports) are both funnelled into `run`.
pub struct PlayerHost {
    pub(super) tick_interval: Duration,
    pub(super) clock: SharedClock,
    pub(super) engines: Arc<dyn EngineFactory>,

    pub(super) messages: BTreeMap<MessageId, ChatMessage>,
    pub(super) next_message_id: MessageId,

    pub(super) command_rx: mpsc::Receiver<HostCommand>,
    pub(super) event_tx: EventSender,
    pub(super) event_rx: mpsc::UnboundedReceiver<RoutedEvent>,
    pub(super) update_tx: broadcast::Sender<PlayerUpdate>,
}

impl PlayerHost {
    /// Creates the host and the sender used to drive it.
    /// Run the host in its own task with `PlayerHost::run`.
    pub fn new(
        settings: &Settings,
        clock: SharedClock,
        engines: Arc<dyn EngineFactory>,
    ) -> (Self, mpsc::Sender<HostCommand>) {
        let (command_tx, command_rx) = mpsc::channel(settings.command_buffer.max(1));
        let (update_tx, _) = broadcast::channel(settings.update_capacity.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let host = PlayerHost {
            tick_interval: settings.tick_interval(),
            clock,
            engines,
            messages: BTreeMap::new(),
            next_message_id: 1,
            command_rx,
            event_tx,
            event_rx,
            update_tx,
        };
        (host, command_tx)
    }

    /// Subscribes to player updates for every message.
    pub fn subscribe_updates(&self) -> broadcast::Receiver<PlayerUpdate> {
        self.update_tx.subscribe()
    }

    #[instrument(skip(self), name = "player_host_run")]
    pub async fn run(&mut self) {
        debug!(target: HOST_LOG_TARGET, "Starting host with {} message(s).", self.messages.len());
        run_loop::run_host_loop(self).await;
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.get(&id)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Cloneable front for a running host.
#[derive(Debug, Clone)]
pub struct HostHandle {
    tx: mpsc::Sender<HostCommand>,
}

impl HostHandle {
    pub fn new(tx: mpsc::Sender<HostCommand>) -> Self {
        HostHandle { tx }
    }

    /// Posts a text message. Returns `None` if the host has stopped.
    pub async fn post_text(&self, sender: Author, text: impl Into<String>) -> Option<MessageId> {
        self.post(sender, MessageContent::Text(text.into())).await
    }

    /// Posts an audio message. Returns `None` if the host has stopped.
    pub async fn post_audio(&self, sender: Author, spec: AudioSpec) -> Option<MessageId> {
        self.post(sender, MessageContent::Audio(spec)).await
    }

    async fn post(&self, sender: Author, content: MessageContent) -> Option<MessageId> {
        let (respond, rx) = oneshot::channel();
        self.tx
            .send(HostCommand::PostMessage { sender, content, respond: Some(respond) })
            .await
            .ok()?;
        rx.await.ok()
    }

    pub async fn toggle_play(&self, message_id: MessageId) -> bool {
        self.tx.send(HostCommand::TogglePlay { message_id }).await.is_ok()
    }

    pub async fn seek_fraction(&self, message_id: MessageId, fraction: f64) -> bool {
        self.tx.send(HostCommand::SeekFraction { message_id, fraction }).await.is_ok()
    }

    pub async fn remove(&self, message_id: MessageId) -> bool {
        self.tx.send(HostCommand::RemoveMessage { message_id }).await.is_ok()
    }

    /// Current view of a message's player, `None` for text messages,
    /// unknown ids, or a stopped host.
    pub async fn view(&self, message_id: MessageId) -> Option<PlayerView> {
        let (respond, rx) = oneshot::channel();
        self.tx.send(HostCommand::GetView { message_id, respond }).await.ok()?;
        rx.await.ok().flatten()
    }

    pub async fn shutdown(&self) -> bool {
        self.tx.send(HostCommand::Shutdown).await.is_ok()
    }
}
