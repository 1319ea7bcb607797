use crate::audio::format::{format_duration, progress_percent};
use crate::chat::MessageId;
use tokio::sync::broadcast;
use tracing::{debug, trace};

pub const LOG_TARGET: &str = "r_chatplay::audio::progress";

/// Transport state of one audio message, owned by its player.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_seconds: f64,
    /// `None` until the duration is resolved.
    pub total_seconds: Option<f64>,
}

impl PlaybackState {
    pub fn progress_percent(&self) -> Option<f64> {
        progress_percent(self.current_seconds, self.total_seconds)
    }
}

/// Everything the message view needs to draw a player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub is_playing: bool,
    pub progress_percent: Option<f64>,
    pub elapsed_label: String,
    /// Set once the player entered its terminal error state.
    pub error: Option<String>,
}

impl PlayerView {
    pub(crate) fn build(state: &PlaybackState, label_seconds: f64, error: Option<&str>) -> Self {
        Self {
            is_playing: state.is_playing,
            progress_percent: state.progress_percent(),
            elapsed_label: format_duration(label_seconds),
            error: error.map(str::to_owned),
        }
    }

    /// Icon name used by the chat view for the play button.
    pub fn button_icon(&self) -> &'static str {
        if self.is_playing {
            "pause_circle"
        } else {
            "play_circle_filled"
        }
    }
}

/// The logical event behind an update.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Initialized,
    DurationResolved { total_seconds: f64 },
    Progress { current_seconds: f64 },
    PlayingChanged { is_playing: bool },
    Ended,
    Failed { message: String },
}

/// Broadcast to the chat view, one per logical event.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerUpdate {
    pub message_id: MessageId,
    pub event: PlaybackEvent,
    pub view: PlayerView,
}

/// Sends a player's updates, tagged with its message id.
#[derive(Debug, Clone)]
pub struct Notifier {
    message_id: MessageId,
    tx: broadcast::Sender<PlayerUpdate>,
}

impl Notifier {
    pub fn new(message_id: MessageId, tx: broadcast::Sender<PlayerUpdate>) -> Self {
        Self { message_id, tx }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn notify(&self, event: PlaybackEvent, view: PlayerView) {
        let update = PlayerUpdate {
            message_id: self.message_id,
            event,
            view,
        };
        trace!(target: LOG_TARGET, "Broadcasting player update: {:?}", update);
        if self.tx.send(update).is_err() {
            // Nobody is rendering this message right now.
            debug!(target: LOG_TARGET, message_id = self.message_id, "No active listeners for player update.");
        }
    }
}
