use super::{Author, ChatMessage, MessageBody, MessageContent, MessageId, PlayerHost, HOST_LOG_TARGET};
use crate::audio::source::SourceContext;
use crate::audio::{PlaybackEvent, PlaybackSource, PlayerUpdate, PlayerView, RoutedEvent};
use std::time::SystemTime;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, trace, warn};

#[instrument(skip(host, content, respond))]
pub fn handle_post_message(
    host: &mut PlayerHost,
    sender: Author,
    content: MessageContent,
    respond: Option<oneshot::Sender<MessageId>>,
) {
    let id = host.next_message_id;
    host.next_message_id += 1;

    let body = match content {
        MessageContent::Text(text) => MessageBody::Text(text),
        MessageContent::Audio(spec) => {
            let engines = host.engines.clone();
            let ctx = SourceContext {
                message_id: id,
                clock: host.clock.clone(),
                tick_interval: host.tick_interval,
                events: host.event_tx.clone(),
                updates: host.update_tx.clone(),
                engines: engines.as_ref(),
            };
            let source = PlaybackSource::build(&spec, ctx);
            let update = PlayerUpdate {
                message_id: id,
                event: PlaybackEvent::Initialized,
                view: source.view(),
            };
            // No subscribers is fine, the view stays queryable.
            let _ = host.update_tx.send(update);
            MessageBody::Audio(source)
        }
    };

    info!(target: HOST_LOG_TARGET, message_id = id, "Posted message.");
    host.messages.insert(
        id,
        ChatMessage {
            id,
            sender,
            timestamp: SystemTime::now(),
            body,
        },
    );

    if let Some(respond) = respond {
        let _ = respond.send(id);
    }
}

fn audio_of(host: &mut PlayerHost, message_id: MessageId) -> Option<&mut PlaybackSource> {
    let source = host.messages.get_mut(&message_id).and_then(ChatMessage::audio_mut);
    if source.is_none() {
        warn!(target: HOST_LOG_TARGET, message_id, "No audio player for message.");
    }
    source
}

#[instrument(skip(host))]
pub fn handle_toggle_play(host: &mut PlayerHost, message_id: MessageId) {
    let Some(source) = audio_of(host, message_id) else {
        return;
    };
    if let Err(e) = source.toggle_play() {
        warn!(target: HOST_LOG_TARGET, message_id, "Toggle rejected: {}", e);
    }
}

#[instrument(skip(host))]
pub fn handle_seek_fraction(host: &mut PlayerHost, message_id: MessageId, fraction: f64) {
    let Some(source) = audio_of(host, message_id) else {
        return;
    };
    match source.seek_fraction(fraction) {
        Ok(position) => debug!(target: HOST_LOG_TARGET, message_id, "Seeked to {:.2}s.", position),
        Err(e) => warn!(target: HOST_LOG_TARGET, message_id, "Seek rejected: {}", e),
    }
}

#[instrument(skip(host))]
pub fn handle_remove_message(host: &mut PlayerHost, message_id: MessageId) {
    match host.messages.remove(&message_id) {
        Some(mut message) => {
            if let Some(source) = message.audio_mut() {
                source.dispose();
            }
            info!(target: HOST_LOG_TARGET, message_id, "Removed message.");
        }
        None => warn!(target: HOST_LOG_TARGET, message_id, "Remove for unknown message."),
    }
}

pub fn handle_get_view(host: &PlayerHost, message_id: MessageId) -> Option<PlayerView> {
    host.messages
        .get(&message_id)
        .and_then(ChatMessage::audio)
        .map(PlaybackSource::view)
}

/// Routes a tick or engine report to the player it belongs to.
pub fn handle_routed_event(host: &mut PlayerHost, routed: RoutedEvent) {
    match host.messages.get_mut(&routed.message_id).and_then(ChatMessage::audio_mut) {
        Some(source) => source.handle_event(routed.event),
        None => trace!(
            target: HOST_LOG_TARGET,
            message_id = routed.message_id,
            "Dropping event for removed message: {:?}",
            routed.event
        ),
    }
}

/// Disposes every player. Used when the host stops.
pub fn dispose_all(host: &mut PlayerHost) {
    for message in host.messages.values_mut() {
        if let Some(source) = message.audio_mut() {
            source.dispose();
        }
    }
}
