//! Chat messages and the host that owns their players

mod command_handler;
mod host;
mod run_loop;

pub use host::{HostCommand, HostHandle, PlayerHost, HOST_LOG_TARGET};

use crate::audio::{AudioSpec, PlaybackSource};
use std::time::{SystemTime, UNIX_EPOCH};

/// Sequential id assigned by the host when a message is posted.
pub type MessageId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

/// Content of a message being posted.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Audio(AudioSpec),
}

/// Content of a posted message. Audio messages own their player.
pub enum MessageBody {
    Text(String),
    Audio(PlaybackSource),
}

pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Author,
    pub timestamp: SystemTime,
    pub body: MessageBody,
}

impl ChatMessage {
    pub fn audio(&self) -> Option<&PlaybackSource> {
        match &self.body {
            MessageBody::Audio(source) => Some(source),
            MessageBody::Text(_) => None,
        }
    }

    pub fn audio_mut(&mut self) -> Option<&mut PlaybackSource> {
        match &mut self.body {
            MessageBody::Audio(source) => Some(source),
            MessageBody::Text(_) => None,
        }
    }

    /// `HH:MM` (UTC) shown under the bubble.
    pub fn time_label(&self) -> String {
        format_clock_time(self.timestamp)
    }
}

/// Formats a wall-clock instant as `HH:MM` in UTC.
pub fn format_clock_time(timestamp: SystemTime) -> String {
    let seconds = timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let minutes_of_day = (seconds / 60) % (24 * 60);
    format!("{:02}:{:02}", minutes_of_day / 60, minutes_of_day % 60)
}
