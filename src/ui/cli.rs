//! Command-line interface implementation

use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::error::Error;

use crate::audio::{PlaybackEvent, PlayerUpdate};
use crate::chat::{Author, MessageId};

/// Command-line arguments for chatplay
#[derive(Parser, Debug)]
#[command(author, version, about = "Chat audio playback demo", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, env = "CHATPLAY_CONFIG")]
    pub config: Option<String>,

    /// Tick interval of the simulated player, in milliseconds
    #[arg(short, long, env = "CHATPLAY_TICK_MS")]
    pub tick_ms: Option<u64>,

    /// Length of the simulated voice message, in seconds
    #[arg(short, long, default_value_t = 5.0, env = "CHATPLAY_MOCK_DURATION")]
    pub mock_duration: f64,

    /// Audio file (path or file:// URL) to post as a real voice message
    #[arg(short = 'f', long, env = "CHATPLAY_MEDIA")]
    pub media: Option<String>,

    /// Jump to this fraction of the simulated message once it plays
    #[arg(short, long, env = "CHATPLAY_SEEK")]
    pub seek: Option<f64>,

    /// Emit logs as JSON lines
    #[arg(long, env = "CHATPLAY_JSON_LOGS")]
    pub json_logs: bool,
}

/// CLI user interface for the demo conversation
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli { args: Args::parse() }
    }

    /// Print a text bubble
    pub fn display_text(&self, author: Author, time_label: &str, text: &str) {
        println!("{}", format_text_line(author, time_label, text));
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_text_line(author: Author, time_label: &str, text: &str) -> String {
    let who = match author {
        Author::User => "you",
        Author::Assistant => "assistant",
    };
    format!("[{}] {:>9}: {}", time_label, who, text)
}

/// Draws one progress bar per audio message from the host's updates.
pub struct ProgressRenderer {
    multi: MultiProgress,
    style: ProgressStyle,
    bars: HashMap<MessageId, ProgressBar>,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Renderer that tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{prefix:>6} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        ProgressRenderer {
            multi: MultiProgress::with_draw_target(target),
            style,
            bars: HashMap::new(),
        }
    }

    pub fn render(&mut self, update: &PlayerUpdate) {
        let bar = match self.bars.get(&update.message_id) {
            Some(bar) => bar.clone(),
            None => {
                let bar = self.multi.add(ProgressBar::new(100));
                bar.set_style(self.style.clone());
                bar.set_prefix(format!("#{}", update.message_id));
                self.bars.insert(update.message_id, bar.clone());
                bar
            }
        };

        let view = &update.view;
        bar.set_position(view.progress_percent.unwrap_or(0.0).round() as u64);
        match (&update.event, &view.error) {
            (PlaybackEvent::Failed { .. }, Some(error)) => bar.abandon_with_message(format!("error: {}", error)),
            _ => bar.set_message(format!("{} {}", view.button_icon(), view.elapsed_label)),
        }
    }

    /// Current bar position of a message, in percent.
    pub fn position(&self, message_id: MessageId) -> Option<u64> {
        self.bars.get(&message_id).map(ProgressBar::position)
    }

    pub fn finish(&mut self) {
        for bar in self.bars.values() {
            if !bar.is_finished() {
                bar.finish();
            }
        }
    }
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}
