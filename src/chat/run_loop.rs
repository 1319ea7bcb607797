use super::{command_handler, HostCommand, PlayerHost, HOST_LOG_TARGET};
use tracing::{info, trace};

/// Runs the host's command and event processing loop.
pub async fn run_host_loop(host: &mut PlayerHost) {
    info!(target: HOST_LOG_TARGET, "Host run loop started.");

    loop {
        tokio::select! {
            biased; // UI commands first

            command = host.command_rx.recv() => {
                let Some(command) = command else {
                    info!(target: HOST_LOG_TARGET, "Command channel closed. Exiting run loop.");
                    break;
                };
                trace!(target: HOST_LOG_TARGET, "Received command: {:?}", command);
                match command {
                    HostCommand::PostMessage { sender, content, respond } => {
                        command_handler::handle_post_message(host, sender, content, respond)
                    }
                    HostCommand::TogglePlay { message_id } => command_handler::handle_toggle_play(host, message_id),
                    HostCommand::SeekFraction { message_id, fraction } => {
                        command_handler::handle_seek_fraction(host, message_id, fraction)
                    }
                    HostCommand::RemoveMessage { message_id } => command_handler::handle_remove_message(host, message_id),
                    HostCommand::GetView { message_id, respond } => {
                        let _ = respond.send(command_handler::handle_get_view(host, message_id));
                    }
                    HostCommand::Shutdown => {
                        info!(target: HOST_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                        break;
                    }
                }
            }

            // The host keeps its own sender, so this never yields `None`.
            Some(routed) = host.event_rx.recv() => {
                command_handler::handle_routed_event(host, routed);
            }
        }
    }

    command_handler::dispose_all(host);
    info!(target: HOST_LOG_TARGET, "Host cleanup complete, {} message(s) disposed.", host.messages.len());
}
