//! Command orchestration from prompt input to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns `false` when the queue is
/// gone and the prompt should stop.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued prompt->backend command");
            status.clear();
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "Command queue is full; please retry".to_string();
            true
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend worker stopped; restart the console".to_string();
            false
        }
    }
}
