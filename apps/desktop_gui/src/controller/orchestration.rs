//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub const QUEUE_FULL_STATUS: &str = "UI command queue is full; please retry";
pub const DISCONNECTED_STATUS: &str =
    "Backend command processor disconnected (possible startup/runtime failure); restart the app";

/// Queues `cmd` for the backend worker. Returns whether it was accepted;
/// on refusal `status` explains why.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            *status = QUEUE_FULL_STATUS.to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = DISCONNECTED_STATUS.to_string();
            false
        }
    }
}
