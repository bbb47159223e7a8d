//! Hands validated lookup requests to the worker queue.

use shared::{error::LookupError, protocol::LookupRequest};
use tokio::sync::mpsc::{error::TrySendError, Sender};

use crate::lookup_bridge::commands::LookupCommand;

pub fn dispatch_lookup(
    cmd_tx: &Sender<LookupCommand>,
    request: LookupRequest,
) -> Result<(), LookupError> {
    let kind = request.kind;
    match cmd_tx.try_send(LookupCommand::Fetch(request)) {
        Ok(()) => {
            tracing::debug!(kind = kind.name(), "queued lookup command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(LookupError::transport(
            kind,
            "lookup command queue is full; please retry",
        )),
        Err(TrySendError::Closed(_)) => Err(LookupError::transport(
            kind,
            "lookup worker disconnected (possible runtime shutdown)",
        )),
    }
}
