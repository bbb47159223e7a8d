//! Commands queued from the controller to the lookup worker.

use shared::protocol::LookupRequest;

#[derive(Debug, Clone)]
pub enum LookupCommand {
    Fetch(LookupRequest),
}
