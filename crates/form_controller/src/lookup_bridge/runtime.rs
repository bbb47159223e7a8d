use std::sync::Arc;

use lookup_client::LookupTransport;
use tokio::{
    sync::mpsc::{Receiver, Sender},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{controller::events::LookupEvent, lookup_bridge::commands::LookupCommand};

/// Runs until the command sender is dropped. Every fetched request gets its
/// own task and is never cancelled; its completion is always posted, even if
/// nobody is listening any more.
pub fn spawn_lookup_worker(
    transport: Arc<dyn LookupTransport>,
    mut cmd_rx: Receiver<LookupCommand>,
    event_tx: Sender<LookupEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                LookupCommand::Fetch(request) => {
                    let transport = Arc::clone(&transport);
                    let event_tx = event_tx.clone();
                    tokio::spawn(async move {
                        let kind = request.kind;
                        let result = transport.lookup(&request).await;
                        info!(kind = kind.name(), ok = result.is_ok(), "lookup finished");
                        if event_tx
                            .send(LookupEvent::Completed { kind, result })
                            .await
                            .is_err()
                        {
                            debug!(kind = kind.name(), "lookup completion dropped: controller gone");
                        }
                    });
                }
            }
        }
        debug!("lookup worker stopped: command queue closed");
    })
}
