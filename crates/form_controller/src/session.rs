//! Wires a controller to the lookup worker. The session owner drives user
//! events and drains completions on one task; lookups run concurrently.

use std::sync::Arc;

use lookup_client::LookupTransport;
use shared::{domain::LookupKind, error::LookupError};
use tokio::sync::mpsc::{self, error::TryRecvError, Receiver, Sender};

use crate::{
    controller::{events::LookupEvent, orchestration::dispatch_lookup, FormController},
    lookup_bridge::{commands::LookupCommand, runtime::spawn_lookup_worker},
    page::FormPage,
};

const COMMAND_QUEUE_CAPACITY: usize = 16;
const EVENT_QUEUE_CAPACITY: usize = 16;

pub struct FormSession<P: FormPage> {
    controller: FormController<P>,
    cmd_tx: Sender<LookupCommand>,
    event_rx: Receiver<LookupEvent>,
}

impl<P: FormPage> FormSession<P> {
    /// Spawns the lookup worker on the current tokio runtime.
    pub fn start(controller: FormController<P>, transport: Arc<dyn LookupTransport>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        spawn_lookup_worker(transport, cmd_rx, event_tx);
        Self {
            controller,
            cmd_tx,
            event_rx,
        }
    }

    pub fn controller(&self) -> &FormController<P> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FormController<P> {
        &mut self.controller
    }

    pub fn into_controller(self) -> FormController<P> {
        self.controller
    }

    /// Button click. Returns whether a request was actually sent; a disabled
    /// button yields `Ok(false)`.
    pub fn click_search(&mut self, kind: LookupKind) -> Result<bool, LookupError> {
        let Some(request) = self.controller.search(kind)? else {
            return Ok(false);
        };

        if let Err(err) = dispatch_lookup(&self.cmd_tx, request) {
            self.controller.complete_lookup(kind, Err(err.clone()));
            return Err(err);
        }
        Ok(true)
    }

    pub fn apply_event(&mut self, event: LookupEvent) {
        match event {
            LookupEvent::Completed { kind, result } => {
                self.controller.complete_lookup(kind, result);
            }
        }
    }

    /// Waits for the next completion. `None` once the worker has shut down.
    pub async fn next_event(&mut self) -> Option<LookupEvent> {
        self.event_rx.recv().await
    }

    /// Waits for one completion and applies it.
    pub async fn process_next(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.apply_event(event);
                true
            }
            None => false,
        }
    }

    /// Applies every completion already delivered, without waiting.
    pub fn process_ready(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return applied,
            }
        }
    }

    /// Processes completions until no lookup is pending.
    pub async fn settle(&mut self) {
        while self.controller.has_pending_lookup() {
            if !self.process_next().await {
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
