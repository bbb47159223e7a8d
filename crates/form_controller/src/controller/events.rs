//! Events flowing from the lookup worker back to the controller owner.

use shared::{domain::LookupKind, protocol::LookupResult};

#[derive(Debug, Clone)]
pub enum LookupEvent {
    /// A dispatched request finished, successfully or not. Exactly one is
    /// delivered per dispatched request.
    Completed {
        kind: LookupKind,
        result: LookupResult,
    },
}

impl LookupEvent {
    pub fn kind(&self) -> LookupKind {
        match self {
            Self::Completed { kind, .. } => *kind,
        }
    }
}
