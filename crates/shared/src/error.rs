use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::LookupKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected before any request was sent.
    Validation,
    /// The lookup service answered but flagged the query.
    Application,
    /// The request could not complete or the body was unusable.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{message}")]
    Validation { kind: LookupKind, message: String },
    #[error("Error: {message}")]
    Application { kind: LookupKind, message: String },
    #[error("{kind} lookup transport failure: {detail}")]
    Transport { kind: LookupKind, detail: String },
}

impl LookupError {
    pub fn validation(kind: LookupKind, message: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            message: message.into(),
        }
    }

    pub fn application(kind: LookupKind, message: impl Into<String>) -> Self {
        Self::Application {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(kind: LookupKind, detail: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            detail: detail.into(),
        }
    }

    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Application { .. } => ErrorKind::Application,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    pub fn lookup_kind(&self) -> LookupKind {
        match self {
            Self::Validation { kind, .. }
            | Self::Application { kind, .. }
            | Self::Transport { kind, .. } => *kind,
        }
    }

    /// Text shown to the user. Transport detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { .. } | Self::Application { .. } => self.to_string(),
            Self::Transport { kind, .. } => format!(
                "Failed to fetch {} data. Check the application log for details.",
                kind.label()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_detail_is_not_shown_to_user() {
        let err = LookupError::transport(LookupKind::ZipCode, "connection refused (os error 111)");
        assert_eq!(err.error_kind(), ErrorKind::Transport);
        assert!(!err.user_message().contains("refused"));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn application_message_is_prefixed() {
        let err = LookupError::application(LookupKind::TaxId, "tax id not found");
        assert_eq!(err.user_message(), "Error: tax id not found");
        assert_eq!(err.lookup_kind(), LookupKind::TaxId);
    }
}
