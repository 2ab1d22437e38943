//! UI/backend events and error modeling for the roster window.

use roster_core::{Document, SyncError};
use shared::domain::StatusMessage;

pub enum UiEvent {
    /// Fresh copy of the page model after a render or busy-state change.
    Document(Document),
    Feedback(Option<StatusMessage>),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Busy,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Signup,
    Remove,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("in flight") || message_lower.contains("busy") {
            UiErrorCategory::Busy
        } else if message_lower.contains("required")
            || message_lower.contains("invalid")
            || message_lower.contains("unreadable")
            || message_lower.contains("malformed")
            || message_lower.contains("must be")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("disconnect")
            || message_lower.contains("queue is full")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Controller refusals carry their own category; the message is only
    /// consulted for everything else.
    pub fn from_sync(context: UiErrorContext, err: &SyncError) -> Self {
        let category = match err {
            SyncError::Busy => UiErrorCategory::Busy,
            SyncError::NotReady
            | SyncError::IncompleteForm
            | SyncError::UnknownControl(_)
            | SyncError::InvalidReference(_) => UiErrorCategory::Validation,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    /// Whether the banner should stay up until the user acts.
    pub fn is_sticky(&self) -> bool {
        self.context == UiErrorContext::BackendStartup
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
