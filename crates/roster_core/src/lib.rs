use shared::domain::StatusMessage;

pub mod api;
pub mod client;
pub mod config;
pub mod document;
pub mod encoding;
pub mod feedback;
pub mod render;
pub mod sync;

pub use api::{HttpRosterApi, RawResponse, RosterApi, TransportError};
pub use client::{LoadError, MutationError, RosterClient};
pub use document::{ControlId, Document};
pub use feedback::FeedbackController;
pub use sync::{LoadOutcome, MutationReport, SyncController, SyncError, SyncPhase};

/// Notifications for front-ends painting the controller's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    /// The document was rebuilt or a control changed busy state.
    DocumentChanged,
    FeedbackChanged(Option<StatusMessage>),
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
