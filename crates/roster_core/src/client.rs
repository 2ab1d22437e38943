//! Interprets roster server responses into snapshots and user-facing text.

use std::sync::Arc;

use shared::{
    domain::ActivityCollection,
    error::ApiError,
    protocol::{MessageResponse, MutationKind},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{RawResponse, RosterApi};

pub const SIGNUP_REJECTED_FALLBACK: &str = "An error occurred";
pub const SIGNUP_TRANSPORT_FAILURE: &str = "Failed to sign up";
pub const UNREGISTER_REJECTED_FALLBACK: &str = "Failed to unregister";
pub const UNREGISTER_TRANSPORT_FAILURE: &str = "Failed to unregister. Please try again.";

pub fn unregister_confirmation(activity: &str, email: &str) -> String {
    format!("Unregistered {email} from {activity}")
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to reach roster server: {0}")]
    Transport(String),
    #[error("roster server answered status {status}")]
    Status { status: u16 },
    #[error("malformed activities payload: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("{} rejected with status {status}", kind.as_str())]
    Rejected {
        kind: MutationKind,
        status: u16,
        detail: Option<String>,
    },
    #[error("{} did not complete: {reason}", kind.as_str())]
    Transport { kind: MutationKind, reason: String },
}

impl MutationError {
    /// Text shown to the user: server detail when the server gave one,
    /// otherwise a fixed fallback for the mutation kind.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Rejected { kind, .. } => match kind {
                MutationKind::Signup => SIGNUP_REJECTED_FALLBACK.to_string(),
                MutationKind::Unregister => UNREGISTER_REJECTED_FALLBACK.to_string(),
            },
            Self::Transport { kind, .. } => match kind {
                MutationKind::Signup => SIGNUP_TRANSPORT_FAILURE.to_string(),
                MutationKind::Unregister => UNREGISTER_TRANSPORT_FAILURE.to_string(),
            },
        }
    }
}

#[derive(Clone)]
pub struct RosterClient {
    api: Arc<dyn RosterApi>,
}

impl RosterClient {
    pub fn new(api: Arc<dyn RosterApi>) -> Self {
        Self { api }
    }

    pub async fn fetch_activities(&self) -> Result<ActivityCollection, LoadError> {
        let response = self
            .api
            .get_activities()
            .await
            .map_err(|err| LoadError::Transport(err.0))?;
        if !response.is_success() {
            return Err(LoadError::Status {
                status: response.status,
            });
        }
        serde_json::from_slice(&response.body).map_err(|err| LoadError::Decode(err.to_string()))
    }

    /// Returns the server's confirmation message.
    pub async fn signup(&self, activity: &str, email: &str) -> Result<String, MutationError> {
        let kind = MutationKind::Signup;
        let response = self
            .api
            .post_signup(activity, email)
            .await
            .map_err(|err| MutationError::Transport {
                kind,
                reason: err.0,
            })?;
        let response = Self::accept(kind, activity, email, response)?;
        let body: MessageResponse =
            serde_json::from_slice(&response.body).map_err(|err| MutationError::Transport {
                kind,
                reason: format!("unreadable confirmation body: {err}"),
            })?;
        Ok(body.message)
    }

    /// Returns a confirmation built from the request itself; the response body
    /// is not consulted on success.
    pub async fn unregister(&self, activity: &str, email: &str) -> Result<String, MutationError> {
        let kind = MutationKind::Unregister;
        let response = self
            .api
            .delete_unregister(activity, email)
            .await
            .map_err(|err| MutationError::Transport {
                kind,
                reason: err.0,
            })?;
        Self::accept(kind, activity, email, response)?;
        Ok(unregister_confirmation(activity, email))
    }

    fn accept(
        kind: MutationKind,
        activity: &str,
        email: &str,
        response: RawResponse,
    ) -> Result<RawResponse, MutationError> {
        if response.is_success() {
            info!(mutation = kind.as_str(), activity, email, "mutation accepted");
            return Ok(response);
        }

        let detail = ApiError::detail_from_body(&response.body);
        warn!(
            mutation = kind.as_str(),
            activity,
            email,
            status = response.status,
            detail = detail.as_deref().unwrap_or_default(),
            "mutation rejected"
        );
        Err(MutationError::Rejected {
            kind,
            status: response.status,
            detail,
        })
    }
}
