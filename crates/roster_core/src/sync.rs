//! Load → render → mutate → reload cycle.

use std::{collections::HashSet, sync::Arc, time::Duration};

use shared::{
    domain::{ActivityCollection, ParticipantRef, StatusMessage},
    protocol::MutationKind,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    api::RosterApi,
    client::RosterClient,
    document::{ClickAction, ControlId, Document, LOAD_FAILURE_NOTICE},
    encoding::ReferenceError,
    feedback::FeedbackController,
    render::render_roster,
    RosterEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Loading,
    Rendered,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered { activities: usize },
    Failed,
    /// A newer fetch was issued while this one was in flight.
    Superseded,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("no roster is on screen yet")]
    NotReady,
    #[error("a request from this control is still in flight")]
    Busy,
    #[error("both an email and an activity are required")]
    IncompleteForm,
    #[error("control {0} has no click handler")]
    UnknownControl(ControlId),
    #[error("control data is unreadable: {0}")]
    InvalidReference(#[from] ReferenceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    pub kind: MutationKind,
    pub message: StatusMessage,
    pub form_reset: bool,
    /// Result of the follow-up refresh; `None` when the mutation failed.
    pub reload: Option<LoadOutcome>,
}

impl MutationReport {
    pub fn succeeded(&self) -> bool {
        self.reload.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BusyControl {
    SignupForm,
    Remove(ParticipantRef),
}

struct AppState {
    phase: SyncPhase,
    snapshot: Option<Arc<ActivityCollection>>,
    document: Document,
    issued_fetch_seq: u64,
    busy: HashSet<BusyControl>,
}

impl AppState {
    fn release(&mut self, control: &BusyControl) {
        self.busy.remove(control);
        match control {
            BusyControl::SignupForm => self.document.form_mut().busy = false,
            BusyControl::Remove(participant) => {
                self.document.set_participant_busy(participant, false)
            }
        }
    }

    fn busy_participants(&self) -> HashSet<ParticipantRef> {
        self.busy
            .iter()
            .filter_map(|control| match control {
                BusyControl::Remove(participant) => Some(participant.clone()),
                BusyControl::SignupForm => None,
            })
            .collect()
    }
}

/// Releases a busy control if its request future is dropped before it
/// finishes; the normal path disarms it after releasing under the lock.
struct BusyGuard {
    state: Arc<Mutex<AppState>>,
    events: broadcast::Sender<RosterEvent>,
    control: Option<BusyControl>,
}

impl BusyGuard {
    fn disarm(&mut self) {
        self.control = None;
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let Some(control) = self.control.take() else {
            return;
        };
        debug!(?control, "request dropped mid-flight; releasing control");
        let released = match self.state.try_lock() {
            Ok(mut guard) => {
                guard.release(&control);
                true
            }
            Err(_) => false,
        };
        if released {
            let _ = self.events.send(RosterEvent::DocumentChanged);
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(?control, "no runtime to release busy control");
            return;
        };
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        runtime.spawn(async move {
            state.lock().await.release(&control);
            let _ = events.send(RosterEvent::DocumentChanged);
        });
    }
}

pub struct SyncController {
    client: RosterClient,
    state: Arc<Mutex<AppState>>,
    feedback: FeedbackController,
    events: broadcast::Sender<RosterEvent>,
}

impl SyncController {
    pub fn new(api: Arc<dyn RosterApi>, feedback_hide_after: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            client: RosterClient::new(api),
            state: Arc::new(Mutex::new(AppState {
                phase: SyncPhase::Idle,
                snapshot: None,
                document: Document::new(),
                issued_fetch_seq: 0,
                busy: HashSet::new(),
            })),
            feedback: FeedbackController::new(feedback_hide_after, events.clone()),
            events,
        })
    }

    fn busy_guard(&self, control: BusyControl) -> BusyGuard {
        BusyGuard {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
            control: Some(control),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RosterEvent> {
        self.events.subscribe()
    }

    pub fn feedback(&self) -> &FeedbackController {
        &self.feedback
    }

    pub async fn phase(&self) -> SyncPhase {
        self.state.lock().await.phase
    }

    pub async fn document(&self) -> Document {
        self.state.lock().await.document.clone()
    }

    pub async fn snapshot(&self) -> Option<Arc<ActivityCollection>> {
        self.state.lock().await.snapshot.clone()
    }

    /// Fetches a fresh snapshot and rebuilds the roster from it. Results of a
    /// fetch that is no longer the latest issued are dropped.
    pub async fn load(&self) -> LoadOutcome {
        let seq = {
            let mut guard = self.state.lock().await;
            guard.issued_fetch_seq += 1;
            guard.phase = SyncPhase::Loading;
            guard.issued_fetch_seq
        };
        debug!(seq, "fetching activities");

        let result = self.client.fetch_activities().await;

        let outcome = {
            let mut guard = self.state.lock().await;
            if guard.issued_fetch_seq != seq {
                debug!(
                    seq,
                    latest = guard.issued_fetch_seq,
                    "discarding superseded activities fetch"
                );
                return LoadOutcome::Superseded;
            }

            match result {
                Ok(activities) => {
                    let busy = guard.busy_participants();
                    render_roster(&mut guard.document, &activities, &busy);
                    let count = activities.len();
                    guard.snapshot = Some(Arc::new(activities));
                    guard.phase = SyncPhase::Rendered;
                    info!(seq, activities = count, "roster rendered");
                    LoadOutcome::Rendered { activities: count }
                }
                Err(err) => {
                    warn!(seq, error = %err, "failed to load activities");
                    guard.document.show_notice(LOAD_FAILURE_NOTICE);
                    guard.snapshot = None;
                    guard.phase = SyncPhase::Failed;
                    LoadOutcome::Failed
                }
            }
        };

        let _ = self.events.send(RosterEvent::DocumentChanged);
        outcome
    }

    /// Submits the signup form with the given field values.
    pub async fn submit_signup(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<MutationReport, SyncError> {
        let activity = activity.trim().to_string();
        let email = email.trim().to_string();
        {
            let mut guard = self.state.lock().await;
            if !guard.document.has_roster() {
                return Err(SyncError::NotReady);
            }
            if activity.is_empty() || email.is_empty() {
                return Err(SyncError::IncompleteForm);
            }
            if !guard.busy.insert(BusyControl::SignupForm) {
                return Err(SyncError::Busy);
            }
            let form = guard.document.form_mut();
            form.activity = activity.clone();
            form.email = email.clone();
            form.busy = true;
        }
        let mut busy = self.busy_guard(BusyControl::SignupForm);
        let _ = self.events.send(RosterEvent::DocumentChanged);

        let result = self.client.signup(&activity, &email).await;

        let form_reset = {
            let mut guard = self.state.lock().await;
            guard.release(&BusyControl::SignupForm);
            busy.disarm();
            if result.is_ok() {
                guard.document.form_mut().reset();
            }
            result.is_ok()
        };
        let _ = self.events.send(RosterEvent::DocumentChanged);

        Ok(self
            .finish_mutation(MutationKind::Signup, result, form_reset)
            .await)
    }

    /// Dispatches a click on a rendered removal control.
    pub async fn click_control(&self, control: ControlId) -> Result<MutationReport, SyncError> {
        let (action, participant) = {
            let guard = self.state.lock().await;
            guard
                .document
                .click(control)
                .ok_or(SyncError::UnknownControl(control))??
        };
        match action {
            ClickAction::Unregister => self.unregister(participant).await,
        }
    }

    pub async fn unregister(
        &self,
        participant: ParticipantRef,
    ) -> Result<MutationReport, SyncError> {
        {
            let mut guard = self.state.lock().await;
            if !guard.document.has_roster() {
                return Err(SyncError::NotReady);
            }
            if !guard
                .busy
                .insert(BusyControl::Remove(participant.clone()))
            {
                return Err(SyncError::Busy);
            }
            guard.document.set_participant_busy(&participant, true);
        }
        let mut busy = self.busy_guard(BusyControl::Remove(participant.clone()));
        let _ = self.events.send(RosterEvent::DocumentChanged);

        let result = self
            .client
            .unregister(&participant.activity, &participant.email)
            .await;

        {
            let mut guard = self.state.lock().await;
            guard.release(&BusyControl::Remove(participant.clone()));
            busy.disarm();
        }
        let _ = self.events.send(RosterEvent::DocumentChanged);

        Ok(self
            .finish_mutation(MutationKind::Unregister, result, false)
            .await)
    }

    async fn finish_mutation(
        &self,
        kind: MutationKind,
        result: Result<String, crate::client::MutationError>,
        form_reset: bool,
    ) -> MutationReport {
        match result {
            Ok(text) => {
                let message = StatusMessage::success(text);
                self.feedback.set(message.clone()).await;
                let reload = self.load().await;
                MutationReport {
                    kind,
                    message,
                    form_reset,
                    reload: Some(reload),
                }
            }
            Err(err) => {
                warn!(mutation = kind.as_str(), error = %err, "mutation failed");
                let message = StatusMessage::error(err.user_message());
                self.feedback.set(message.clone()).await;
                MutationReport {
                    kind,
                    message,
                    form_reset,
                    reload: None,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
