//! Single-slot status message with timed dismissal.

use std::{sync::Arc, time::Duration};

use shared::domain::StatusMessage;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::Instant,
};
use tracing::debug;

use crate::RosterEvent;

pub const DEFAULT_HIDE_AFTER: Duration = Duration::from_millis(5000);

#[derive(Default)]
struct FeedbackSlot {
    message: Option<StatusMessage>,
    generation: u64,
    hide_timer: Option<JoinHandle<()>>,
}

pub struct FeedbackController {
    slot: Arc<Mutex<FeedbackSlot>>,
    hide_after: Duration,
    events: broadcast::Sender<RosterEvent>,
}

impl FeedbackController {
    pub fn new(hide_after: Duration, events: broadcast::Sender<RosterEvent>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(FeedbackSlot::default())),
            hide_after,
            events,
        }
    }

    /// Shows `message`, replacing whatever is displayed, and restarts the hide
    /// timer. A pending timer from an earlier message is cancelled first.
    pub async fn set(&self, message: StatusMessage) {
        let mut slot = self.slot.lock().await;
        if let Some(timer) = slot.hide_timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        slot.message = Some(message.clone());

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let events = self.events.clone();
        let deadline = Instant::now() + self.hide_after;
        slot.hide_timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut slot = shared.lock().await;
            // lost the race against a newer set()
            if slot.generation != generation {
                return;
            }
            slot.message = None;
            slot.hide_timer = None;
            drop(slot);
            debug!(generation, "feedback message expired");
            let _ = events.send(RosterEvent::FeedbackChanged(None));
        }));
        drop(slot);

        let _ = self.events.send(RosterEvent::FeedbackChanged(Some(message)));
    }

    pub async fn hide(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(timer) = slot.hide_timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        if slot.message.take().is_some() {
            drop(slot);
            let _ = self.events.send(RosterEvent::FeedbackChanged(None));
        }
    }

    /// The visible message, if any.
    pub async fn current(&self) -> Option<StatusMessage> {
        self.slot.lock().await.message.clone()
    }
}

#[cfg(test)]
#[path = "tests/feedback_tests.rs"]
mod tests;
