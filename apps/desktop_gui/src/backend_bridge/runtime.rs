//! Runtime bridge between UI command queue and the roster sync controller.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use roster_core::{config::Settings, HttpRosterApi, RosterEvent, SyncController, SyncError};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let api = match HttpRosterApi::new(&settings.server_url, settings.request_timeout()) {
                Ok(api) => api,
                Err(err) => {
                    tracing::error!("failed to prepare roster api: {err}");
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        err.to_string(),
                    )));
                    return;
                }
            };
            tracing::info!(server_url = %api.base_url(), "backend worker started");
            let controller = SyncController::new(Arc::new(api), settings.feedback_hide_after());

            let mut events = controller.subscribe_events();
            let forward_controller = Arc::clone(&controller);
            let forward_tx = ui_tx.clone();
            tokio::spawn(async move {
                loop {
                    let event = match events.recv().await {
                        Ok(RosterEvent::FeedbackChanged(message)) => UiEvent::Feedback(message),
                        Ok(RosterEvent::DocumentChanged) => {
                            UiEvent::Document(forward_controller.document().await)
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "ui event forwarder lagged");
                            let _ = forward_tx.try_send(UiEvent::Feedback(
                                forward_controller.feedback().current().await,
                            ));
                            UiEvent::Document(forward_controller.document().await)
                        }
                        Err(RecvError::Closed) => break,
                    };
                    if let Err(TrySendError::Disconnected(_)) = forward_tx.try_send(event) {
                        break;
                    }
                }
            });

            while let Ok(cmd) = cmd_rx.recv() {
                let controller = Arc::clone(&controller);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let refused = match cmd {
                        BackendCommand::Load => {
                            controller.load().await;
                            None
                        }
                        BackendCommand::Signup { activity, email } => controller
                            .submit_signup(&activity, &email)
                            .await
                            .err()
                            .map(|err| (UiErrorContext::Signup, err)),
                        BackendCommand::Remove { control } => controller
                            .click_control(control)
                            .await
                            .err()
                            .map(|err| (UiErrorContext::Remove, err)),
                    };
                    if let Some((context, err)) = refused {
                        report_refusal(&ui_tx, context, &err);
                    }
                });
            }
            tracing::info!("ui command channel closed; backend worker exiting");
        });
    });
}

fn report_refusal(ui_tx: &Sender<UiEvent>, context: UiErrorContext, err: &SyncError) {
    tracing::debug!(?context, error = %err, "command refused by controller");
    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_sync(context, err)));
}
