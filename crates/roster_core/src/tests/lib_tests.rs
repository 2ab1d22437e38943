use std::time::Duration;

use shared::{
    domain::{ParticipantRef, Severity},
    protocol::MutationKind,
};

use super::*;
use crate::{
    client::{SIGNUP_TRANSPORT_FAILURE, UNREGISTER_TRANSPORT_FAILURE},
    document::{LOAD_FAILURE_NOTICE, SELECT_PLACEHOLDER},
    test_support::{seeded_activities, spawn_roster_server, unreachable_server_url},
};

fn http_api(server_url: &str) -> std::sync::Arc<HttpRosterApi> {
    std::sync::Arc::new(HttpRosterApi::new(server_url, Duration::from_secs(5)).expect("http api"))
}

#[tokio::test]
async fn fetches_all_seeded_activities_in_server_order() {
    let (server_url, _) = spawn_roster_server(seeded_activities())
        .await
        .expect("spawn server");
    let client = RosterClient::new(http_api(&server_url));

    let activities = client.fetch_activities().await.expect("fetch");
    assert_eq!(activities.len(), 9);
    assert_eq!(activities.names().next(), Some("Chess Club"));
    let chess = activities.get("Chess Club").expect("chess club");
    assert_eq!(chess.participants.len(), 2);
    assert!(activities
        .iter()
        .all(|(_, activity)| activity.participants.iter().all(|p| p.contains('@'))));
}

#[tokio::test]
async fn signup_with_spaces_and_plus_reaches_the_right_roster() {
    let (server_url, state) = spawn_roster_server(seeded_activities())
        .await
        .expect("spawn server");
    let client = RosterClient::new(http_api(&server_url));

    let message = client
        .signup("Art Studio", "student+lab@mergington.edu")
        .await
        .expect("signup");
    assert_eq!(
        message,
        "Signed up student+lab@mergington.edu for Art Studio"
    );

    let roster = state.lock().await;
    let art = roster.get("Art Studio").expect("art studio");
    assert!(art
        .participants
        .contains(&"student+lab@mergington.edu".to_string()));
}

#[tokio::test]
async fn server_detail_is_surfaced_for_rejected_mutations() {
    let (server_url, _) = spawn_roster_server(seeded_activities())
        .await
        .expect("spawn server");
    let client = RosterClient::new(http_api(&server_url));

    let duplicate = client
        .signup("Chess Club", "michael@mergington.edu")
        .await
        .expect_err("duplicate");
    assert_eq!(
        duplicate,
        MutationError::Rejected {
            kind: MutationKind::Signup,
            status: 400,
            detail: Some("Student is already signed up".to_string()),
        }
    );

    let missing = client
        .unregister("Nonexistent Activity", "student@mergington.edu")
        .await
        .expect_err("missing activity");
    assert_eq!(missing.user_message(), "Activity not found");

    let not_registered = client
        .unregister("Chess Club", "notregistered@mergington.edu")
        .await
        .expect_err("not registered");
    assert_eq!(
        not_registered.user_message(),
        "Student is not registered for this activity"
    );
}

#[tokio::test]
async fn unregister_confirmation_is_built_client_side() {
    let (server_url, state) = spawn_roster_server(seeded_activities())
        .await
        .expect("spawn server");
    let client = RosterClient::new(http_api(&server_url));

    let message = client
        .unregister("Chess Club", "michael@mergington.edu")
        .await
        .expect("unregister");
    assert_eq!(
        message,
        "Unregistered michael@mergington.edu from Chess Club"
    );
    assert!(!state
        .lock()
        .await
        .get("Chess Club")
        .expect("chess club")
        .participants
        .contains(&"michael@mergington.edu".to_string()));

    let second = client
        .unregister("Chess Club", "michael@mergington.edu")
        .await
        .expect_err("second unregister");
    assert!(matches!(second, MutationError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn unreachable_server_yields_fixed_transport_messages() {
    let server_url = unreachable_server_url().await.expect("free port");
    let client = RosterClient::new(http_api(&server_url));

    let signup = client
        .signup("Chess Club", "a@x.com")
        .await
        .expect_err("signup transport");
    assert!(matches!(signup, MutationError::Transport { .. }));
    assert_eq!(signup.user_message(), SIGNUP_TRANSPORT_FAILURE);

    let unregister = client
        .unregister("Chess Club", "a@x.com")
        .await
        .expect_err("unregister transport");
    assert_eq!(unregister.user_message(), UNREGISTER_TRANSPORT_FAILURE);

    assert!(matches!(
        client.fetch_activities().await,
        Err(LoadError::Transport(_))
    ));
}

#[test]
fn rejects_non_http_server_urls() {
    assert!(HttpRosterApi::new("mailto:admin@x.com", Duration::from_secs(1)).is_err());
    assert!(HttpRosterApi::new("not a url", Duration::from_secs(1)).is_err());
    assert!(HttpRosterApi::new("http://127.0.0.1:8000/api/", Duration::from_secs(1)).is_ok());
}

#[tokio::test]
async fn full_cycle_against_roster_server() {
    let (server_url, _) = spawn_roster_server(seeded_activities())
        .await
        .expect("spawn server");
    let controller = SyncController::new(http_api(&server_url), Duration::from_secs(5));

    assert_eq!(
        controller.load().await,
        LoadOutcome::Rendered { activities: 9 }
    );

    let report = controller
        .submit_signup("Programming Class", "cycle@mergington.edu")
        .await
        .expect("accepted");
    assert_eq!(report.message.severity, Severity::Success);
    assert_eq!(
        report.message.text,
        "Signed up cycle@mergington.edu for Programming Class"
    );
    assert_eq!(report.reload, Some(LoadOutcome::Rendered { activities: 9 }));

    let document = controller.document().await;
    let card = document
        .cards()
        .iter()
        .find(|card| card.name == "Programming Class")
        .expect("programming class card");
    assert_eq!(card.availability(), "17 spots left");
    let control = card
        .participants
        .rows()
        .iter()
        .find(|row| row.email == "cycle@mergington.edu")
        .expect("new participant row")
        .control
        .id;

    let report = controller.click_control(control).await.expect("accepted");
    assert_eq!(
        report.message.text,
        "Unregistered cycle@mergington.edu from Programming Class"
    );
    let document = controller.document().await;
    assert!(document
        .cards()
        .iter()
        .flat_map(|card| card.participants.rows())
        .all(|row| row.email != "cycle@mergington.edu"));
    assert!(document.click(control).is_none());
}

#[tokio::test]
async fn unreachable_server_renders_failure_notice() {
    let server_url = unreachable_server_url().await.expect("free port");
    let controller = SyncController::new(http_api(&server_url), Duration::from_secs(5));

    assert_eq!(controller.load().await, LoadOutcome::Failed);
    let document = controller.document().await;
    assert_eq!(document.notice(), Some(LOAD_FAILURE_NOTICE));
    assert_eq!(document.options().len(), 1);
    assert_eq!(document.options()[0].label, SELECT_PLACEHOLDER);

    assert_eq!(
        controller
            .unregister(ParticipantRef::new("Chess Club", "a@x.com"))
            .await,
        Err(SyncError::NotReady)
    );
}
