//! Test doubles: a scripted in-process `RosterApi` and an axum roster server.

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use shared::{
    domain::{Activity, ActivityCollection},
    error::ApiError,
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use crate::api::{RawResponse, RosterApi, TransportError};

pub struct Step {
    response: Result<RawResponse, TransportError>,
    gate: Option<oneshot::Receiver<()>>,
}

impl Step {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            response: Ok(RawResponse::new(status, body.to_string())),
            gate: None,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            response: Ok(RawResponse::new(status, body)),
            gate: None,
        }
    }

    pub fn transport(reason: &str) -> Self {
        Self {
            response: Err(TransportError(reason.to_string())),
            gate: None,
        }
    }

    /// Holds the response back until the returned sender fires or drops.
    pub fn gated(mut self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.gate = Some(rx);
        (self, tx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetActivities,
    Signup { activity: String, email: String },
    Unregister { activity: String, email: String },
}

#[derive(Default)]
pub struct ScriptedApi {
    gets: Mutex<VecDeque<Step>>,
    signups: Mutex<VecDeque<Step>>,
    unregisters: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn push_get(&self, step: Step) {
        self.gets.lock().await.push_back(step);
    }

    pub async fn push_signup(&self, step: Step) {
        self.signups.lock().await.push_back(step);
    }

    pub async fn push_unregister(&self, step: Step) {
        self.unregisters.lock().await.push_back(step);
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn play(
        &self,
        queue: &Mutex<VecDeque<Step>>,
        call: Call,
    ) -> Result<RawResponse, TransportError> {
        self.calls.lock().await.push(call.clone());
        let step = queue.lock().await.pop_front();
        let Some(step) = step else {
            return Err(TransportError(format!("no scripted response for {call:?}")));
        };
        if let Some(gate) = step.gate {
            let _ = gate.await;
        }
        step.response
    }
}

#[async_trait]
impl RosterApi for ScriptedApi {
    async fn get_activities(&self) -> Result<RawResponse, TransportError> {
        self.play(&self.gets, Call::GetActivities).await
    }

    async fn post_signup(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<RawResponse, TransportError> {
        self.play(
            &self.signups,
            Call::Signup {
                activity: activity.to_string(),
                email: email.to_string(),
            },
        )
        .await
    }

    async fn delete_unregister(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<RawResponse, TransportError> {
        self.play(
            &self.unregisters,
            Call::Unregister {
                activity: activity.to_string(),
                email: email.to_string(),
            },
        )
        .await
    }
}

pub fn activity(max_participants: u32, participants: &[&str]) -> Activity {
    Activity {
        description: "Learn strategies and compete in chess tournaments".to_string(),
        schedule: "Fridays, 3:30 PM - 5:00 PM".to_string(),
        max_participants,
        participants: participants.iter().map(|p| p.to_string()).collect(),
    }
}

pub fn chess_club(participants: &[&str]) -> serde_json::Value {
    json!({
        "Chess Club": {
            "description": "Learn strategies and compete in chess tournaments",
            "schedule": "Fridays, 3:30 PM - 5:00 PM",
            "max_participants": 10,
            "participants": participants,
        }
    })
}

fn seed(
    description: &str,
    schedule: &str,
    max_participants: u32,
    participants: &[&str],
) -> Activity {
    Activity {
        description: description.to_string(),
        schedule: schedule.to_string(),
        max_participants,
        participants: participants.iter().map(|p| p.to_string()).collect(),
    }
}

/// The nine activities the roster server starts with.
pub fn seeded_activities() -> ActivityCollection {
    [
        (
            "Chess Club",
            seed(
                "Learn strategies and compete in chess tournaments",
                "Fridays, 3:30 PM - 5:00 PM",
                12,
                &["michael@mergington.edu", "daniel@mergington.edu"],
            ),
        ),
        (
            "Programming Class",
            seed(
                "Learn programming fundamentals and build software projects",
                "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                20,
                &["emma@mergington.edu", "sophia@mergington.edu"],
            ),
        ),
        (
            "Gym Class",
            seed(
                "Physical education and sports activities",
                "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                30,
                &["john@mergington.edu", "olivia@mergington.edu"],
            ),
        ),
        (
            "Basketball Team",
            seed(
                "Competitive basketball training and games",
                "Mondays and Thursdays, 4:00 PM - 5:30 PM",
                15,
                &["james@mergington.edu"],
            ),
        ),
        (
            "Tennis Club",
            seed(
                "Tennis skills development and friendly matches",
                "Wednesdays and Saturdays, 3:00 PM - 4:30 PM",
                16,
                &["sarah@mergington.edu", "lucas@mergington.edu"],
            ),
        ),
        (
            "Art Studio",
            seed(
                "Painting, drawing, and visual arts creation",
                "Tuesdays, 3:30 PM - 5:00 PM",
                18,
                &["grace@mergington.edu"],
            ),
        ),
        (
            "Music Band",
            seed(
                "Learn instruments and perform in school concerts",
                "Mondays and Wednesdays, 4:00 PM - 5:00 PM",
                25,
                &["alex@mergington.edu", "nina@mergington.edu"],
            ),
        ),
        (
            "Debate Club",
            seed(
                "Develop public speaking and critical thinking skills",
                "Thursdays, 3:30 PM - 5:00 PM",
                14,
                &["marcus@mergington.edu"],
            ),
        ),
        (
            "Science Olympiad",
            seed(
                "Compete in science competitions and experiments",
                "Fridays, 4:00 PM - 5:30 PM",
                20,
                &["isabella@mergington.edu", "ethan@mergington.edu"],
            ),
        ),
    ]
    .into_iter()
    .map(|(name, activity)| (name.to_string(), activity))
    .collect()
}

type RosterState = Arc<Mutex<ActivityCollection>>;

#[derive(Deserialize)]
struct EmailQuery {
    email: String,
}

fn detail(status: StatusCode, text: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!(ApiError::new(text))))
}

async fn list_activities(State(state): State<RosterState>) -> Json<ActivityCollection> {
    Json(state.lock().await.clone())
}

async fn signup(
    State(state): State<RosterState>,
    Path(name): Path<String>,
    Query(query): Query<EmailQuery>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut activities = state.lock().await;
    let Some(activity) = activities.get_mut(&name) else {
        return detail(StatusCode::NOT_FOUND, "Activity not found");
    };
    if activity.participants.contains(&query.email) {
        return detail(StatusCode::BAD_REQUEST, "Student is already signed up");
    }
    if activity.spots_left() <= 0 {
        return detail(StatusCode::BAD_REQUEST, "Activity is full");
    }
    activity.participants.push(query.email.clone());
    (
        StatusCode::OK,
        Json(json!({ "message": format!("Signed up {} for {name}", query.email) })),
    )
}

async fn unregister(
    State(state): State<RosterState>,
    Path(name): Path<String>,
    Query(query): Query<EmailQuery>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut activities = state.lock().await;
    let Some(activity) = activities.get_mut(&name) else {
        return detail(StatusCode::NOT_FOUND, "Activity not found");
    };
    let Some(index) = activity.participants.iter().position(|p| *p == query.email) else {
        return detail(
            StatusCode::BAD_REQUEST,
            "Student is not registered for this activity",
        );
    };
    activity.participants.remove(index);
    (
        StatusCode::OK,
        Json(json!({ "message": format!("Unregistered {} from {name}", query.email) })),
    )
}

pub async fn spawn_roster_server(
    activities: ActivityCollection,
) -> anyhow::Result<(String, RosterState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = Arc::new(Mutex::new(activities));
    let app = Router::new()
        .route("/activities", get(list_activities))
        .route("/activities/:name/signup", post(signup))
        .route("/activities/:name/unregister", delete(unregister))
        .with_state(Arc::clone(&state));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

/// A base url whose port refuses connections.
pub async fn unreachable_server_url() -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
