//! Percent-encoding for request targets and for the participant reference
//! embedded in each removal control.

use shared::domain::ParticipantRef;
use thiserror::Error;
use url::{form_urlencoded, Url};

const ACTIVITY_KEY: &str = "activity";
const EMAIL_KEY: &str = "email";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("participant reference is missing `{0}`")]
    MissingField(&'static str),
    #[error("participant reference repeats `{0}`")]
    DuplicateField(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("base url `{0}` cannot carry path segments")]
pub struct EndpointError(pub String);

/// Encodes both halves independently as `activity=..&email=..`.
pub fn encode_participant_ref(participant: &ParticipantRef) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(ACTIVITY_KEY, &participant.activity)
        .append_pair(EMAIL_KEY, &participant.email)
        .finish()
}

pub fn decode_participant_ref(data: &str) -> Result<ParticipantRef, ReferenceError> {
    let mut activity = None;
    let mut email = None;
    for (key, value) in form_urlencoded::parse(data.as_bytes()) {
        let (slot, name) = match key.as_ref() {
            ACTIVITY_KEY => (&mut activity, ACTIVITY_KEY),
            EMAIL_KEY => (&mut email, EMAIL_KEY),
            _ => continue,
        };
        if slot.replace(value.into_owned()).is_some() {
            return Err(ReferenceError::DuplicateField(name));
        }
    }

    Ok(ParticipantRef {
        activity: activity.ok_or(ReferenceError::MissingField(ACTIVITY_KEY))?,
        email: email.ok_or(ReferenceError::MissingField(EMAIL_KEY))?,
    })
}

/// `{base}/activities`
pub fn activities_endpoint(base: &Url) -> Result<Url, EndpointError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| EndpointError(base.to_string()))?
        .pop_if_empty()
        .push("activities");
    Ok(url)
}

/// `{base}/activities/{activity}/{action}?email={email}` with the activity as a
/// single encoded path segment and the email as an encoded query value.
pub fn activity_action_endpoint(
    base: &Url,
    activity: &str,
    action: &str,
    email: &str,
) -> Result<Url, EndpointError> {
    let mut url = activities_endpoint(base)?;
    url.path_segments_mut()
        .map_err(|_| EndpointError(base.to_string()))?
        .push(activity)
        .push(action);
    url.query_pairs_mut().clear().append_pair(EMAIL_KEY, email);
    Ok(url)
}
