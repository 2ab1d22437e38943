//! Transport seam to the roster server.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::encoding::{activities_endpoint, activity_action_endpoint};

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        Self(value.to_string())
    }
}

#[async_trait]
pub trait RosterApi: Send + Sync {
    async fn get_activities(&self) -> Result<RawResponse, TransportError>;
    async fn post_signup(&self, activity: &str, email: &str) -> Result<RawResponse, TransportError>;
    async fn delete_unregister(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<RawResponse, TransportError>;
}

pub struct HttpRosterApi {
    http: Client,
    base_url: Url,
}

impl HttpRosterApi {
    pub fn new(server_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(server_url)
            .map_err(|err| anyhow!("invalid roster server url '{server_url}': {err}"))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "roster server url must be an http(s) base url, got '{server_url}'"
            ));
        }
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn exchange(&self, method: Method, url: Url) -> Result<RawResponse, TransportError> {
        debug!(%method, %url, "roster request");
        let response = self.http.request(method, url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl RosterApi for HttpRosterApi {
    async fn get_activities(&self) -> Result<RawResponse, TransportError> {
        let url =
            activities_endpoint(&self.base_url).map_err(|err| TransportError(err.to_string()))?;
        self.exchange(Method::GET, url).await
    }

    async fn post_signup(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<RawResponse, TransportError> {
        let url = activity_action_endpoint(&self.base_url, activity, "signup", email)
            .map_err(|err| TransportError(err.to_string()))?;
        self.exchange(Method::POST, url).await
    }

    async fn delete_unregister(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<RawResponse, TransportError> {
        let url = activity_action_endpoint(&self.base_url, activity, "unregister", email)
            .map_err(|err| TransportError(err.to_string()))?;
        self.exchange(Method::DELETE, url).await
    }
}
