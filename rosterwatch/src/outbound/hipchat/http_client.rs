//! Reqwest-backed chat service adapter.
//!
//! This adapter owns transport details only: endpoint construction, bearer
//! authentication, HTTP status mapping, and JSON decoding into domain users.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};

use super::dto::{MessageRequestDto, UserListDto};
use crate::config::{ApiToken, WatchConfig};
use crate::domain::User;
use crate::domain::ports::{
    DirectMessageError, DirectMessenger, PageRequest, RecipientId, RosterSource,
    RosterSourceError,
};

const USER_AGENT: &str = concat!("rosterwatch/", env!("CARGO_PKG_VERSION"));

/// Chat service client implementing both the roster and messaging ports.
pub struct HipChatHttpClient {
    client: Client,
    api_url: Url,
    token: ApiToken,
}

impl HipChatHttpClient {
    /// Build a client against `api_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_url: Url, token: ApiToken, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    /// Build a client from the watch configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn from_config(config: &WatchConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.api_url().clone(),
            config.token().clone(),
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl RosterSource for HipChatHttpClient {
    async fn fetch_page(&self, page: PageRequest) -> Result<Vec<User>, RosterSourceError> {
        let url = users_url(&self.api_url, page).ok_or_else(|| {
            RosterSourceError::transport(format!("api url '{}' cannot be a base", self.api_url))
        })?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.expose())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(roster_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(roster_transport_error)?;
        if !status.is_success() {
            return Err(roster_status_error(status, body.as_ref()));
        }

        parse_users(body.as_ref())
    }
}

#[async_trait]
impl DirectMessenger for HipChatHttpClient {
    async fn send_message(
        &self,
        recipient: &RecipientId,
        message: &str,
    ) -> Result<(), DirectMessageError> {
        let url = message_url(&self.api_url, recipient).ok_or_else(|| {
            DirectMessageError::transport(format!("api url '{}' cannot be a base", self.api_url))
        })?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.expose())
            .json(&MessageRequestDto { message })
            .send()
            .await
            .map_err(message_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(message_transport_error)?;
        Err(message_status_error(status, body.as_ref()))
    }
}

fn endpoint(api_url: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = api_url.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}

fn users_url(api_url: &Url, page: PageRequest) -> Option<Url> {
    let mut url = endpoint(api_url, &["user"])?;
    url.query_pairs_mut()
        .append_pair("max-results", &page.max_results.to_string())
        .append_pair("start-index", &page.start_index.to_string());
    Some(url)
}

fn message_url(api_url: &Url, recipient: &RecipientId) -> Option<Url> {
    endpoint(api_url, &["user", recipient.as_str(), "message"])
}

fn parse_users(body: &[u8]) -> Result<Vec<User>, RosterSourceError> {
    let decoded: UserListDto = serde_json::from_slice(body).map_err(|error| {
        RosterSourceError::decode(format!("invalid user list payload: {error}"))
    })?;
    Ok(decoded.into_domain_users())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Unauthorized,
    NotFound,
    RateLimited,
    Timeout,
    Other,
}

fn classify_status(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Unauthorized,
        StatusCode::NOT_FOUND => FailureKind::NotFound,
        StatusCode::TOO_MANY_REQUESTS => FailureKind::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => FailureKind::Timeout,
        _ => FailureKind::Other,
    }
}

fn roster_status_error(status: StatusCode, body: &[u8]) -> RosterSourceError {
    let message = status_message(status, body);
    match classify_status(status) {
        FailureKind::Unauthorized => RosterSourceError::unauthorized(message),
        FailureKind::RateLimited => RosterSourceError::rate_limited(message),
        FailureKind::Timeout => RosterSourceError::timeout(message),
        FailureKind::NotFound | FailureKind::Other => RosterSourceError::transport(message),
    }
}

fn message_status_error(status: StatusCode, body: &[u8]) -> DirectMessageError {
    let message = status_message(status, body);
    match classify_status(status) {
        FailureKind::Unauthorized => DirectMessageError::unauthorized(message),
        FailureKind::NotFound => DirectMessageError::unknown_recipient(message),
        FailureKind::RateLimited => DirectMessageError::rate_limited(message),
        FailureKind::Timeout => DirectMessageError::timeout(message),
        FailureKind::Other => DirectMessageError::transport(message),
    }
}

fn roster_transport_error(error: reqwest::Error) -> RosterSourceError {
    if error.is_timeout() {
        RosterSourceError::timeout(error.to_string())
    } else {
        RosterSourceError::transport(error.to_string())
    }
}

fn message_transport_error(error: reqwest::Error) -> DirectMessageError {
    if error.is_timeout() {
        DirectMessageError::timeout(error.to_string())
    } else {
        DirectMessageError::transport(error.to_string())
    }
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
