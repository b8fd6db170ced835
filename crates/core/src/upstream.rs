//! Upstream Realtime API Client
//!
//! The two outbound calls a negotiation makes: minting an ephemeral key from
//! the session endpoint, then exchanging the SDP offer with the realtime
//! endpoint using that key.

use crate::session::{EphemeralKey, SessionRequest, SessionResponse};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

#[cfg(test)]
use mockall::automock;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SDP_TIMEOUT: Duration = Duration::from_secs(60);

/// Which upstream call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Session,
    Sdp,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Session => write!(f, "session create"),
            Stage::Sdp => write!(f, "SDP exchange"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status.
    #[error("{stage} failed with status {status}")]
    Status {
        stage: Stage,
        status: u16,
        body: String,
    },
    /// Session created, but the response carried no ephemeral key.
    #[error("Missing ephemeral token")]
    MissingCredential,
    /// The session response body was not the expected JSON.
    #[error("Malformed session create response: {0}")]
    Decode(String),
    #[error("{0} timed out")]
    Timeout(Stage),
    /// Any other transport failure (DNS, connection refused, TLS, ...).
    #[error("{stage} request failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    fn from_reqwest(stage: Stage, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(stage)
        } else {
            UpstreamError::Transport { stage, source: err }
        }
    }
}

/// The outbound side of a negotiation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RealtimeUpstream: Send + Sync {
    /// Creates a realtime session and returns its ephemeral key.
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<EphemeralKey, UpstreamError>;

    /// Sends the client's SDP offer and returns the upstream SDP answer.
    ///
    /// Both bodies are opaque bytes and are never decoded.
    async fn exchange_sdp(
        &self,
        key: &EphemeralKey,
        offer: Bytes,
        model: &str,
        voice: &str,
    ) -> Result<Bytes, UpstreamError>;
}

/// `RealtimeUpstream` backed by the OpenAI REST endpoints.
pub struct OpenAIRealtimeClient {
    http: reqwest::Client,
    api_key: SecretString,
    api_base: String,
    session_timeout: Duration,
    sdp_timeout: Duration,
}

impl OpenAIRealtimeClient {
    /// Creates a client against the public OpenAI API with default timeouts.
    pub fn new(http: reqwest::Client, api_key: SecretString) -> Self {
        Self {
            http,
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            sdp_timeout: DEFAULT_SDP_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeouts(mut self, session_timeout: Duration, sdp_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self.sdp_timeout = sdp_timeout;
        self
    }

    fn session_url(&self) -> String {
        format!("{}/realtime/sessions", self.api_base)
    }

    fn rtc_url(&self) -> String {
        format!("{}/realtime", self.api_base)
    }
}

#[async_trait]
impl RealtimeUpstream for OpenAIRealtimeClient {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<EphemeralKey, UpstreamError> {
        let url = self.session_url();
        debug!(%url, model = %request.model, "Creating realtime session");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .timeout(self.session_timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(Stage::Session, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(Stage::Session, e))?;

        if !status.is_success() {
            error!(status = status.as_u16(), %body, "Session create failed");
            return Err(UpstreamError::Status {
                stage: Stage::Session,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SessionResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, %body, "Session create returned malformed JSON");
            UpstreamError::Decode(e.to_string())
        })?;

        parsed.into_ephemeral_key().ok_or_else(|| {
            error!("Ephemeral token missing in session create response");
            UpstreamError::MissingCredential
        })
    }

    async fn exchange_sdp(
        &self,
        key: &EphemeralKey,
        offer: Bytes,
        model: &str,
        voice: &str,
    ) -> Result<Bytes, UpstreamError> {
        let url = self.rtc_url();
        debug!(%url, model, voice, offer_len = offer.len(), "Exchanging SDP");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", key.value()))
            .header(CONTENT_TYPE, "application/sdp")
            .query(&[("model", model), ("voice", voice)])
            .body(offer)
            .timeout(self.sdp_timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(Stage::Sdp, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(Stage::Sdp, e))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            error!(status = status.as_u16(), %body, "SDP exchange failed");
            return Err(UpstreamError::Status {
                stage: Stage::Sdp,
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = OpenAIRealtimeClient::new(reqwest::Client::new(), SecretString::from("sk".to_string()))
            .with_api_base("http://localhost:9000/v1/");
        assert_eq!(client.session_url(), "http://localhost:9000/v1/realtime/sessions");
        assert_eq!(client.rtc_url(), "http://localhost:9000/v1/realtime");
    }

    #[test]
    fn test_default_urls() {
        let client = OpenAIRealtimeClient::new(reqwest::Client::new(), SecretString::from("sk".to_string()));
        assert_eq!(client.session_url(), "https://api.openai.com/v1/realtime/sessions");
        assert_eq!(client.session_timeout, Duration::from_secs(30));
        assert_eq!(client.sdp_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Status {
            stage: Stage::Sdp,
            status: 401,
            body: "{}".to_string(),
        };
        assert_eq!(format!("{}", err), "SDP exchange failed with status 401");
        assert_eq!(
            format!("{}", UpstreamError::Timeout(Stage::Session)),
            "session create timed out"
        );
        assert_eq!(
            format!("{}", UpstreamError::MissingCredential),
            "Missing ephemeral token"
        );
    }
}
