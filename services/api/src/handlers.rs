//! Axum Handlers for the HTTP API
//!
//! Liveness, health, and the RTC connect endpoint that brokers a WebRTC
//! session with the realtime API. Uses `utoipa` doc comments to generate
//! OpenAPI documentation.

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use interpreter_core::{NegotiationError, SdpAnswer, UpstreamError, session::clamp_temperature};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    models::{ErrorResponse, HealthResponse, RtcConnectParams},
    state::AppState,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Upstream answered with an error; its payload is passed through for diagnosis.
    UpstreamRejected(String),
    BadGateway(String),
    GatewayTimeout,
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::UpstreamRejected(body) => (
                StatusCode::BAD_GATEWAY,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            ApiError::BadGateway(message) => {
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
            ApiError::GatewayTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                Json(ErrorResponse {
                    message: "Upstream timeout".to_string(),
                }),
            )
                .into_response(),
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = format!("Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl From<NegotiationError> for ApiError {
    fn from(err: NegotiationError) -> Self {
        match err {
            NegotiationError::EmptyOffer => {
                ApiError::BadRequest(NegotiationError::EmptyOffer.to_string())
            }
            NegotiationError::Upstream(upstream) => match upstream {
                UpstreamError::Status { body, .. } => ApiError::UpstreamRejected(body),
                UpstreamError::MissingCredential | UpstreamError::Decode(_) => {
                    ApiError::BadGateway(upstream.to_string())
                }
                UpstreamError::Timeout(_) => ApiError::GatewayTimeout,
                UpstreamError::Transport { .. } => ApiError::InternalServerError(upstream.into()),
            },
        }
    }
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = String, content_type = "text/plain")
    )
)]
pub async fn root() -> &'static str {
    "Realtime Translator API is running"
}

/// Report the configured realtime model and effective temperature.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let settings = state.broker.settings();
    Json(HealthResponse {
        status: "ok".to_string(),
        model: settings.model.clone(),
        temperature: clamp_temperature(settings.temperature),
    })
}

/// Exchange a browser SDP offer for a realtime SDP answer.
///
/// Mints an ephemeral key with interpreter instructions for the selected
/// languages, then forwards the offer to the realtime endpoint with that key.
#[utoipa::path(
    post,
    path = "/api/rtc-connect",
    params(RtcConnectParams),
    request_body(content = Vec<u8>, description = "SDP offer", content_type = "application/sdp"),
    responses(
        (status = 200, description = "SDP answer", body = Vec<u8>, content_type = "application/sdp"),
        (status = 400, description = "No SDP provided", body = ErrorResponse),
        (status = 502, description = "Upstream rejected the session or SDP exchange"),
        (status = 504, description = "Upstream timeout", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(name = "rtc_connect", skip_all, fields(negotiation_id = %Uuid::new_v4()))]
pub async fn rtc_connect(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
    client_sdp: Bytes,
) -> Result<Response, ApiError> {
    let params = RtcConnectParams::from_pairs(pairs);
    info!(
        rec_lang = ?params.rec_lang,
        pat_lang = ?params.pat_lang,
        offer_len = client_sdp.len(),
        "RTC connect requested"
    );

    let answer = state
        .broker
        .negotiate(
            client_sdp,
            params.rec_lang.as_deref(),
            params.pat_lang.as_deref(),
        )
        .await
        .inspect_err(|e| warn!(error = %e, "RTC negotiation failed"))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, SdpAnswer::CONTENT_TYPE)],
        answer.into_inner(),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use interpreter_core::Stage;

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_offer_maps_to_bad_request() {
        let response = ApiError::from(NegotiationError::EmptyOffer).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, r#"{"message":"No SDP provided"}"#);
    }

    #[tokio::test]
    async fn test_upstream_status_forwards_body() {
        let err = NegotiationError::Upstream(UpstreamError::Status {
            stage: Stage::Sdp,
            status: 403,
            body: r#"{"error":"forbidden"}"#.to_string(),
        });
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"error":"forbidden"}"#);
    }

    #[tokio::test]
    async fn test_timeout_and_missing_credential_statuses() {
        let timeout = ApiError::from(NegotiationError::Upstream(UpstreamError::Timeout(
            Stage::Session,
        )))
        .into_response();
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let missing = ApiError::from(NegotiationError::Upstream(
            UpstreamError::MissingCredential,
        ))
        .into_response();
        assert_eq!(missing.status(), StatusCode::BAD_GATEWAY);
        assert!(body_string(missing).await.contains("Missing ephemeral token"));
    }

    #[tokio::test]
    async fn test_internal_error_includes_detail() {
        let response =
            ApiError::InternalServerError(anyhow::anyhow!("socket closed")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"message":"Error: socket closed"}"#
        );
    }
}
