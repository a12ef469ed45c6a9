// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact intake service.
//!
//! This is the only layer that knows about status codes; the pipeline
//! reports an [`Outcome`] and [`outcome_response`] maps it onto the wire.

use crate::config::Config;
use crate::intake::{DeliveryFailure, Disposition, IntakeHandler, Outcome, UNKNOWN_SOURCE};
use crate::submission::Submission;
use crate::validator::RejectReason;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Shared application state.
pub struct AppState {
    pub intake: IntakeHandler,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

const MSG_NOT_CONFIGURED: &str = "Email service not configured";
const MSG_SEND_FAILED: &str = "Failed to send message";

/// Largest accepted contact body. Comfortably above the longest valid
/// submission even with every character JSON-escaped.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(
            "/api/contact",
            post(submit).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        );

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus exposition endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let Some(metrics) = state.intake.metrics() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Contact form intake endpoint.
///
/// The body is parsed here rather than by the `Json` extractor so that an
/// oversized or malformed body yields the same generic 500 as any other
/// unexpected fault.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let source_id = source_id(&headers);

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(
                source = %source_id,
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Unreadable contact submission body"
            );
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_SEND_FAILED);
        }
    };

    let submission: Submission = match serde_json::from_slice(&body) {
        Ok(s) => s,
        Err(e) => {
            warn!(source = %source_id, error = %e, "Unparseable contact submission");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_SEND_FAILED);
        }
    };

    debug!(source = %source_id, "Processing contact submission");
    let disposition = state.intake.process(&submission, &source_id, Utc::now()).await;
    outcome_response(disposition)
}

/// Derive the rate limit key from proxy headers.
///
/// First entry of `X-Forwarded-For`, else `X-Real-IP`, else `"unknown"`.
pub fn source_id(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_SOURCE)
        .to_string()
}

/// Map a pipeline result to status code and body.
pub fn outcome_response(disposition: Disposition) -> Response {
    match disposition.outcome {
        Outcome::Delivered => {
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Outcome::Rejected(RejectReason::RateLimited) => {
            let mut response = error_response(
                StatusCode::TOO_MANY_REQUESTS,
                &RejectReason::RateLimited.to_string(),
            );
            if let Some(retry_after) = disposition.retry_after {
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
            }
            response
        }
        Outcome::Rejected(reason) => error_response(StatusCode::BAD_REQUEST, &reason.to_string()),
        Outcome::DeliveryFailed(DeliveryFailure::NotConfigured) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_NOT_CONFIGURED)
        }
        Outcome::DeliveryFailed(DeliveryFailure::SendFailed) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_SEND_FAILED)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
