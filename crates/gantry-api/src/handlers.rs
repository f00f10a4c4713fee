//! Webhook handlers.
//!
//! The dispatcher mirrors the notifier's expectations: non-POST traffic
//! gets a liveness payload, POST traffic is verified, classified, and
//! reconciled. Response bodies stay wire-compatible with the service
//! this replaces (`I'm here!`, `Invalid HMAC`,
//! `["Updated service count:",N]`).

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use gantry_core::NotificationBatch;
use gantry_scale::ScaleOutcome;

use crate::ApiState;
use crate::auth::{self, SIGNATURE_HEADER};

const LIVENESS_BODY: &str = "I'm here!";

/// Static liveness payload for any non-POST request.
///
/// Deliberately takes no state: liveness never reads the signing
/// secret and never touches the counter or the orchestrator.
pub async fn liveness() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            ("content-type", "application/json"),
            ("access-control-allow-origin", "*"),
        ],
        LIVENESS_BODY,
    )
}

fn invalid_hmac() -> Response {
    (StatusCode::UNAUTHORIZED, "Invalid HMAC").into_response()
}

fn upstream_failure(err: impl std::fmt::Display) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

/// POST / — verified run-status notification.
///
/// Signature verification short-circuits before any parsing or
/// mutation. A verified body that carries no recognizable run status
/// degrades to reporting current capacity with the liveness string.
pub async fn notify(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(claimed) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        debug!("notification rejected: no signature header");
        return invalid_hmac();
    };

    let secret = match state.secrets.get(&state.token_param).await {
        Ok(Some(secret)) => secret,
        Ok(None) => {
            warn!(param = %state.token_param, "signing secret is not provisioned");
            return upstream_failure("notification signing secret is not provisioned");
        }
        Err(e) => return upstream_failure(e),
    };

    if !auth::verify_signature(secret.as_bytes(), &body, claimed) {
        debug!("notification rejected: signature mismatch");
        return invalid_hmac();
    }

    // Malformed bodies degrade to an empty batch: capacity is still
    // described and reported, matching the notifier's verification
    // pings which carry no run status.
    let batch: NotificationBatch = match serde_json::from_slice(&body) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "notification body is not a valid batch; treating as no-op");
            NotificationBatch::default()
        }
    };

    match state.reconciler.apply(&batch).await {
        Ok(ScaleOutcome::Updated { desired, .. }) => {
            Json(("Updated service count:", desired)).into_response()
        }
        Ok(ScaleOutcome::NoChange { current_desired }) => {
            debug!(current_desired, "no actionable run status in batch");
            Json(LIVENESS_BODY).into_response()
        }
        Err(e) => upstream_failure(e),
    }
}
