//! gantry-api — the webhook surface of the autoscaler.
//!
//! One route, two behaviors:
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/` | Verified run-status notification → reconcile |
//! | any other | `/` | Liveness payload, no secrets, no state |
//!
//! POST requests must carry a valid `x-notification-signature`; the
//! signature check is a hard pre-condition and nothing is mutated when
//! it fails.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;

use gantry_scale::Reconciler;
use gantry_state::ParamStore;

/// Shared context for the webhook handlers.
///
/// Built once at startup and threaded through axum `State`; there is
/// no ambient global state.
#[derive(Clone)]
pub struct ApiState {
    /// Store holding the notification-signing secret.
    pub secrets: Arc<dyn ParamStore>,
    /// Reconciler driving the managed service.
    pub reconciler: Arc<Reconciler>,
    /// Name of the parameter holding the signing secret.
    pub token_param: String,
}

/// Build the webhook router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::notify).fallback(handlers::liveness),
        )
        .with_state(state)
}
