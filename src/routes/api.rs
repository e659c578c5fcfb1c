use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// API Router Module
///
/// JSON endpoints under `/api`. The whole prefix is **exempt** from the access gate, so
/// these never redirect.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // Liveness probe for load balancers.
        .route("/api/health", get(|| async { "ok" }))
        // POST /api/verify
        // JSON PIN check; sets the access cookie on success.
        .route("/api/verify", post(handlers::verify_pin))
        // POST /api/create-checkout-session
        // Creates a hosted checkout session and returns its URL.
        .route(
            "/api/create-checkout-session",
            post(handlers::create_checkout_session),
        )
}
