use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Site Router Module
///
/// The HTML pages. Every path here except `/verify` is **guarded**: the access gate in
/// front of the whole router redirects visitors without `verified=true` to the PIN form
/// before any of these handlers run.
pub fn site_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /verify
        // The PIN entry form and its submission. Exempt from the gate.
        .route(
            "/verify",
            get(handlers::verify_page).post(handlers::submit_verify_form),
        )
        .route("/", get(handlers::home_page))
        .route("/about", get(handlers::about_page))
        .route("/contact", get(handlers::contact_page))
        // GET/POST /donate
        // Donation form; a successful post redirects to the hosted checkout page.
        .route(
            "/donate",
            get(handlers::donate_page).post(handlers::submit_donation),
        )
        // GET /success?session_id=...
        // Where the payment provider returns the donor after paying.
        .route("/success", get(handlers::success_page))
}
