//! The access gate that sits in front of every page.
//!
//! `classify` and `decide` are pure functions over the request path and the presented
//! credential; `access_gate` is the thin axum adapter applied to the whole router.

use axum::{
    extract::Request,
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, LOCATION},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::CredentialState;

/// The PIN entry page. Always reachable.
pub const VERIFY_ROUTE: &str = "/verify";
/// Where a freshly verified visitor lands.
pub const HOME_ROUTE: &str = "/";

/// Paths starting with any of these skip the gate entirely: the JSON API (which also
/// hosts the OpenAPI docs), static assets, and the favicon. Matching is a plain string
/// prefix, so `/api` covers `/api`, `/api/...` and `/apixyz` alike.
pub const EXEMPT_PREFIXES: [&str; 3] = ["/api", "/assets", "/favicon.ico"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Exempt,
    Guarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(&'static str),
}

pub fn classify(path: &str) -> RouteClass {
    if path == VERIFY_ROUTE || EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        RouteClass::Exempt
    } else {
        RouteClass::Guarded
    }
}

/// Exempt paths pass without looking at the cookie. Guarded paths pass only with
/// `verified=true`; everything else is sent to the PIN page and the requested path is
/// dropped.
pub fn decide(path: &str, credential: &CredentialState) -> Decision {
    match classify(path) {
        RouteClass::Exempt => Decision::Allow,
        RouteClass::Guarded if credential.is_verified() => Decision::Allow,
        RouteClass::Guarded => Decision::RedirectTo(VERIFY_ROUTE),
    }
}

/// 307 to `route`. Marked `no-store` so a browser never replays a cached denial after
/// the visitor has verified.
pub fn redirect_response(route: &'static str) -> Response {
    (
        StatusCode::TEMPORARY_REDIRECT,
        [
            (LOCATION, HeaderValue::from_static(route)),
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
    )
        .into_response()
}

/// access_gate
///
/// Middleware applied to the entire router, including the fallback, so unknown guarded
/// paths redirect instead of leaking a 404.
pub async fn access_gate(credential: CredentialState, request: Request, next: Next) -> Response {
    match decide(request.uri().path(), &credential) {
        Decision::Allow => next.run(request).await,
        Decision::RedirectTo(route) => redirect_response(route),
    }
}
