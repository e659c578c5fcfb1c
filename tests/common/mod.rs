#![allow(dead_code)]

use axum::{Router, body::Body, http::Request, response::Response};
use chrono::{DateTime, TimeDelta, Utc};
use maff_portal::{
    AppConfig, AppState, MockCheckoutService, auth::AuthToken, create_router, pin::AccessPin,
};
use std::sync::Arc;
use tower::util::ServiceExt;

// --- App Builders ---

pub fn app_with(config: AppConfig, checkout: MockCheckoutService) -> Router {
    create_router(AppState {
        config,
        checkout: Arc::new(checkout),
    })
}

pub fn app() -> Router {
    app_with(AppConfig::default(), MockCheckoutService::new())
}

pub fn app_with_pin(pin: &str) -> Router {
    let config = AppConfig {
        access_pin: AccessPin::parse(pin).unwrap(),
        ..AppConfig::default()
    };
    app_with(config, MockCheckoutService::new())
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

// --- Simulated Browser Cookie Store ---

/// Holds the access cookie the way a browser would: remembers when it was stored and
/// for how long (`Max-Age`), and stops sending it once that lifetime has passed.
#[derive(Default)]
pub struct CookieJar {
    token: Option<AuthToken>,
}

impl CookieJar {
    /// Stores a `verified=true` cookie from a `Set-Cookie` value received at `now`.
    pub fn store(&mut self, set_cookie: &str, now: DateTime<Utc>) {
        let mut attributes = set_cookie.split(';').map(str::trim);
        if attributes.next() != Some("verified=true") {
            return;
        }
        let max_age = attributes
            .find_map(|attr| attr.strip_prefix("Max-Age="))
            .and_then(|secs| secs.parse::<i64>().ok())
            .unwrap_or(0);
        self.token = Some(AuthToken::with_ttl(now, TimeDelta::seconds(max_age)));
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.token
    }

    /// The `Cookie` header to send at `now`, if the stored cookie is still alive.
    pub fn cookie_header(&self, now: DateTime<Utc>) -> Option<String> {
        self.token
            .filter(|token| token.is_valid_at(now))
            .map(|_| "verified=true".to_string())
    }

    pub fn request(&self, uri: &str, now: DateTime<Utc>) -> Request<Body> {
        match self.cookie_header(now) {
            Some(cookie) => get_with_cookie(uri, &cookie),
            None => get(uri),
        }
    }
}
