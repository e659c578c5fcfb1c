use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, InvalidHeaderValue},
        request::Parts,
    },
};
use chrono::{DateTime, TimeDelta, Utc};
use std::convert::Infallible;

/// Name of the cookie that marks a browser as having entered the access PIN.
pub const ACCESS_COOKIE_NAME: &str = "verified";
/// The only value that admits a request.
pub const ACCESS_COOKIE_VALUE: &str = "true";
/// Lifetime of an issued cookie (24 hours).
pub const ACCESS_COOKIE_TTL_SECS: i64 = 86_400;

/// AuthToken
///
/// The issued access credential as a value: when it was handed out and for how long it
/// stays good. The browser enforces the lifetime through `Max-Age`; keeping it as data
/// lets the expiry rule be checked without a cookie store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthToken {
    pub issued_at: DateTime<Utc>,
    pub ttl: TimeDelta,
}

impl AuthToken {
    /// A fresh token with the standard 24 hour lifetime.
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self::with_ttl(now, TimeDelta::seconds(ACCESS_COOKIE_TTL_SECS))
    }

    pub fn with_ttl(issued_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self { issued_at, ttl }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + self.ttl
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    /// Renders the `Set-Cookie` value. Site-wide path, no `Secure`/`HttpOnly`/`SameSite`.
    pub fn set_cookie_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&format!(
            "{ACCESS_COOKIE_NAME}={ACCESS_COOKIE_VALUE}; Path=/; Max-Age={}",
            self.ttl.num_seconds()
        ))
    }
}

/// CredentialState
///
/// What a request presents in its `Cookie` header. Only `Verified` admits a request to a
/// guarded route; `Missing` and `Rejected` are both treated as unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// No `verified` cookie at all.
    Missing,
    /// A `verified` cookie with any value other than `true`, including empty.
    Rejected,
    /// `verified=true`.
    Verified,
}

impl CredentialState {
    /// Reads the first `verified` pair across all `Cookie` headers. Header values that are
    /// not visible ASCII are skipped, so garbage never counts as a credential.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        for header in headers.get_all(COOKIE) {
            let Ok(value) = header.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                let mut parts = pair.trim().splitn(2, '=');
                let key = parts.next().unwrap_or_default().trim();
                if key != ACCESS_COOKIE_NAME {
                    continue;
                }
                let val = parts.next().unwrap_or_default().trim();
                return if val == ACCESS_COOKIE_VALUE {
                    Self::Verified
                } else {
                    Self::Rejected
                };
            }
        }
        Self::Missing
    }

    pub fn is_verified(&self) -> bool {
        *self == Self::Verified
    }
}

/// CredentialState Extractor Implementation
///
/// Lets the access gate (and any handler) take the credential as an argument. Never
/// rejects: an unreadable cookie simply resolves to `Missing`.
impl<S> FromRequestParts<S> for CredentialState
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
