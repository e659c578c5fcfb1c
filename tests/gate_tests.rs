use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{TimeDelta, TimeZone, Utc};
use maff_portal::{
    auth::{ACCESS_COOKIE_TTL_SECS, AuthToken, CredentialState},
    gate::{Decision, RouteClass, VERIFY_ROUTE, classify, decide},
};

const EXEMPT_PATHS: [&str; 8] = [
    "/verify",
    "/api",
    "/api/health",
    "/api/create-checkout-session",
    "/api/docs/index.html",
    "/assets/site.css",
    "/favicon.ico",
    "/apixyz",
];

const GUARDED_PATHS: [&str; 8] = [
    "/",
    "/dashboard",
    "/donate",
    "/success",
    "/verify/extra",
    "/verifyx",
    "/about/api",
    "/does-not-exist",
];

const ALL_CREDENTIALS: [CredentialState; 3] = [
    CredentialState::Missing,
    CredentialState::Rejected,
    CredentialState::Verified,
];

fn cookie_headers(values: &[&str]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for value in values {
        headers.append(header::COOKIE, HeaderValue::from_str(value).unwrap());
    }
    headers
}

// --- Route Classification ---

#[test]
fn test_classify_exempt_paths() {
    for path in EXEMPT_PATHS {
        assert_eq!(classify(path), RouteClass::Exempt, "{path} should be exempt");
    }
}

#[test]
fn test_classify_guarded_paths() {
    for path in GUARDED_PATHS {
        assert_eq!(classify(path), RouteClass::Guarded, "{path} should be guarded");
    }
}

// --- Decisions ---

#[test]
fn test_exempt_paths_allowed_for_every_credential() {
    for path in EXEMPT_PATHS {
        for credential in ALL_CREDENTIALS {
            assert_eq!(decide(path, &credential), Decision::Allow, "{path} / {credential:?}");
        }
    }
}

#[test]
fn test_guarded_paths_redirect_without_valid_cookie() {
    for path in GUARDED_PATHS {
        for credential in [CredentialState::Missing, CredentialState::Rejected] {
            assert_eq!(
                decide(path, &credential),
                Decision::RedirectTo(VERIFY_ROUTE),
                "{path} / {credential:?}"
            );
        }
    }
}

#[test]
fn test_guarded_paths_allowed_with_valid_cookie() {
    for path in GUARDED_PATHS {
        assert_eq!(decide(path, &CredentialState::Verified), Decision::Allow);
    }
}

// --- Cookie Parsing ---

#[test]
fn test_credential_missing_without_cookie_header() {
    assert_eq!(CredentialState::from_headers(&HeaderMap::new()), CredentialState::Missing);
}

#[test]
fn test_credential_verified_only_for_exact_true() {
    let cases = [
        ("verified=true", CredentialState::Verified),
        ("theme=dark; verified=true", CredentialState::Verified),
        ("verified=true;other=1", CredentialState::Verified),
        ("verified=", CredentialState::Rejected),
        ("verified", CredentialState::Rejected),
        ("verified=false", CredentialState::Rejected),
        ("verified=TRUE", CredentialState::Rejected),
        ("verified=true1", CredentialState::Rejected),
        ("verified=\"true\"", CredentialState::Rejected),
        ("notverified=true", CredentialState::Missing),
        ("Verified=true", CredentialState::Missing),
        ("theme=dark", CredentialState::Missing),
    ];
    for (cookie, expected) in cases {
        assert_eq!(
            CredentialState::from_headers(&cookie_headers(&[cookie])),
            expected,
            "cookie header {cookie:?}"
        );
    }
}

#[test]
fn test_credential_first_verified_pair_wins() {
    let headers = cookie_headers(&["verified=nope; verified=true"]);
    assert_eq!(CredentialState::from_headers(&headers), CredentialState::Rejected);

    let headers = cookie_headers(&["theme=dark", "verified=true"]);
    assert_eq!(CredentialState::from_headers(&headers), CredentialState::Verified);
}

#[test]
fn test_credential_non_ascii_header_is_ignored() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_bytes(b"verified=true\xff").unwrap(),
    );
    assert_eq!(CredentialState::from_headers(&headers), CredentialState::Missing);
}

// --- Token Lifetime ---

#[test]
fn test_token_valid_until_ttl_elapses() {
    let issued = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let token = AuthToken::issue(issued);

    assert_eq!(token.ttl, TimeDelta::seconds(ACCESS_COOKIE_TTL_SECS));
    assert!(token.is_valid_at(issued));
    assert!(token.is_valid_at(issued + TimeDelta::seconds(86_399)));
    assert!(!token.is_valid_at(issued + TimeDelta::seconds(86_400)));
    assert!(!token.is_valid_at(issued + TimeDelta::days(2)));
}

#[test]
fn test_token_set_cookie_header_format() {
    let token = AuthToken::issue(Utc::now());
    let header = token.set_cookie_header().unwrap();
    assert_eq!(header.to_str().unwrap(), "verified=true; Path=/; Max-Age=86400");
}

#[test]
fn test_reissued_token_extends_expiry() {
    let first = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let second = first + TimeDelta::hours(20);

    let old = AuthToken::issue(first);
    let renewed = AuthToken::issue(second);

    let later = first + TimeDelta::hours(30);
    assert!(!old.is_valid_at(later));
    assert!(renewed.is_valid_at(later));
}
