use crate::{
    auth::AuthToken,
    checkout::{CheckoutError, CheckoutState},
    config::AppConfig,
    gate::HOME_ROUTE,
    models::{
        CheckoutSession, DonationForm, DonationRequest, ErrorResponse, SuccessQuery,
        VerifyForm, VerifyPinRequest, VerifyPinResponse,
    },
    pin::{EntryOutcome, PinEntry},
    views,
};
use axum::{
    Form, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, LOCATION, ORIGIN, SET_COOKIE},
    },
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};

// --- Helpers ---

fn no_store() -> HeaderValue {
    HeaderValue::from_static("no-store")
}

/// Origin the checkout provider should return the donor to: the request's `Origin`
/// header when present, otherwise the configured site URL.
fn request_origin(headers: &HeaderMap, config: &AppConfig) -> String {
    headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .filter(|origin| !origin.is_empty() && *origin != "null")
        .unwrap_or(config.site_url.as_str())
        .trim_end_matches('/')
        .to_string()
}

/// Issues a fresh access cookie. Every successful comparison goes through here, so a
/// repeat verification simply restarts the 24 hour window.
fn access_cookie(now: DateTime<Utc>) -> Result<HeaderValue, StatusCode> {
    AuthToken::issue(now)
        .set_cookie_header()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

fn evaluate_submission(config: &AppConfig, submitted: &str) -> (PinEntry, EntryOutcome) {
    let mut entry = PinEntry::new();
    let outcome = entry.paste(submitted, &config.access_pin, Utc::now());
    (entry, outcome)
}

// --- PIN Verification ---

/// verify_page
///
/// [Exempt Route] Renders an empty PIN entry form.
pub async fn verify_page() -> impl IntoResponse {
    ([(CACHE_CONTROL, no_store())], Html(views::verify_page(&PinEntry::new())))
}

/// submit_verify_form
///
/// [Exempt Route] Handles the PIN form post. The submitted slots are fed through a fresh
/// `PinEntry`, so non-digits are dropped and anything past four digits is cut off.
///
/// * Match: `303` to the home page with the access cookie. `no-store` keeps the browser
///   from reusing the redirect it was given before verifying.
/// * Mismatch: the form with the error shown; it resets itself after the error pulse.
/// * Fewer than four digits: the form again with what was entered, nothing evaluated.
pub async fn submit_verify_form(
    State(config): State<AppConfig>,
    Form(form): Form<VerifyForm>,
) -> Response {
    let (entry, outcome) = evaluate_submission(&config, &form.submitted());

    match outcome {
        EntryOutcome::Accepted => match access_cookie(Utc::now()) {
            Ok(cookie) => (
                StatusCode::SEE_OTHER,
                [
                    (LOCATION, HeaderValue::from_static(HOME_ROUTE)),
                    (SET_COOKIE, cookie),
                    (CACHE_CONTROL, no_store()),
                ],
            )
                .into_response(),
            Err(status) => status.into_response(),
        },
        EntryOutcome::Rejected | EntryOutcome::Pending | EntryOutcome::Ignored => {
            ([(CACHE_CONTROL, no_store())], Html(views::verify_page(&entry))).into_response()
        }
    }
}

/// verify_pin
///
/// [Exempt Route] JSON flavour of the PIN check for script clients.
#[utoipa::path(
    post,
    path = "/api/verify",
    request_body = VerifyPinRequest,
    responses(
        (status = 200, description = "PIN accepted, access cookie set", body = VerifyPinResponse),
        (status = 401, description = "PIN rejected", body = VerifyPinResponse),
        (status = 422, description = "Fewer than four digits", body = ErrorResponse)
    )
)]
pub async fn verify_pin(
    State(config): State<AppConfig>,
    body: Result<Json<VerifyPinRequest>, JsonRejection>,
) -> Response {
    // An unreadable body is treated like an empty submission.
    let pin = body.map(|Json(payload)| payload.pin).unwrap_or_default();
    let (_, outcome) = evaluate_submission(&config, &pin);

    match outcome {
        EntryOutcome::Accepted => match access_cookie(Utc::now()) {
            Ok(cookie) => (
                StatusCode::OK,
                [(SET_COOKIE, cookie), (CACHE_CONTROL, no_store())],
                Json(VerifyPinResponse {
                    verified: true,
                    redirect_to: Some(HOME_ROUTE.to_string()),
                }),
            )
                .into_response(),
            Err(status) => status.into_response(),
        },
        EntryOutcome::Rejected => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyPinResponse {
                verified: false,
                redirect_to: None,
            }),
        )
            .into_response(),
        EntryOutcome::Pending | EntryOutcome::Ignored => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "PIN must contain 4 digits".to_string(),
            }),
        )
            .into_response(),
    }
}

// --- Checkout ---

/// create_checkout_session
///
/// [Exempt Route] Validates the donation and asks the payment provider for a hosted
/// checkout session. Any provider failure, including a 2xx without a URL, comes back as
/// `{error}`.
#[utoipa::path(
    post,
    path = "/api/create-checkout-session",
    request_body = DonationRequest,
    responses(
        (status = 200, description = "Session created", body = CheckoutSession),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 502, description = "Payment provider failure", body = ErrorResponse)
    )
)]
pub async fn create_checkout_session(
    State(checkout): State<CheckoutState>,
    State(config): State<AppConfig>,
    headers: HeaderMap,
    body: Result<Json<DonationRequest>, JsonRejection>,
) -> Result<Json<CheckoutSession>, CheckoutError> {
    let Json(payload) = body?;
    payload.validate()?;
    let origin = request_origin(&headers, &config);

    let session = checkout
        .create_session(&payload, &origin)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "checkout session creation failed"))?;

    tracing::info!(session_id = %session.session_id, "checkout session created");
    Ok(Json(session))
}

// --- Pages ---

pub async fn home_page() -> Html<String> {
    Html(views::content_page(
        "Maurice A. Ferré Foundation",
        &[
            "Supporting education, arts, and community development.",
            "Every donation makes a difference.",
        ],
    ))
}

pub async fn about_page() -> Html<String> {
    Html(views::content_page(
        "About",
        &["The Maurice A. Ferré Foundation supports education, arts, and community development."],
    ))
}

pub async fn contact_page() -> Html<String> {
    Html(views::content_page(
        "Contact",
        &["Reach the foundation through the site administrator."],
    ))
}

pub async fn donate_page() -> Html<String> {
    Html(views::donate_page(&DonationForm::default(), None))
}

/// submit_donation
///
/// [Guarded Route] Form flavour of the checkout call. Success sends the donor to the
/// hosted checkout page; failure re-renders the form with the donor's input intact and
/// the reason as an alert.
pub async fn submit_donation(
    State(checkout): State<CheckoutState>,
    State(config): State<AppConfig>,
    headers: HeaderMap,
    Form(form): Form<DonationForm>,
) -> Response {
    let Some(amount) = form.resolve_amount() else {
        return (
            StatusCode::BAD_REQUEST,
            Html(views::donate_page(
                &form,
                Some("Please enter a valid donation amount"),
            )),
        )
            .into_response();
    };

    let request = DonationRequest {
        amount,
        name: form.name.clone(),
        email: form.email.clone(),
    };
    let origin = request_origin(&headers, &config);

    let result = match request.validate() {
        Ok(()) => checkout.create_session(&request, &origin).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(session) => {
            tracing::info!(session_id = %session.session_id, "checkout session created");
            Redirect::to(&session.url).into_response()
        }
        Err(e) => {
            if !matches!(e, CheckoutError::Validation(_)) {
                tracing::error!(error = %e, "checkout session creation failed");
            }
            (
                e.status_code(),
                Html(views::donate_page(&form, Some(&e.to_string()))),
            )
                .into_response()
        }
    }
}

pub async fn success_page(Query(query): Query<SuccessQuery>) -> Html<String> {
    Html(views::success_page(query.session_id.as_deref()))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(views::not_found_page()))
}
