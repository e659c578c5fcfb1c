use async_trait::async_trait;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{CheckoutSession, DonationRequest, ErrorResponse};

const PRODUCT_NAME: &str = "Donation to Maurice A. Ferré Foundation";
const PRODUCT_DESCRIPTION: &str = "Supporting education, arts, and community development";
const CURRENCY: &str = "usd";

/// CheckoutError
///
/// Everything that can go wrong between receiving a donation request and handing the
/// donor a hosted checkout URL.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request failed local validation; the message is shown to the donor as is.
    #[error("{0}")]
    Validation(String),

    /// The provider could not be reached.
    #[error("Could not reach the payment provider: {0}")]
    Network(String),

    /// The provider answered with a non-2xx status.
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// The provider answered 2xx but without a redirect URL.
    #[error("Payment provider did not return a checkout URL")]
    MissingUrl,

    /// The provider's success body could not be decoded.
    #[error("Unexpected response from the payment provider: {0}")]
    Decode(String),
}

impl CheckoutError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Network(_) | Self::Provider { .. } | Self::MissingUrl | Self::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// A body that is not JSON, or whose fields have the wrong types, is answered like any
/// other invalid donation.
impl From<JsonRejection> for CheckoutError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected checkout body");
        Self::Validation("Invalid request body".to_string())
    }
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// 1. CheckoutService Contract
/// CheckoutService
///
/// The contract for creating a hosted checkout session. Handlers only see this trait, so
/// tests can swap the Stripe client for `MockCheckoutService`.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Creates a session for `donation`. `origin` is the site origin the provider should
    /// send the donor back to.
    async fn create_session(
        &self,
        donation: &DonationRequest,
        origin: &str,
    ) -> Result<CheckoutSession, CheckoutError>;
}

/// CheckoutState
///
/// The concrete type used to share the checkout service across the application state.
pub type CheckoutState = Arc<dyn CheckoutService>;

// 2. The Real Implementation (Stripe)
/// StripeCheckoutClient
///
/// Talks to the Stripe REST API directly: one form-encoded `POST /v1/checkout/sessions`
/// authenticated with the secret key.
#[derive(Clone)]
pub struct StripeCheckoutClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

impl StripeCheckoutClient {
    pub fn new(api_base: &str, secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    /// Form fields for a single-item card payment in USD.
    fn session_params(donation: &DonationRequest, origin: &str) -> Vec<(&'static str, String)> {
        let origin = origin.trim_end_matches('/');
        vec![
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price_data][currency]", CURRENCY.to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                PRODUCT_NAME.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                PRODUCT_DESCRIPTION.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                donation.unit_amount_cents().to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("mode", "payment".to_string()),
            (
                "success_url",
                format!("{origin}/success?session_id={{CHECKOUT_SESSION_ID}}"),
            ),
            ("cancel_url", origin.to_string()),
            ("customer_email", donation.email.trim().to_string()),
            ("metadata[donor_name]", donation.name.trim().to_string()),
        ]
    }
}

#[async_trait]
impl CheckoutService for StripeCheckoutClient {
    async fn create_session(
        &self,
        donation: &DonationRequest,
        origin: &str,
    ) -> Result<CheckoutSession, CheckoutError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&Self::session_params(donation, origin))
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Prefer Stripe's own message; fall back to a generic one if the body is not
            // the usual error envelope.
            let message = response
                .json::<StripeErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| "Failed to create checkout session".to_string());
            return Err(CheckoutError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let session = response
            .json::<StripeSession>()
            .await
            .map_err(|e| CheckoutError::Decode(e.to_string()))?;

        let url = session
            .url
            .filter(|url| !url.is_empty())
            .ok_or(CheckoutError::MissingUrl)?;

        Ok(CheckoutSession {
            session_id: session.id,
            url,
        })
    }
}

// 3. The Mock Implementation (For Tests)
/// MockCheckoutService
///
/// Returns a deterministic session (or a simulated provider failure) without any network
/// traffic.
#[derive(Clone, Default)]
pub struct MockCheckoutService {
    /// When true, every call fails with a provider error.
    pub should_fail: bool,
}

impl MockCheckoutService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl CheckoutService for MockCheckoutService {
    async fn create_session(
        &self,
        donation: &DonationRequest,
        _origin: &str,
    ) -> Result<CheckoutSession, CheckoutError> {
        if self.should_fail {
            return Err(CheckoutError::Provider {
                status: 500,
                message: "Mock Checkout Error: Simulation requested".to_string(),
            });
        }

        Ok(CheckoutSession {
            session_id: "cs_test_mock".to_string(),
            url: format!(
                "https://checkout.stripe.test/c/pay/cs_test_mock?amount={}",
                donation.unit_amount_cents()
            ),
        })
    }
}
