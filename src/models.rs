use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::checkout::CheckoutError;

/// Smallest donation the site accepts, in dollars.
pub const MIN_DONATION: f64 = 1.0;

/// Largest donation a single checkout session can carry, in dollars (Stripe caps
/// `unit_amount` at eight digits of cents).
pub const MAX_DONATION: f64 = 999_999.99;

/// Preset amounts offered on the donate form, in dollars.
pub const PRESET_AMOUNTS: [u32; 5] = [250, 500, 1000, 2500, 5000];

// --- Checkout (JSON API) ---

/// DonationRequest
///
/// Body of `POST /api/create-checkout-session`. Absent and `null` fields both default,
/// so a missing field surfaces as the `{error}` payload instead of an extractor
/// rejection. A numeric string amount is read as the number it spells.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct DonationRequest {
    /// Donation amount in dollars.
    #[serde(default, deserialize_with = "deserialize_amount")]
    #[schema(example = 250.0)]
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "ada@example.com")]
    pub email: String,
}

impl DonationRequest {
    /// validate
    ///
    /// Checks the payload before the provider is contacted. Presence is checked first,
    /// then the amount range, then the email shape.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.amount == 0.0 || self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "Missing required fields".to_string(),
            ));
        }
        if !self.amount.is_finite() || !(MIN_DONATION..=MAX_DONATION).contains(&self.amount) {
            return Err(CheckoutError::Validation(
                "Please enter a valid donation amount".to_string(),
            ));
        }
        if !valid_email(self.email.trim()) {
            return Err(CheckoutError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        Ok(())
    }

    /// Amount in cents, rounded to the nearest cent. Only meaningful once `validate`
    /// has passed.
    pub fn unit_amount_cents(&self) -> i64 {
        (self.amount * 100.0).round() as i64
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a number, a numeric string or `null`. An empty string counts as absent; any
/// other string becomes `NaN` so it fails the amount check rather than the parse.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AmountInput {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<AmountInput>::deserialize(deserializer)? {
        Some(AmountInput::Number(amount)) => amount,
        Some(AmountInput::Text(text)) if text.trim().is_empty() => 0.0,
        Some(AmountInput::Text(text)) => text.trim().parse().unwrap_or(f64::NAN),
        None => 0.0,
    })
}

/// Basic email format check.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// CheckoutSession
///
/// Successful response: the provider's session id and the hosted page to send the donor to.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    #[schema(example = "cs_test_a1b2c3")]
    pub session_id: String,
    #[schema(example = "https://checkout.stripe.com/c/pay/cs_test_a1b2c3")]
    pub url: String,
}

/// ErrorResponse
///
/// Failure payload shared by the JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

// --- PIN verification (JSON API) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct VerifyPinRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "5555")]
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinResponse {
    pub verified: bool,
    /// Where the client should navigate next. Only present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub redirect_to: Option<String>,
}

// --- HTML forms ---

/// VerifyForm
///
/// `POST /verify` body. The page posts one field per slot (`d0`..`d3`); a single `pin`
/// field is accepted too. Whatever arrives is joined in that order.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct VerifyForm {
    pub pin: Option<String>,
    pub d0: Option<String>,
    pub d1: Option<String>,
    pub d2: Option<String>,
    pub d3: Option<String>,
}

impl VerifyForm {
    pub fn submitted(&self) -> String {
        [&self.pin, &self.d0, &self.d1, &self.d2, &self.d3]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// DonationForm
///
/// `POST /donate` body. `amount` is either one of the presets or `custom`, in which case
/// `custom_amount` carries the figure. Kept whole so a failed attempt can be re-rendered
/// with everything the donor typed.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DonationForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub custom_amount: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl DonationForm {
    /// The chosen amount, if it parses and clears the minimum.
    pub fn resolve_amount(&self) -> Option<f64> {
        let raw = if self.amount == "custom" || self.amount.is_empty() {
            &self.custom_amount
        } else {
            &self.amount
        };
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && (MIN_DONATION..=MAX_DONATION).contains(amount))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}
