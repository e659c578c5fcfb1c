use std::env;

use crate::pin::AccessPin;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is immutable once loaded
/// and is shared with every handler (and the access gate) through `AppState` via FromRef.
/// The shared access PIN lives here so it is read exactly once at process start.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which secrets are mandatory.
    pub env: Env,
    // The shared 4-digit code that unlocks the site.
    pub access_pin: AccessPin,
    // Secret API key for the hosted checkout provider (Stripe).
    pub stripe_secret_key: String,
    // Base URL of the checkout provider API. Overridden in tests to point at a mock server.
    pub stripe_api_base: String,
    // Public origin of the site, used when a request carries no Origin header.
    pub site_url: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Directory served under `/assets`.
    pub assets_dir: String,
}

/// Env
///
/// Defines the runtime context: local development (pretty logs, placeholder secrets) or
/// production (JSON logs, mandatory secrets).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ASSETS_DIR: &str = "assets";

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup,
    /// so state can be built without touching environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            access_pin: AccessPin::default(),
            stripe_secret_key: "sk_test_local".to_string(),
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            assets_dir: DEFAULT_ASSETS_DIR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Initializes the configuration from environment variables at startup and implements
    /// the **fail-fast** principle.
    ///
    /// # Panics
    /// Panics if `ACCESS_PIN` is set but is not exactly four digits, or if a variable that is
    /// mandatory in Production (`STRIPE_SECRET_KEY`, `SITE_URL`) is missing.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The PIN falls back to the historical default in every environment,
        // but a malformed override must never boot.
        let access_pin = match env::var("ACCESS_PIN") {
            Ok(raw) => AccessPin::parse(&raw)
                .unwrap_or_else(|e| panic!("FATAL: ACCESS_PIN is invalid: {e}")),
            Err(_) => AccessPin::default(),
        };

        let stripe_api_base = env::var("STRIPE_API_BASE")
            .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let assets_dir =
            env::var("ASSETS_DIR").unwrap_or_else(|_| DEFAULT_ASSETS_DIR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                access_pin,
                // Local runs may never reach Stripe, so a placeholder key is acceptable.
                stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                    .unwrap_or_else(|_| "sk_test_local".to_string()),
                stripe_api_base,
                site_url: env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string()),
                bind_addr,
                assets_dir,
            },
            Env::Production => Self {
                env: Env::Production,
                access_pin,
                stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                    .expect("FATAL: STRIPE_SECRET_KEY required in prod"),
                stripe_api_base,
                site_url: env::var("SITE_URL").expect("FATAL: SITE_URL required in prod"),
                bind_addr,
                assets_dir,
            },
        }
    }
}
