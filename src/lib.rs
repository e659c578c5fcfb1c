use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access control: the credential, the gate, and the PIN entry state machine.
pub mod auth;
pub mod gate;
pub mod pin;

// Application services and components.
pub mod checkout;
pub mod config;
pub mod handlers;
pub mod models;
pub mod views;

// Routing split by how the gate treats each group.
pub mod routes;
use routes::{api, site};

// --- Public Re-exports ---

pub use checkout::{CheckoutState, MockCheckoutService, StripeCheckoutClient};
pub use config::AppConfig;

/// ApiDoc
///
/// Auto-generated OpenAPI document for the JSON endpoints, served at `/api/openapi.json`
/// with Swagger UI at `/api/docs`. Both sit under the exempt `/api` prefix.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::verify_pin, handlers::create_checkout_session),
    components(
        schemas(
            models::DonationRequest, models::CheckoutSession, models::ErrorResponse,
            models::VerifyPinRequest, models::VerifyPinResponse,
        )
    ),
    tags(
        (name = "maff-portal", description = "MAFF donation site API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container shared by every request: the loaded configuration
/// (including the access PIN) and the checkout service.
#[derive(Clone)]
pub struct AppState {
    /// Configuration: loaded once at startup, never mutated.
    pub config: AppConfig,
    /// Checkout Layer: creates hosted payment sessions (Stripe, or a mock in tests).
    pub checkout: CheckoutState,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for CheckoutState {
    fn from_ref(app_state: &AppState) -> CheckoutState {
        app_state.checkout.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, wraps all of them (fallback included) in the access gate, then
/// adds the observability and CORS layers outside the gate so redirects are traced too.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS: only the site's own origin may call the JSON API from a browser.
    let cors = match HeaderValue::from_str(state.config.site_url.trim_end_matches('/')) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
        Err(_) => CorsLayer::new(),
    };

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let assets = ServeDir::new(&state.config.assets_dir);

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .merge(api::api_routes())
        .merge(site::site_routes())
        .nest_service("/assets", assets)
        .route("/favicon.ico", get(|| async { axum::http::StatusCode::NO_CONTENT }))
        .fallback(handlers::not_found)
        .with_state(state)
        // 3. The access gate. Added after every route and the fallback so nothing
        // reaches a handler without passing it.
        .layer(middleware::from_fn(gate::access_gate));

    // 4. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer (outermost)
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `http_request` span for `TraceLayer`, carrying the method, URI and the
/// `x-request-id` set by `SetRequestIdLayer`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
