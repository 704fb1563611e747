//! Top-level router: API routes, health check and cross-cutting layers.

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::courses::course_routes;
use super::middleware::auth_middleware;
use super::payments::payment_routes;
use super::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Settings for the outer layers.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Allowed browser origins. `*` allows any.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Builds the complete application router.
///
/// ```text
/// /health                  GET   liveness
/// /api/payments/...        payment and membership routes
/// /api/courses/...         access routes
/// ```
pub fn app_router(state: AppState, settings: &HttpSettings) -> Router {
    let auth_state = state.session_validator.clone();

    let api = Router::new()
        .nest("/api/payments", payment_routes())
        .nest("/api/courses", course_routes())
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors_layer(&settings.cors_origins))
                .layer(TimeoutLayer::new(settings.request_timeout)),
        )
}

async fn health() -> &'static str {
    "OK"
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryMembershipRepository, InMemoryPlatformStore, InMemoryTransactionRepository,
    };
    use crate::adapters::yookassa::MockPaymentGateway;
    use crate::application::{CheckoutSettings, WebhookVerification};

    fn test_app(origins: &[&str]) -> Router {
        let platform = Arc::new(InMemoryPlatformStore::new());
        let state = AppState {
            transactions: Arc::new(InMemoryTransactionRepository::new()),
            memberships: Arc::new(InMemoryMembershipRepository::new()),
            tiers: platform.clone(),
            communities: platform.clone(),
            courses: platform.clone(),
            profiles: platform,
            gateway: Arc::new(MockPaymentGateway::new()),
            event_publisher: Arc::new(InMemoryEventBus::new()),
            session_validator: Arc::new(MockSessionValidator::new().with_test_user("t", "u")),
            checkout: CheckoutSettings::new("https://app.example.test"),
            webhook_verification: WebhookVerification::Trust,
        };
        let settings = HttpSettings {
            cors_origins: origins.iter().map(|s| s.to_string()).collect(),
            ..HttpSettings::default()
        };
        app_router(state, &settings)
    }

    #[tokio::test]
    async fn health_is_ok_and_carries_request_id() {
        let response = test_app(&[])
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn incoming_request_id_is_echoed() {
        let response = test_app(&[])
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(REQUEST_ID_HEADER, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    }

    #[tokio::test]
    async fn protected_route_without_token_is_401() {
        let response = test_app(&[])
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/payments/memberships")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_needs_no_token_and_rejects_garbage() {
        let response = test_app(&[])
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/payments/webhook/yookassa")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn configured_origin_is_allowed() {
        let response = test_app(&["https://app.example.test"])
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://app.example.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.test"
        );
    }

    #[tokio::test]
    async fn unknown_origin_gets_no_cors_header() {
        let response = test_app(&["https://app.example.test"])
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(!response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
