use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Decision core: the authorizer and the static route table it guards.
pub mod authorizer;
pub mod models;
pub mod navigation;

// Session storage and configuration.
pub mod config;
pub mod storage;

// HTTP surface.
pub mod handlers;
pub mod routes;
use routes::{pages, public};
use storage::CurrentSession;

// --- Public Re-exports ---

pub use authorizer::{Authorizer, LandingPaths, decide};
pub use config::AppConfig;
pub use models::{Access, Decision, Role, Session};
pub use navigation::{Navigation, Navigator, NavigatorState, RouteTable};
pub use storage::{MemoryStorage, SessionStorage, load_session};

/// ApiDoc
///
/// OpenAPI description of the JSON endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::decide_navigation, handlers::list_routes, handlers::resolve_navigation,
        handlers::get_session, handlers::put_session, handlers::delete_session
    ),
    components(
        schemas(
            models::Role, models::Session, models::Access, models::Decision,
            models::DecideRequest, models::RouteSummary, models::PageView,
            navigation::Navigation, navigation::Outcome,
        )
    ),
    tags(
        (name = "parking-portal", description = "Parking portal navigation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The shared, immutable state of the server: the navigator (route table + authorizer)
/// and the configuration it was built from.
#[derive(Clone)]
pub struct AppState {
    pub navigator: NavigatorState,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the portal route table and an authorizer for the configured paths.
    pub fn from_config(config: AppConfig) -> Self {
        let table = RouteTable::parking_portal(&config.login_path);
        let navigator = Navigator::new(table, config.authorizer());
        Self {
            navigator: Arc::new(navigator),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// navigation_guard
///
/// Middleware in front of every page request. It reads the cookie session, settles the
/// navigation for the request path and either answers with `303 See Other` to the final
/// destination or stores the `Navigation` in the request extensions for the page handler.
pub async fn navigation_guard(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match state.navigator.navigate(&path, session.as_ref()) {
        Ok(navigation) if navigation.redirected() => {
            tracing::debug!(from = %path, to = %navigation.path, "navigation redirected");
            Redirect::to(&navigation.path).into_response()
        }
        Ok(navigation) => {
            request.extensions_mut().insert(navigation);
            next.run(request).await
        }
        Err(e) => {
            tracing::error!(error = %e, "navigation could not settle");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// create_router
///
/// Assembles the routing structure, applies global middleware and registers the state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // JSON API: no guard, handlers read the session themselves.
        .merge(public::public_routes())
        .with_state(state.clone())
        // Everything else is a page behind the navigation guard.
        .fallback_service(pages::page_routes(state));

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI and the `x-request-id` assigned above, so
/// every log line of a request (including navigation decisions) is correlated.
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
