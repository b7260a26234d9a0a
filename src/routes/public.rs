use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The navigation endpoints evaluate the guard
/// for a path instead of enforcing it; the session endpoints manage the cookie the guard
/// reads on page requests.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/navigation/decide
        // One guard evaluation with an explicit session in the body.
        .route("/api/navigation/decide", post(handlers::decide_navigation))
        // GET /api/navigation/routes
        .route("/api/navigation/routes", get(handlers::list_routes))
        // GET /api/navigation/resolve?path=...
        // Follows redirects with the cookie session and reports the final page.
        .route("/api/navigation/resolve", get(handlers::resolve_navigation))
        // GET/PUT/DELETE /api/session
        // Read, store (login) and clear (logout) the session cookie.
        .route(
            "/api/session",
            get(handlers::get_session)
                .put(handlers::put_session)
                .delete(handlers::delete_session),
        )
}
