use crate::{AppState, handlers, navigation_guard};
use axum::{Router, middleware};

/// Pages Router Module
///
/// Catches every path the API does not claim. Each request first passes through
/// `navigation_guard`, which either redirects (303) or hands the settled navigation to
/// `render_view`.
pub fn page_routes(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::render_view)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            navigation_guard,
        ))
        .with_state(state)
}
