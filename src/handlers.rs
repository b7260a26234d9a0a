use crate::{
    AppState,
    config::AppConfig,
    models::{DecideRequest, Decision, PageView, ResolveQuery, RouteSummary, Session},
    navigation::{Navigation, Outcome},
    storage::{CurrentSession, removal_cookie, session_cookie},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

// --- Navigation API ---

/// decide_navigation
///
/// [Public Route] Runs the navigation guard once for `path` with the session given in the
/// body. Redirects are reported, not followed.
#[utoipa::path(
    post,
    path = "/api/navigation/decide",
    request_body = DecideRequest,
    responses((status = 200, description = "Guard decision", body = Decision))
)]
pub async fn decide_navigation(
    State(state): State<AppState>,
    Json(payload): Json<DecideRequest>,
) -> Json<Decision> {
    let decision = state
        .navigator
        .decide(&payload.path, payload.session.as_ref());
    Json(decision)
}

/// list_routes
///
/// [Public Route] The static route table with each route's access requirement.
#[utoipa::path(
    get,
    path = "/api/navigation/routes",
    responses((status = 200, description = "Route table", body = [RouteSummary]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    let routes = state
        .navigator
        .table()
        .records()
        .iter()
        .map(|record| record.summary())
        .collect();
    Json(routes)
}

/// resolve_navigation
///
/// [Public Route] Follows every redirect for `path` using the session cookie and reports
/// where the client ends up.
#[utoipa::path(
    get,
    path = "/api/navigation/resolve",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Settled navigation", body = Navigation),
        (status = 500, description = "Redirect loop in the route configuration")
    )
)]
pub async fn resolve_navigation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<Navigation>, StatusCode> {
    state
        .navigator
        .navigate(&query.path, session.as_ref())
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %e, "navigation could not settle");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

// --- Session Lifecycle ---

/// get_session
///
/// [Public Route] The session carried by the request cookie.
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session", body = Session),
        (status = 401, description = "No readable session")
    )
)]
pub async fn get_session(
    CurrentSession(session): CurrentSession,
) -> Result<Json<Session>, StatusCode> {
    session.map(Json).ok_or(StatusCode::UNAUTHORIZED)
}

/// put_session
///
/// [Public Route] Stores the session cookie after a successful login against the portal
/// backend.
#[utoipa::path(
    put,
    path = "/api/session",
    request_body = Session,
    responses((status = 200, description = "Session stored", body = Session))
)]
pub async fn put_session(
    State(config): State<AppConfig>,
    jar: CookieJar,
    Json(session): Json<Session>,
) -> Result<(CookieJar, Json<Session>), StatusCode> {
    let cookie = session_cookie(&config.session_cookie, &session).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize session");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!(role = %session.role, "session stored");
    Ok((jar.add(cookie), Json(session)))
}

/// delete_session
///
/// [Public Route] Logout: clears the session cookie.
#[utoipa::path(
    delete,
    path = "/api/session",
    responses((status = 204, description = "Session cleared"))
)]
pub async fn delete_session(
    State(config): State<AppConfig>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    (
        jar.remove(removal_cookie(&config.session_cookie)),
        StatusCode::NO_CONTENT,
    )
}

// --- Pages ---

/// render_view
///
/// [Page Route] Runs after `navigation_guard` has allowed the request and left the
/// settled `Navigation` in the request extensions.
pub async fn render_view(Extension(navigation): Extension<Navigation>) -> Response {
    let Navigation { path, outcome, .. } = navigation;
    match outcome {
        Outcome::Render { view, params } => Json(PageView { view, path, params }).into_response(),
        Outcome::NotFound => (StatusCode::NOT_FOUND, format!("no page at {path}")).into_response(),
    }
}
