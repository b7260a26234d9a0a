use parking_portal::{AppConfig, AppState, Decision, create_router, models::PageView};
use reqwest::{StatusCode, header, redirect::Policy};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    let state = AppState::from_config(AppConfig::default());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Redirects are the guard's answer; the tests inspect them rather than follow them.
    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    TestApp { address, client }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_login_then_visit_then_logout() {
    let app = spawn_app().await;

    // 1. Anonymous visit to a user page bounces to the login page.
    let response = app
        .client
        .get(format!("{}/user/book", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    // 2. Login stores the session cookie.
    let response = app
        .client
        .put(format!("{}/api/session", app.address))
        .json(&json!({ "id": 5, "username": "carol", "email": "carol@lot.io", "role": "user", "is_admin": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    // 3. With the cookie the page renders.
    let response = app
        .client
        .get(format!("{}/user/book", app.address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: PageView = response.json().await.unwrap();
    assert_eq!(page.view, "UserBooking");

    // 4. The login page now sends the user to their dashboard.
    let response = app
        .client
        .get(format!("{}/login", app.address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/user/dashboard");

    // 5. Logout answers with an expiring cookie.
    let response = app
        .client
        .delete(format!("{}/api/session", app.address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(
        response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0")
    );
}

#[tokio::test]
async fn test_decide_endpoint_scenarios() {
    let app = spawn_app().await;
    let cases = [
        (json!({ "path": "/admin/dashboard" }), Decision::redirect("/login")),
        (
            json!({ "path": "/admin/dashboard", "session": { "role": "user" } }),
            Decision::redirect("/user/dashboard"),
        ),
        (
            json!({ "path": "/user/book", "session": { "role": "user" } }),
            Decision::Allow,
        ),
        (
            json!({ "path": "/login", "session": { "role": "admin" } }),
            Decision::redirect("/admin/dashboard"),
        ),
    ];

    for (body, expected) in cases {
        let decision: Decision = app
            .client
            .post(format!("{}/api/navigation/decide", app.address))
            .json(&body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(decision, expected, "{body}");
    }
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let document: serde_json::Value = app
        .client
        .get(format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(document["paths"]["/api/navigation/decide"].is_object());
}
