use std::time::Duration;

use auction_marketplace::{config::AuthSettings, routes::create_router, state::AppState};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

// The pool never connects; these requests are answered before any query runs,
// or tolerate the database being unreachable.
fn app() -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://postgres@127.0.0.1:1/unreachable")
        .expect("lazy pool");
    let state = AppState::new(
        pool,
        AuthSettings {
            jwt_secret: "router-test-secret".into(),
            token_ttl_hours: 1,
        },
    );
    create_router().with_state(state)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["message"], "Health check");
    assert_eq!(body["data"]["status"], "degraded");
    assert_eq!(body["data"]["database"], "unavailable");
}

#[tokio::test]
async fn protected_posts_require_login() {
    let listing = Uuid::new_v4();
    let cases = [
        form_post("/create_listing", "title=Widget&description=d&starting_bid=10"),
        form_post(&format!("/{listing}/details/close_auction"), "submit=Close+the+auction"),
        form_post(&format!("/wishlist/{listing}"), "submit=Add+to+wishlist"),
    ];

    for request in cases {
        let uri = request.uri().to_string();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn invalid_token_is_rejected_on_protected_views() {
    let request = Request::get("/wishlist")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["data"]["error"], "Unauthorized Invalid or expired token");
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let request = Request::get("/create_listing")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_forms_render_empty() {
    for uri in ["/register", "/login"] {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = json_body(response).await;
        assert!(body["data"]["message"].is_null());
        assert_eq!(body["data"]["password_min_length"], 8);
    }
}

#[tokio::test]
async fn register_rejects_bad_passwords_before_touching_the_store() {
    let response = app()
        .oneshot(form_post(
            "/register",
            "username=alice&email=a%40example.com&password=short&confirmation=short",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["data"]["message"],
        "Passwords must be at least 8 characters long."
    );

    let response = app()
        .oneshot(form_post(
            "/register",
            "username=alice&password=longenough1&confirmation=longenough2",
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["message"], "Passwords must match.");

    let response = app()
        .oneshot(form_post(
            "/register",
            "username=bad+name&password=longenough&confirmation=longenough",
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(
        body["data"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Enter a valid username.")
    );
}

#[tokio::test]
async fn logout_redirects_to_index() {
    let response = app()
        .oneshot(form_post("/logout", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn malformed_listing_id_is_a_bad_request() {
    let response = app()
        .oneshot(Request::get("/not-a-uuid/details").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let response = app()
        .oneshot(Request::get("/no/such/page").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["data"]["path"], "/no/such/page");
}
