use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use resumely::{app::build_app, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

// The fake state uses a lazily connecting pool, so any request that reached
// the database would fail with a connection error (500). Every rejection
// below must therefore happen before storage is touched.

fn app() -> axum::Router {
    build_app(AppState::fake())
}

fn signed_token(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("token should sign")
}

async fn get_with_auth(auth: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri("/v1/resumes/");
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let request = builder.body(Body::empty()).expect("request should build");

    let response = app().oneshot(request).await.expect("response expected");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();

    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("body should be valid JSON")
    };
    (status, json)
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let request = Request::builder()
        .uri("/v1/health")
        .body(Body::empty())
        .expect("request should build");
    let response = app().oneshot(request).await.expect("response expected");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_authorization_header_is_rejected() {
    let (status, body) = get_with_auth(None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Authorization header");
}

#[tokio::test]
async fn rejection_advertises_bearer_scheme() {
    let request = Request::builder()
        .uri("/v1/resumes/")
        .body(Body::empty())
        .expect("request should build");
    let response = app().oneshot(request).await.expect("response expected");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .expect("WWW-Authenticate should be set"),
        "Bearer"
    );
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let (status, _) = get_with_auth(Some("Basic YWxpY2U6cHc=")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (status, body) = get_with_auth(Some("Bearer not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let past = time::OffsetDateTime::now_utc().unix_timestamp() - 300;
    let token = signed_token(json!({ "sub": "1", "exp": past }));
    let (status, _) = get_with_auth(Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_numeric_subject_is_rejected() {
    let future = time::OffsetDateTime::now_utc().unix_timestamp() + 300;
    let token = signed_token(json!({ "sub": "alice", "exp": future }));
    let (status, body) = get_with_auth(Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn negative_subject_is_rejected() {
    let future = time::OffsetDateTime::now_utc().unix_timestamp() + 300;
    let token = signed_token(json!({ "sub": "-3", "exp": future }));
    let (status, _) = get_with_auth(Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mutating_resume_routes_require_auth() {
    for (method, uri) in [
        (Method::POST, "/v1/resumes/"),
        (Method::PUT, "/v1/resumes/1"),
        (Method::DELETE, "/v1/resumes/1"),
        (Method::POST, "/v1/resumes/resume/1/improve"),
    ] {
        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .expect("request should build");
        let response = app().oneshot(request).await.expect("response expected");
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} should require a bearer token"
        );
    }
}
