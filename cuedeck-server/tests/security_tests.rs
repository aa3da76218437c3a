//! Security tests for cuedeck-server
//!
//! Tests cover:
//! - Path traversal through `/api/music/*` and body parameters
//! - Session cookie authentication (login, logout, tampering)
//! - Public routes and CORS preflight with auth enabled

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cuedeck_common::api::SessionToken;
use helpers::{
    extract_bytes, extract_json, json_request, test_request, TestMusic, TEST_PASSWORD,
    TEST_SECRET, TEST_USER,
};
use serde_json::json;
use tower::util::ServiceExt; // for `oneshot` method

/// Log in and return the `session=...` pair for a Cookie header
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({"username": TEST_USER, "password": TEST_PASSWORD}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    set_cookie.split(';').next().unwrap().to_string()
}

fn with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// Path Traversal
// =============================================================================

#[tokio::test]
async fn test_music_traversal_rejected() {
    let music = TestMusic::show();
    std::fs::write(music.show_dir().join("secret.txt"), b"top secret").unwrap();
    let app = music.app();

    for uri in [
        "/api/music/../secret.txt",
        "/api/music/..%2Fsecret.txt",
        "/api/music/base/..%2F..%2Fsecret.txt",
        "/api/music/%2E%2E/secret.txt",
        "/api/music/..%5Csecret.txt",
        "/api/music/%2Fetc%2Fpasswd",
    ] {
        let response = app.clone().oneshot(test_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body = extract_bytes(response.into_body()).await;
        assert!(
            !String::from_utf8_lossy(&body).contains("top secret"),
            "{} leaked file contents",
            uri
        );
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_music_symlink_escape_rejected() {
    let music = TestMusic::show();
    let outside = music.show_dir().join("outside.mp3");
    std::fs::write(&outside, b"outside").unwrap();
    std::os::unix::fs::symlink(&outside, music.root().join("base/Scene 1/link.mp3")).unwrap();

    let response = music
        .app()
        .oneshot(test_request("GET", "/api/music/base/Scene%201/link.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_parameters_cannot_escape_version() {
    let music = TestMusic::show();
    let app = music.app();

    let cases = [
        json!({
            "sourceScene": "..",
            "targetScene": "Scene 2",
            "trackName": "intro.mp3",
            "version": "base"
        }),
        json!({
            "sourceScene": "Scene 1",
            "targetScene": "Scene 2",
            "trackName": "../../secret.mp3",
            "version": "base"
        }),
        json!({
            "sourceScene": "Scene 1",
            "targetScene": "Scene 2",
            "trackName": "intro.mp3",
            "version": "../music"
        }),
        json!({
            "sourceScene": "Scene 1",
            "targetScene": "Scene 2",
            "trackName": "intro.mp3",
            "version": "base",
            "tagName": "../.."
        }),
    ];

    for body in cases {
        let response = app
            .clone()
            .oneshot(json_request("PUT", "/api/move-track", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);

        let error = extract_json(response.into_body()).await;
        assert_eq!(error["error"]["code"], "INVALID_PATH", "{}", body);
    }
    assert!(music.exists("base/Scene 1/intro.mp3"));
}

#[tokio::test]
async fn test_rename_cannot_move_out_of_scene() {
    let music = TestMusic::show();

    let response = music
        .app()
        .oneshot(json_request(
            "PUT",
            "/api/rename-track",
            json!({
                "scene": "Scene 1",
                "version": "base",
                "oldName": "intro.mp3",
                "newName": "../intro.mp3"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(music.exists("base/Scene 1/intro.mp3"));
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_route_requires_session() {
    let music = TestMusic::show();

    let response = music
        .app_with_auth()
        .oneshot(test_request("GET", "/api/versions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_music_requires_session() {
    let music = TestMusic::show();

    let response = music
        .app_with_auth()
        .oneshot(test_request("GET", "/api/music/base/Scene%201/intro.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_without_session() {
    let music = TestMusic::show();
    let app = music.app_with_auth();

    for uri in ["/health", "/api/buildinfo"] {
        let response = app.clone().oneshot(test_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_login_and_use_session() {
    let music = TestMusic::show();
    let app = music.app_with_auth();

    let cookie = login(&app).await;
    assert!(cookie.starts_with("session="));

    let response = app
        .oneshot(with_cookie("GET", "/api/scenes?version=base", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_cookie_attributes() {
    let music = TestMusic::show();

    let response = music
        .app_with_auth()
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({"username": TEST_USER, "password": TEST_PASSWORD}),
        ))
        .await
        .unwrap();

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=3600"));
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let music = TestMusic::show();

    let response = music
        .app_with_auth()
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({"username": TEST_USER, "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_missing_fields() {
    let music = TestMusic::show();

    let response = music
        .app_with_auth()
        .oneshot(json_request("POST", "/api/login", json!({"username": TEST_USER})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tampered_session_rejected() {
    let music = TestMusic::show();
    let app = music.app_with_auth();

    // Signed with a different secret
    let forged = SessionToken::new(TEST_USER).encode("not-the-secret");
    let response = app
        .clone()
        .oneshot(with_cookie("GET", "/api/versions", &format!("session={}", forged)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid signature, payload swapped
    let genuine = SessionToken::new(TEST_USER).encode(TEST_SECRET);
    let other = SessionToken::new("intruder").encode(TEST_SECRET);
    let (_, signature) = genuine.split_once('.').unwrap();
    let (payload, _) = other.split_once('.').unwrap();
    let spliced = format!("session={}.{}", payload, signature);
    let response = app
        .oneshot(with_cookie("GET", "/api/versions", &spliced))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let music = TestMusic::show();

    let stale = SessionToken {
        username: TEST_USER.to_string(),
        issued_at: unix_now() - 7200,
    }
    .encode(TEST_SECRET);

    let response = music
        .app_with_auth()
        .oneshot(with_cookie("GET", "/api/versions", &format!("session={}", stale)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let music = TestMusic::show();

    let response = music
        .app_with_auth()
        .oneshot(test_request("POST", "/api/logout"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_preflight_not_challenged() {
    let music = TestMusic::show();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/move-track")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();
    let response = music.app_with_auth().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_login_with_auth_disabled() {
    let music = TestMusic::show();

    let response = music
        .app()
        .oneshot(json_request("POST", "/api/login", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
}

/// Current Unix time in seconds
fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}
