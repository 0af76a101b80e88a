//! Shared harness: the full router over an in-memory store, driven with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use rp_api::AppState;
use rp_auth_jwt::JwtAuthProvider;
use rp_core::models::User;
use rp_core::service::SocialService;
use rp_core::traits::UserDirectory;
use rp_db_memory::MemoryStore;
use secrecy::SecretString;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(JwtAuthProvider::new(
            &SecretString::from(SECRET.to_string()),
            chrono::Duration::hours(24),
        ));
        let service = SocialService::new(store.clone(), store.clone(), auth);
        let router = rp_api::router(AppState::new(service, false));
        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = session {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, session: Option<&str>) -> Response<Body> {
        let mut builder = Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = session {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    /// Registers `username` as `<username>@example.com` and returns the
    /// `token=...` cookie pair to send on later requests.
    pub async fn register(&self, username: &str) -> String {
        let body = format!(
            "name={username}&username={username}&email={username}%40example.com&age=30&password=hunter2"
        );
        let response = self.post_form("/register", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/profile");
        session_cookie(&response).expect("registration sets a session cookie")
    }

    pub async fn user(&self, username: &str) -> User {
        self.store
            .find_by_username(username)
            .await
            .unwrap()
            .expect("user exists")
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// The `name=value` pair of the named Set-Cookie, if present.
pub fn cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{name}=")))
        .map(str::to_string)
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    cookie(response, "token").filter(|pair| pair != "token=")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
