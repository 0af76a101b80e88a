mod common;

use axum::http::StatusCode;
use common::{body_text, cookie, location, session_cookie, TestApp};

#[tokio::test]
async fn register_signs_the_user_in() {
    let app = TestApp::new();
    let session = app.register("alice").await;

    let response = app.get("/profile", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Hello, alice"));
    assert!(body.contains("alice@example.com"));
}

#[tokio::test]
async fn duplicate_email_sends_the_user_back_to_register() {
    let app = TestApp::new();
    app.register("alice").await;

    let response = app
        .post_form(
            "/register",
            "name=Other&username=other&email=alice%40example.com&age=22&password=x",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");
    assert!(session_cookie(&response).is_none());
    assert!(cookie(&response, "flash").is_some());
    assert_eq!(app.store.user_count(), 1);
}

#[tokio::test]
async fn simultaneous_signups_with_one_email_admit_one() {
    let app = TestApp::new();
    let first = app.post_form(
        "/register",
        "name=A&username=first&email=same%40example.com&age=20&password=x",
        None,
    );
    let second = app.post_form(
        "/register",
        "name=B&username=second&email=same%40example.com&age=21&password=y",
        None,
    );
    let (first, second) = tokio::join!(first, second);

    let mut targets = [location(&first).to_string(), location(&second).to_string()];
    targets.sort();
    assert_eq!(targets, ["/profile", "/register"]);
    assert_eq!(app.store.user_count(), 1);
}

#[tokio::test]
async fn a_blank_or_garbled_age_redirects_back_to_register() {
    let app = TestApp::new();

    for age in ["", "abc"] {
        let body = format!("name=A&username=a&email=a%40example.com&age={age}&password=x");
        let response = app.post_form("/register", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "age {age:?}");
        assert_eq!(location(&response), "/register");
        assert!(cookie(&response, "flash").is_some());
        assert!(session_cookie(&response).is_none());
    }
    assert_eq!(app.store.user_count(), 0);
}

#[tokio::test]
async fn login_with_the_right_password_issues_a_session() {
    let app = TestApp::new();
    app.register("alice").await;

    let response = app
        .post_form("/login", "email=alice%40example.com&password=hunter2", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile");

    let session = session_cookie(&response).expect("token cookie");
    let profile = app.get("/profile", Some(&session)).await;
    assert_eq!(profile.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_a_wrong_password_is_refused() {
    let app = TestApp::new();
    app.register("alice").await;

    let response = app
        .post_form("/login", "email=alice%40example.com&password=wrong", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn login_for_an_unknown_email_is_refused() {
    let app = TestApp::new();

    let response = app
        .post_form("/login", "email=nobody%40example.com&password=x", None)
        .await;
    assert_eq!(location(&response), "/login");
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn protected_pages_without_a_token_redirect_to_login() {
    let app = TestApp::new();

    for uri in ["/profile", "/profile/alice", "/edit/00000000-0000-0000-0000-000000000000"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }
}

#[tokio::test]
async fn a_tampered_token_is_rejected() {
    let app = TestApp::new();
    let session = app.register("alice").await;

    let response = app.get("/profile", Some(&format!("{session}x"))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(cookie(&response, "flash").is_some());
}

#[tokio::test]
async fn logout_blanks_the_token_cookie() {
    let app = TestApp::new();
    let session = app.register("alice").await;

    let response = app.get("/logout", Some(&session)).await;
    assert_eq!(location(&response), "/login");
    assert_eq!(cookie(&response, "token").as_deref(), Some("token="));

    let after = app.get("/profile", Some("token=")).await;
    assert_eq!(location(&after), "/login");
}

#[tokio::test]
async fn public_pages_render_without_a_session() {
    let app = TestApp::new();

    for uri in ["/", "/login", "/register"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
    let health = app.get("/health", None).await;
    assert_eq!(body_text(health).await, "OK");
}

#[tokio::test]
async fn a_pending_notice_is_shown_once() {
    let app = TestApp::new();
    let response = app
        .post_form("/login", "email=nobody%40example.com&password=x", None)
        .await;
    let flash = cookie(&response, "flash").expect("flash cookie");

    let page = app.get("/login", Some(&flash)).await;
    assert_eq!(cookie(&page, "flash").as_deref(), Some("flash="));
    assert!(body_text(page).await.contains("User not found"));
}
