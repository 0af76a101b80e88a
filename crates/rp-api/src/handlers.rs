//! # rp-api Handlers
//!
//! This module coordinates the flow between HTTP requests and `SocialService`.
//! Every mutation answers with a redirect and a flash notice; every GET
//! renders a page and consumes the pending notice.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use axum::{Extension, Form};
use axum_extra::extract::cookie::CookieJar;
use rp_core::models::{Identity, Privacy};
use rp_core::service::{is_valid_username, NewAccount};
use rp_ui::{
    EditTemplate, IndexTemplate, LoginTemplate, Notice, ProfileTemplate, PublicProfileTemplate,
    RegisterTemplate,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, OrRedirect};
use crate::flash;
use crate::state::AppState;

type Page = Result<(CookieJar, Html<String>), ApiError>;
type Redirected = Result<(CookieJar, Redirect), ApiError>;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub email: String,
    /// Kept as text so a blank or garbled age reaches validation
    pub age: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PrivacyForm {
    pub privacy: Privacy,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct LikeQuery {
    /// Set when liking from someone's public profile, to return there
    pub username: Option<String>,
}

fn render(jar: CookieJar, template: impl Template) -> Page {
    let html = template
        .render()
        .map_err(|e| ApiError::internal(anyhow::anyhow!("template rendering failed: {e}")))?;
    Ok((jar, Html(html)))
}

fn notify(jar: CookieJar, text: &str, to: &str) -> (CookieJar, Redirect) {
    (flash::set(jar, Notice::success(text)), Redirect::to(to))
}

pub async fn index(jar: CookieJar) -> Page {
    let (jar, notice) = flash::take(jar);
    render(jar, IndexTemplate { notice })
}

pub async fn login_page(jar: CookieJar) -> Page {
    let (jar, notice) = flash::take(jar);
    render(jar, LoginTemplate { notice })
}

pub async fn register_page(jar: CookieJar) -> Page {
    let (jar, notice) = flash::take(jar);
    render(jar, RegisterTemplate { notice })
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Redirected {
    let account = NewAccount {
        name: form.name,
        username: form.username,
        email: form.email,
        age: form.age,
        password: form.password,
    };
    let (_, token) = state.service.register(account).await.or_redirect("/register")?;

    let jar = jar.add(state.session_cookie(token));
    Ok(notify(jar, "Successfully registered!", "/profile"))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Redirected {
    let (_, token) = state
        .service
        .login(&form.email, &form.password)
        .await
        .or_redirect("/login")?;

    let jar = jar.add(state.session_cookie(token));
    Ok(notify(jar, "Successfully logged in!", "/profile"))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.add(state.cleared_session_cookie());
    notify(jar, "Logged out!", "/login")
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    jar: CookieJar,
) -> Page {
    let page = state.service.own_profile(&who).await.or_redirect("/login")?;
    let (jar, notice) = flash::take(jar);
    render(jar, ProfileTemplate::new(&page, notice))
}

pub async fn update_privacy(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    jar: CookieJar,
    Form(form): Form<PrivacyForm>,
) -> Redirected {
    state.service.set_privacy(&who, form.privacy).await?;
    Ok(notify(jar, "Privacy setting updated!", "/profile"))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> Redirected {
    state.service.create_post(&who, &form.content).await?;
    Ok(notify(jar, "Post created!", "/profile"))
}

pub async fn edit_post(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Page {
    let editable = state.service.post_for_edit(&who, id).await?;
    let (jar, notice) = flash::take(jar);
    render(jar, EditTemplate::new(&editable, notice))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Form(form): Form<PostForm>,
) -> Redirected {
    state.service.update_post(&who, id, &form.content).await?;
    Ok(notify(jar, "Post updated!", "/profile"))
}

pub async fn like_post(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Query(query): Query<LikeQuery>,
) -> Redirected {
    let back = match query.username.as_deref() {
        Some(username) if is_valid_username(username) => format!("/profile/{username}"),
        _ => "/profile".to_string(),
    };

    state
        .service
        .toggle_like(&who, id)
        .await
        .map_err(|e| ApiError::new(e, back.clone()))?;
    Ok((jar, Redirect::to(&back)))
}

pub async fn public_profile(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    jar: CookieJar,
    Path(username): Path<String>,
) -> Page {
    let profile = state.service.public_profile(&who, &username).await?;
    let (jar, notice) = flash::take(jar);
    render(jar, PublicProfileTemplate::new(&profile, who.user_id, notice))
}

pub async fn health() -> &'static str {
    "OK"
}
