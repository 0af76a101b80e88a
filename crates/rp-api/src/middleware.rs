//! # rp-api Middleware
//!
//! The Auth Gate for protected routes, plus request tracing.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use rp_ui::Notice;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::flash;
use crate::state::{AppState, TOKEN_COOKIE};

/// Logs one span per request with method, path, status and latency.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Verifies the `token` cookie and attaches the decoded `Identity` to the
/// request extensions.
///
/// No cookie (or the empty value logout leaves behind) sends the caller to
/// `/login` silently; a bad or expired token does the same with a notice.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_default();

    if token.is_empty() {
        return Redirect::to("/login").into_response();
    }

    match state.service.authenticate(&token) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("rejected session token: {e}");
            let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
            let jar = flash::set(jar, Notice::error("Session expired"));
            (jar, Redirect::to("/login")).into_response()
        }
    }
}
