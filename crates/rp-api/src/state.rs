use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use rp_core::service::SocialService;

pub const TOKEN_COOKIE: &str = "token";

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SocialService>,
    /// Sets `Secure` on the token cookie
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(service: SocialService, secure_cookies: bool) -> Self {
        Self {
            service: Arc::new(service),
            secure_cookies,
        }
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .build()
    }

    /// Logout does not revoke anything; it overwrites the cookie with an
    /// empty value.
    pub fn cleared_session_cookie(&self) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, ""))
            .path("/")
            .http_only(true)
            .build()
    }
}
