//! Maps domain failures onto HTTP: most become a flash notice plus a redirect
//! back to the form or page the user came from.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use rp_core::error::AppError;
use rp_ui::Notice;

use crate::flash;

/// An `AppError` together with where to send the user.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub back: String,
}

impl ApiError {
    pub fn new(error: AppError, back: impl Into<String>) -> Self {
        Self {
            error,
            back: back.into(),
        }
    }

    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::new(AppError::Internal(error.into()), "/")
    }
}

/// Protected pages fall back to the profile page.
impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error, "/profile")
    }
}

pub trait OrRedirect<T> {
    fn or_redirect(self, back: &'static str) -> Result<T, ApiError>;
}

impl<T> OrRedirect<T> for Result<T, AppError> {
    fn or_redirect(self, back: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(e, back))
    }
}

/// The text shown to the user for a failure.
pub fn user_message(error: &AppError) -> String {
    match error {
        AppError::AlreadyRegistered(_) => "User already registered".into(),
        AppError::UsernameTaken(_) => "Username already taken".into(),
        AppError::UserNotFound(_) => "User not found".into(),
        AppError::InvalidCredentials => "Invalid credentials".into(),
        AppError::Unauthorized(_) => "Session expired".into(),
        AppError::Forbidden(msg) | AppError::ValidationError(msg) => msg.clone(),
        AppError::NotFound(what, _) => {
            let mut chars = what.chars();
            match chars.next() {
                Some(first) => format!("{}{} not found", first.to_uppercase(), chars.as_str()),
                None => "Not found".into(),
            }
        }
        AppError::Internal(_) => "Something went wrong".into(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.error {
            AppError::NotFound(what, key) if what == "user" => {
                tracing::debug!("no user {key}");
                (StatusCode::NOT_FOUND, "User not found").into_response()
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            other => {
                let jar = flash::set(CookieJar::new(), Notice::error(user_message(other)));
                (jar, Redirect::to(&self.back)).into_response()
            }
        }
    }
}
