//! # rp-api
//!
//! The web routing and orchestration layer for Rusty-Profile.

pub mod error;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

pub use state::AppState;

/// Builds the full route table.
///
/// # Developer Note
/// Protected routes sit behind `require_auth` via `route_layer`, so unknown
/// paths still fall through to a plain 404 instead of a login redirect.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        // Own profile and its mutations
        .route("/profile", get(handlers::profile))
        .route("/profile/privacy", post(handlers::update_privacy))
        // Someone else's page (static `privacy` segment wins over this)
        .route("/profile/{username}", get(handlers::public_profile))
        .route("/post", post(handlers::create_post))
        .route("/edit/{id}", get(handlers::edit_post))
        .route("/update/{id}", post(handlers::update_post))
        .route("/like/{id}", get(handlers::like_post))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/register", get(handlers::register_page).post(handlers::register))
        .route("/logout", get(handlers::logout))
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(middleware::trace_layer())
        .with_state(state)
}
