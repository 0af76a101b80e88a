//! # Rusty-Profile Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use anyhow::Context;
use rp_api::AppState;
use rp_auth_jwt::JwtAuthProvider;
use rp_config::Settings;
use rp_core::service::SocialService;
use rp_core::traits::{PostStore, UserDirectory};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(all(feature = "db-memory", not(feature = "db-sqlite")))]
use rp_db_memory::MemoryStore;
#[cfg(feature = "db-sqlite")]
use rp_db_sqlite::SqliteStore;

#[cfg(not(any(feature = "db-sqlite", feature = "db-memory")))]
compile_error!("enable one of the `db-sqlite` or `db-memory` features");

const DEFAULT_LOG_FILTER: &str =
    "rusty_profile=info,rp_core=info,rp_api=info,rp_config=info,rp_db_sqlite=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Settings::load()?;

    // 1. Initialize Store Implementation
    let (users, posts) = open_store(&settings).await?;

    // 2. Initialize Auth Implementation
    let auth = Arc::new(JwtAuthProvider::new(
        &settings.auth.jwt_secret,
        chrono::Duration::hours(settings.auth.token_ttl_hours),
    ));

    // 3. Wire the service and router
    let service = SocialService::new(users, posts, auth);
    let state = AppState::new(service, settings.auth.secure_cookies);
    let app = rp_api::router(state);

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Rusty-Profile listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

/// `RUST_LOG` wins when set; `RP_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("RP_LOG_JSON").is_ok_and(|v| v == "1");

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(feature = "db-sqlite")]
async fn open_store(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn UserDirectory>, Arc<dyn PostStore>)> {
    let store = Arc::new(
        SqliteStore::new(&settings.store.url, settings.store.max_connections)
            .await
            .context("failed to open SQLite store")?,
    );
    info!("Using SQLite store at {}", settings.store.url);
    let users: Arc<dyn UserDirectory> = store.clone();
    let posts: Arc<dyn PostStore> = store;
    Ok((users, posts))
}

#[cfg(all(feature = "db-memory", not(feature = "db-sqlite")))]
async fn open_store(
    _settings: &Settings,
) -> anyhow::Result<(Arc<dyn UserDirectory>, Arc<dyn PostStore>)> {
    let store = Arc::new(MemoryStore::new());
    info!("Using in-memory store; data is lost on exit");
    let users: Arc<dyn UserDirectory> = store.clone();
    let posts: Arc<dyn PostStore> = store;
    Ok((users, posts))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
