/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (CORS / rate limit / caller 解決)
 * - axum::serve() で起動
 */
use std::net::SocketAddr;
use std::time::Duration;
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::repos::memory::{MemoryProductStore, MemoryUserStore};
use crate::repos::product_repo::PgProductStore;
use crate::repos::user_repo::PgUserStore;
use crate::repos::{ProductStore, UserStore};
use crate::seed;
use crate::services::auth::{AuthService, TokenCodec};
use crate::services::rate_limit::RateLimiter;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,secure_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost"
        // (stderr can be hidden depending on how the process is launched.)
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice immediately.
        // In production, prefer the default behavior (stderr) and let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;

    if config.seed_demo_data {
        seed::run(&state).await?;
    }

    let app = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    // ConnectInfo gives the rate limiter its per-peer client key.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let (users, products): (Arc<dyn UserStore>, Arc<dyn ProductStore>) =
        match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .acquire_timeout(Duration::from_secs(5))
                    .connect(url)
                    .await?;
                (
                    Arc::new(PgUserStore::new(db.clone())),
                    Arc::new(PgProductStore::new(db)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores (data is not persisted)");
                (
                    Arc::new(MemoryUserStore::new()),
                    Arc::new(MemoryProductStore::new()),
                )
            }
        };

    // A missing or weak signing secret must stop the process here, before
    // the listener ever opens.
    let codec = TokenCodec::new(&config.jwt_secret, config.session_ttl_seconds)?;
    let auth = Arc::new(AuthService::new(users.clone(), codec));

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_capacity,
        Duration::from_secs(config.rate_limit_window_seconds),
    ));

    Ok(AppState::new(users, products, auth, limiter))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api", api::routes(state.clone()))
        .fallback(fallback)
        .with_state(state);

    middleware::cors::apply(router, config)
}

// Catches anything no route matched.
pub async fn fallback() -> AppError {
    AppError::not_found("endpoint")
}
