/*
 * Responsibility
 * - Config -> dependencies -> AppState -> Router (+ middleware) -> axum::serve
 * - Process-level setup: tracing subscriber, panic hook, graceful shutdown
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::repos::{PgLikedDescriptionRepo, PgUserRepo};
use crate::services::alt_text::AltTextPipeline;
use crate::services::auth::{AuthServices, build_auth_services};
use crate::services::http_client;
use crate::services::id_codec::IdCodec;
use crate::services::inference::OpenAiClient;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,alt_text_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development fails fast; production keeps serving (CatchPanicLayer answers 500).
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
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    tracing::debug!(?config, "configuration loaded");

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to postgres")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("running migrations")?;
        tracing::info!("migrations applied");
    }

    let identity_http =
        http_client::build(config.identity_timeout).context("building identity http client")?;
    let inference_http =
        http_client::build(config.inference_timeout).context("building inference http client")?;

    let AuthServices {
        identity,
        verifier,
        oauth,
        oauth_state,
    } = build_auth_services(config, identity_http);

    let inference = Arc::new(OpenAiClient::new(
        inference_http,
        &config.openai_base_url,
        config.openai_api_key.clone(),
    ));
    let alt_text = Arc::new(AltTextPipeline::new(inference, config.openai_model.clone()));

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;

    Ok(AppState {
        users: Arc::new(PgUserRepo::new(pool.clone())),
        liked_descriptions: Arc::new(PgLikedDescriptionRepo::new(pool)),
        identity,
        verifier,
        oauth,
        oauth_state,
        alt_text,
        id_codec,
        frontend_url: config.frontend_url.clone(),
    })
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::router(state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config.request_timeout)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
