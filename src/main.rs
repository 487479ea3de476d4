// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use casting_agency::{
    api::router,
    auth::{JwksManager, TokenVerifier},
    config::{LogFormat, Settings, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::Store,
};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("failed to load configuration")?;
    init_tracing(settings.log_format);

    let auth_config = settings.auth_config()?;
    tracing::info!(
        issuer = %auth_config.issuer,
        audience = %auth_config.audience,
        jwks_url = %auth_config.jwks_url,
        algorithms = ?auth_config.algorithms,
        "Loaded auth configuration"
    );

    let keys = JwksManager::remote(auth_config.jwks_url.clone(), settings.jwks_fetch_timeout)
        .context("failed to build JWKS client")?
        .with_cache_ttl(settings.jwks_cache_ttl)
        .with_min_refresh_interval(settings.jwks_min_refresh_interval);
    let verifier = TokenVerifier::new(Arc::new(auth_config), keys);

    // Warm the key cache; requests will retry if the provider is down now
    if let Err(e) = verifier.keys().refresh().await {
        tracing::warn!(error = %e, "Initial JWKS fetch failed");
    }

    let store = Store::open(&settings.database_path).with_context(|| {
        format!("failed to open database at {}", settings.database_path.display())
    })?;
    tracing::info!(path = %settings.database_path.display(), "Opened database");

    let app = router(AppState::new(store, verifier));

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Casting Agency API listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
