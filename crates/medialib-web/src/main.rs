mod api;
mod auth;
mod config;
mod dto;
mod error;
mod middleware;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::middleware::from_fn_with_state;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ServerConfig, StorageBackend};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "medialib_web=debug,medialib_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    let tls_config = config.tls.clone();
    let tls_enabled = tls_config.cert_path.is_some() && tls_config.key_path.is_some();
    let rate_limit_rpm = config.rate_limit.login_requests_per_minute;
    let max_upload_bytes = config.storage.max_upload_bytes();
    let token_ttl = Duration::from_secs(config.auth.jwt_ttl_hours * 3600);

    // Local files are served straight from disk at the public URL
    let media_files = match config.storage.backend {
        StorageBackend::Local => {
            tokio::fs::create_dir_all(&config.storage.root).await?;
            tracing::info!(
                "Serving media from {} at {}",
                config.storage.root.display(),
                config.storage.public_url
            );
            let mount = config.storage.public_url.trim_end_matches('/');
            (mount.starts_with('/') && mount.len() > 1)
                .then(|| (mount.to_string(), ServeDir::new(&config.storage.root)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory media store; uploads are lost on restart");
            None
        }
    };

    if !config.has_auth() {
        tracing::warn!("No users configured; every request runs as anonymous with full access");
    }

    let state = AppState::new(config);

    // Revoked tokens only matter until they would have expired anyway
    let revoked = state.revoked_tokens.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            revoked.retain(|_, revoked_at| revoked_at.elapsed() < token_ttl);
        }
    });

    // CORS: same-origin only by default (no cross-origin requests allowed)
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Rate limit config (per-IP)
    let period_per_request = 60 / rate_limit_rpm.max(1);
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(period_per_request.into())
            .burst_size(rate_limit_rpm.max(1))
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit config"))?,
    );

    // Rate limit only on auth routes
    let auth_routes = api::auth_router()
        .layer(GovernorLayer::<_, _, axum::body::Body>::new(governor_config));

    let mut router = axum::Router::new()
        .nest("/api", auth_routes.merge(api::media_router(max_upload_bytes)));
    if let Some((public_url, serve_dir)) = media_files {
        router = router.nest_service(&public_url, serve_dir);
    }

    let app = router
        .layer(from_fn_with_state(
            tls_enabled,
            middleware::security_headers::security_headers,
        ))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let (Some(cert), Some(key)) = (&tls_config.cert_path, &tls_config.key_path) {
        use axum_server::tls_rustls::RustlsConfig;
        let rustls_config = RustlsConfig::from_pem_file(cert, key).await?;
        tracing::info!("medialib-web listening on https://{}", bind_addr);
        axum_server::bind_rustls(bind_addr, rustls_config)
            .serve(app.into_make_service_with_connect_info::<std::net::SocketAddr>())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!("medialib-web listening on http://{}", bind_addr);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await?;
    }

    Ok(())
}
