//! Gateway 应用层
//!
//! HTTP 服务器和请求处理

mod error;
mod handlers;
mod middleware;
mod state;

pub use middleware::APP_KEY_HEADER;
pub use state::AppState;

use anyhow::Result;
use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::upstream::AzureOpenAiClient;

/// 外层兜底超时，大于上游调用的 120 秒
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

pub async fn serve(config: Config) -> Result<()> {
    let state = build_state(&config)?;
    let app = build_router(state, &config);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("AI backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 根据配置创建上游 client；配置不完整时只告警，不阻止启动
pub fn build_state(config: &Config) -> Result<AppState> {
    let Some(settings) = config.upstream.resolve() else {
        tracing::warn!(
            missing = ?config.upstream.missing_vars(),
            "Azure OpenAI is not fully configured, /generate-narrative will answer 500"
        );
        return Ok(AppState::new(None));
    };

    let client = AzureOpenAiClient::new(settings)?;
    tracing::info!(url = client.url(), "Upstream configured");
    Ok(AppState::new(Some(Arc::new(client))))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let secret = config.backend_secret.clone();

    let public_routes = Router::new().route("/", get(handlers::handle_health));
    let api_routes = Router::new()
        .route(
            "/generate-narrative",
            post(handlers::handle_generate_narrative),
        )
        .route_layer(axum_middleware::from_fn(move |req, next| {
            let secret = secret.clone();
            middleware::app_key_middleware(secret, req, next)
        }));

    Router::new()
        .merge(api_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_logger))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
                )),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    tokio::select! {
        _ = ctrl_c => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
