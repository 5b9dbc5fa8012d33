//! Gateway 中间件

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::{AtomicU64, Ordering};
use subtle::ConstantTimeEq;
use tracing::Instrument;

use crate::gateway::error::RelayError;

/// 共享密钥所在的请求头
pub const APP_KEY_HEADER: &str = "x-app-key";

/// 全局请求计数器，用于生成 request_id
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 共享密钥认证中间件
///
/// 未配置密钥时直接放行；否则要求 `x-app-key` 与密钥完全一致
pub async fn app_key_middleware(secret: Option<String>, request: Request, next: Next) -> Response {
    let Some(secret) = secret else {
        return next.run(request).await;
    };

    let is_valid = request
        .headers()
        .get(APP_KEY_HEADER)
        .map(|v| bool::from(v.as_bytes().ct_eq(secret.as_bytes())))
        .unwrap_or(false);

    if is_valid {
        return next.run(request).await;
    }

    tracing::warn!("rejected request with invalid or missing app key");
    RelayError::Unauthorized.into_response()
}

/// 请求日志中间件
pub async fn request_logger(request: Request, next: Next) -> Response {
    let request_id = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "req",
        id = request_id,
        %method,
        %path,
    );

    async move {
        let start = std::time::Instant::now();
        let response = next.run(request).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        tracing::info!(status, latency_ms, "done");

        response
    }
    .instrument(span)
    .await
}
