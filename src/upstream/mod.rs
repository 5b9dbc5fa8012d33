//! 上游模型抽象层
//!
//! 定义 HTTP 层与 chat-completion API 之间的接口

pub mod azure;
mod constants;

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::time::Duration;

pub use azure::AzureOpenAiClient;

/// 上游调用失败
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// 上游返回了非 2xx 状态码
    #[error("upstream responded with {status}")]
    Status { status: StatusCode, body: Value },

    #[error("timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),

    /// 网络、TLS、读取响应体等其他错误
    #[error("{0}")]
    Transport(String),
}

impl UpstreamError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout(timeout);
        }
        // `{:#}` 带上 source 链，reqwest 的顶层消息通常不含根因
        Self::Transport(format!("{:#}", anyhow::Error::from(err)))
    }

    /// 返回给调用方的状态码：上游状态码，没有时为 500
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给调用方的错误内容：上游错误体，没有时为本地错误消息
    pub fn payload(&self) -> Value {
        match self {
            Self::Status { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// Chat-completion 后端
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// 后端名称（用于日志）
    fn name(&self) -> &str;

    /// 为一段事件描述请求生成叙述，返回上游的完整 JSON
    async fn complete(&self, incident: &str) -> Result<Value, UpstreamError>;
}

/// 取 `choices[0].message.content`，路径不存在或不是字符串时返回空串
pub fn extract_narrative(raw: &Value) -> String {
    raw.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// 响应体按 JSON 解析，失败时作为字符串保留
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
