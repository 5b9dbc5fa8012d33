//! 请求级错误及其 HTTP 映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::upstream::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Missing `incident` in body")]
    MissingIncident,

    /// 请求体读取失败（如超过大小限制），沿用 axum 给出的状态码
    #[error("{message}")]
    UnreadableBody { status: StatusCode, message: String },

    #[error("Server misconfigured (missing env vars)")]
    Misconfigured,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// 上游调用所在的任务异常退出
    #[error("upstream task failed: {0}")]
    Task(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: Value,
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingIncident => StatusCode::BAD_REQUEST,
            Self::UnreadableBody { status, .. } => *status,
            Self::Misconfigured | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(err) => err.status(),
        }
    }

    fn payload(&self) -> Value {
        match self {
            Self::Upstream(err) => err.payload(),
            other => Value::String(other.to_string()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.payload(),
        };
        (self.status(), Json(body)).into_response()
    }
}
