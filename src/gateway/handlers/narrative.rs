//! Narrative 生成处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::gateway::{error::RelayError, state::AppState};
use crate::upstream::extract_narrative;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub narrative: String,
    /// 上游完整响应，原样返回
    pub raw: Value,
}

/// POST /generate-narrative 处理器
///
/// 鉴权在路由层完成，这里依次做：输入校验、配置检查、上游调用
pub async fn handle_generate_narrative(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateResponse>, RelayError> {
    let body = match payload {
        Ok(Json(body)) => body,
        // 读不到字节时如实返回状态码；内容不是 JSON 时按缺少 incident 处理
        Err(JsonRejection::BytesRejection(rejection)) => {
            tracing::warn!(
                status = rejection.status().as_u16(),
                reason = %rejection.body_text(),
                "failed to read request body"
            );
            return Err(RelayError::UnreadableBody {
                status: rejection.status(),
                message: rejection.body_text(),
            });
        }
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "body is not JSON");
            Value::Null
        }
    };

    let incident = body
        .get("incident")
        .and_then(incident_text)
        .ok_or(RelayError::MissingIncident)?;

    let backend = state.backend().ok_or(RelayError::Misconfigured)?;

    tracing::info!(
        backend = backend.name(),
        incident_chars = incident.chars().count(),
        "request"
    );

    // 在独立任务中调用上游，客户端断开不会取消该调用，超时由 client 自身保证
    let task_backend = backend.clone();
    let result = tokio::spawn(async move { task_backend.complete(&incident).await })
        .await
        .map_err(|e| RelayError::Task(e.to_string()))?;

    let raw = result.map_err(|err| {
        tracing::error!(
            backend = backend.name(),
            status = err.status().as_u16(),
            error = %err.payload(),
            "Error calling Azure OpenAI"
        );
        RelayError::from(err)
    })?;

    let narrative = extract_narrative(&raw);
    tracing::info!(
        backend = backend.name(),
        narrative_chars = narrative.chars().count(),
        "response"
    );

    Ok(Json(GenerateResponse { narrative, raw }))
}

/// 按 JSON 真值判断 `incident`：`null`、`false`、`0` 和空串视为缺失
fn incident_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(display_text(other)),
    }
}

/// 非字符串值嵌入提示词时的文本形式，与 JavaScript 的 `String(value)` 一致：
/// 数组按 `,` 拼接元素（`null` 为空），对象为 `[object Object]`
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
