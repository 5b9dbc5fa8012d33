//! Azure OpenAI 相关常量

/// 请求超时（秒）
pub const API_TIMEOUT_SECS: u64 = 120;

/// 单次生成的 token 上限
pub const MAX_COMPLETION_TOKENS: u32 = 1200;

/// 认证 header 名，直接携带 key，不使用 Bearer
pub const API_KEY_HEADER: &str = "api-key";

pub const SYSTEM_PROMPT: &str = "You are a professional police incident reporter. Produce a clear, factual, chronological and detailed narrative based only on the facts provided.";

pub const USER_PROMPT_PREFIX: &str = "Generate a detailed narrative for the following incident: ";

/// 拼接 chat completions 地址，去掉 endpoint 末尾的 `/`
pub fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        api_version
    )
}
