//! 应用配置模块
//!
//! 负责从环境变量加载应用配置，包括：
//! - 服务器监听地址和端口
//! - 可选的共享密钥（`x-app-key`）
//! - Azure OpenAI 上游配置

use anyhow::{Context, Result};

/// 默认的 Azure OpenAI API 版本
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";

/// 应用配置
///
/// 启动时加载一次，之后只读
#[derive(Debug, Clone)]
pub struct Config {
    /// 服务器监听地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 共享密钥；未设置时不做鉴权
    pub backend_secret: Option<String>,
    /// 上游模型配置
    pub upstream: UpstreamSettings,
}

/// Azure OpenAI 上游配置
///
/// 三个必需字段允许缺失：缺失时服务照常启动，生成接口返回 500
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
}

/// 上游配置齐全时的只读视图
#[derive(Debug, Clone, Copy)]
pub struct ResolvedUpstream<'a> {
    pub api_key: &'a str,
    pub endpoint: &'a str,
    pub deployment: &'a str,
    pub api_version: &'a str,
}

impl UpstreamSettings {
    /// 三个必需值都存在时返回 `Some`
    pub fn resolve(&self) -> Option<ResolvedUpstream<'_>> {
        Some(ResolvedUpstream {
            api_key: self.api_key.as_deref()?,
            endpoint: self.endpoint.as_deref()?,
            deployment: self.deployment.as_deref()?,
            api_version: &self.api_version,
        })
    }

    /// 列出缺失的环境变量名，用于启动日志
    pub fn missing_vars(&self) -> Vec<&'static str> {
        [
            ("AZURE_OPENAI_KEY", self.api_key.is_none()),
            ("AZURE_OPENAI_ENDPOINT", self.endpoint.is_none()),
            ("AZURE_OPENAI_DEPLOYMENT", self.deployment.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// # 环境变量
    ///
    /// - `HOST`: 服务器监听地址（默认: "0.0.0.0"）
    /// - `PORT`: 服务器监听端口（默认: 3000）
    /// - `BACKEND_SECRET`: 共享密钥（可选）
    /// - `AZURE_OPENAI_KEY` / `AZURE_OPENAI_ENDPOINT` / `AZURE_OPENAI_DEPLOYMENT`
    /// - `AZURE_OPENAI_API_VERSION`（默认: "2024-12-01-preview"）
    ///
    /// # 错误
    ///
    /// - 如果 `PORT` 不是有效的端口号
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意 key 查找函数构造配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = get("PORT")
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let upstream = UpstreamSettings {
            api_key: get("AZURE_OPENAI_KEY"),
            endpoint: get("AZURE_OPENAI_ENDPOINT"),
            deployment: get("AZURE_OPENAI_DEPLOYMENT"),
            api_version: get("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        };

        Ok(Self {
            host,
            port,
            backend_secret: get("BACKEND_SECRET"),
            upstream,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.backend_secret, None);
        assert_eq!(config.upstream.api_version, DEFAULT_API_VERSION);
        assert!(config.upstream.resolve().is_none());
        assert_eq!(
            config.upstream.missing_vars(),
            vec![
                "AZURE_OPENAI_KEY",
                "AZURE_OPENAI_ENDPOINT",
                "AZURE_OPENAI_DEPLOYMENT"
            ]
        );
    }

    #[test]
    fn full_environment_resolves_upstream() {
        let config = config_from(&[
            ("PORT", "8081"),
            ("BACKEND_SECRET", "s3cret"),
            ("AZURE_OPENAI_KEY", "key"),
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com/"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-mini"),
            ("AZURE_OPENAI_API_VERSION", "2025-01-01"),
        ])
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.backend_secret.as_deref(), Some("s3cret"));

        let resolved = config.upstream.resolve().unwrap();
        assert_eq!(resolved.api_key, "key");
        assert_eq!(resolved.deployment, "gpt-mini");
        assert_eq!(resolved.api_version, "2025-01-01");
        assert!(config.upstream.missing_vars().is_empty());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = config_from(&[
            ("BACKEND_SECRET", ""),
            ("AZURE_OPENAI_KEY", "key"),
            ("AZURE_OPENAI_ENDPOINT", ""),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-mini"),
            ("AZURE_OPENAI_API_VERSION", ""),
        ])
        .unwrap();

        assert_eq!(config.backend_secret, None);
        assert_eq!(config.upstream.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.upstream.missing_vars(), vec!["AZURE_OPENAI_ENDPOINT"]);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
