//! 健康检查处理器

pub const HEALTH_MESSAGE: &str = "AI backend is running";

/// GET /
///
/// 与配置状态无关，总是返回 200
pub async fn handle_health() -> &'static str {
    HEALTH_MESSAGE
}
