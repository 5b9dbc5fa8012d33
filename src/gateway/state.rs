//! Gateway 应用状态

use std::sync::Arc;

use crate::upstream::ChatBackend;

/// Gateway 应用状态
///
/// 启动后不可变；`backend` 为 `None` 表示上游配置不完整
#[derive(Clone)]
pub struct AppState {
    backend: Option<Arc<dyn ChatBackend>>,
}

impl AppState {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> Option<Arc<dyn ChatBackend>> {
        self.backend.clone()
    }
}
