//! HTTP 请求处理器

pub mod health;
pub mod narrative;

pub use health::handle_health;
pub use narrative::handle_generate_narrative;
