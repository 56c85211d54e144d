//! # 工具模块
//!
//! - `url` - 控制台地址规范化与 `host:port` 提取

pub mod url;

// Re-export commonly used items for convenience
pub use url::{normalize_console_uri, strip_scheme, Url};
