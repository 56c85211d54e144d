//! # topo2unl
//!
//! 把网络实验拓扑图的静态 HTML 渲染转换为仿真平台可导入的 UNL 实验文档。
//!
//! ## 模块组织
//!
//! - `core` - 转换流水线、错误类型与输出文件
//! - `parsers` - 拓扑模板（HTML）的解析与改写
//! - `mappings` - 控制台链接映射与接口映射输入
//! - `builders` - UNL 文档构建器
//! - `utils` - 工具函数
//! - `env` - 环境变量配置

pub mod builders;
pub mod core;
pub mod env;
pub mod mappings;
pub mod parsers;
pub mod utils;

// Re-export commonly used items for convenience
pub use builders::LabDocument;
pub use crate::core::*;
pub use mappings::{ConsoleLinkMap, InterfaceMapping};
