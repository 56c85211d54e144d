//! # 构建器模块
//!
//! 用于构建输出文档的构建器：
//!
//! - `unl_builder` - UNL 实验文档（XML）构建

pub mod unl_builder;

// Re-export commonly used items for convenience
pub use unl_builder::{derive_password, LabDocument};
